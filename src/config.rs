use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::models::{
    default_max_state, default_runs, default_steps, default_total_time, Analysis, ScenarioConfig,
};

#[derive(Parser, Debug)]
#[command(name = "queue-lab", version, about = "M/M/c queue metrics and simulations")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
    #[arg(long, value_enum, default_value = "human", global = true)]
    pub format: FormatArg,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Steady-state probabilities and L, Lq, W, Wq
    Solve {
        #[command(flatten)]
        model: ModelArgs,
        #[arg(long, default_value_t = default_max_state())]
        max_state: usize,
    },
    /// Metrics from a recorded arrival/service event log
    Extract {
        #[arg(long)]
        events: PathBuf,
        #[arg(long)]
        arrival_queue: String,
        #[arg(long)]
        service_queue: String,
        #[arg(long, default_value_t = default_max_state())]
        max_state: usize,
    },
    /// Single discrete-event run with its queue-length trace
    Simulate {
        #[command(flatten)]
        model: ModelArgs,
        #[arg(long, default_value_t = default_total_time())]
        time: f64,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Averages of repeated discrete-event runs
    MonteCarlo {
        #[command(flatten)]
        model: ModelArgs,
        #[arg(long, default_value_t = default_total_time())]
        time: f64,
        #[arg(long, default_value_t = default_runs())]
        runs: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Embedded birth-death chain walk
    Markov {
        #[command(flatten)]
        model: ModelArgs,
        #[arg(long, default_value_t = default_steps())]
        steps: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Built-in case studies
    Cases,
    /// Scenario described in a TOML or JSON file
    Run {
        #[arg(long)]
        config: PathBuf,
        #[arg(long, help = "Overrides the seed from the config file")]
        seed: Option<u64>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub lambda: f64,
    #[arg(long, allow_negative_numbers = true)]
    pub mu: f64,
    #[arg(long, default_value_t = 1)]
    pub servers: u32,
}

#[derive(ValueEnum, Clone, Debug, PartialEq, Eq)]
pub enum FormatArg {
    Human,
    Summary,
    Json,
}

#[derive(Clone, Debug)]
pub enum Job {
    Scenario(ScenarioConfig),
    Extract {
        events: PathBuf,
        arrival_queue: String,
        service_queue: String,
        max_state: usize,
    },
    Cases,
}

pub fn parse_args() -> Result<Cli> {
    Cli::try_parse().map_err(|e| Error::Cli(e.to_string()))
}

pub fn build_job(cli: Cli) -> Result<(Job, FormatArg)> {
    let job = match cli.command {
        Command::Solve { model, max_state } => {
            Job::Scenario(scenario(model, max_state, None, Analysis::Solve))
        }
        Command::Extract {
            events,
            arrival_queue,
            service_queue,
            max_state,
        } => Job::Extract {
            events,
            arrival_queue,
            service_queue,
            max_state,
        },
        Command::Simulate { model, time, seed } => Job::Scenario(scenario(
            model,
            default_max_state(),
            seed,
            Analysis::Simulate { total_time: time },
        )),
        Command::MonteCarlo {
            model,
            time,
            runs,
            seed,
        } => Job::Scenario(scenario(
            model,
            default_max_state(),
            seed,
            Analysis::MonteCarlo {
                total_time: time,
                runs,
            },
        )),
        Command::Markov { model, steps, seed } => Job::Scenario(scenario(
            model,
            default_max_state(),
            seed,
            Analysis::Markov { steps },
        )),
        Command::Cases => Job::Cases,
        Command::Run { config, seed } => {
            let mut loaded = load_config(&config)?;
            if seed.is_some() {
                loaded.seed = seed;
            }
            Job::Scenario(loaded)
        }
    };
    Ok((job, cli.format))
}

fn scenario(
    model: ModelArgs,
    max_state: usize,
    seed: Option<u64>,
    analysis: Analysis,
) -> ScenarioConfig {
    ScenarioConfig {
        lambda: model.lambda,
        mu: model.mu,
        servers: model.servers,
        max_state,
        seed,
        analysis,
    }
}

pub fn load_config(path: &Path) -> Result<ScenarioConfig> {
    load_by_extension(path, "config")
}

/// Reads `path` as TOML or JSON depending on its extension.
pub fn load_by_extension<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let contents = fs::read_to_string(path).map_err(|err| {
        Error::ConfigIo(format!("failed to read {} '{}': {}", what, path.display(), err))
    })?;

    match path.extension().and_then(|value| value.to_str()) {
        Some("toml") => toml::from_str(&contents)
            .map_err(|err| Error::ConfigParse(format!("failed to parse TOML {}: {}", what, err))),
        Some("json") => serde_json::from_str(&contents)
            .map_err(|err| Error::ConfigParse(format!("failed to parse JSON {}: {}", what, err))),
        Some(other) => Err(Error::UnsupportedConfigFormat(other.to_string())),
        None => Err(Error::UnsupportedConfigFormat("unknown".to_string())),
    }
}
