use tracing::info;

use crate::cases;
use crate::engine::run_simulation;
use crate::error::Result;
use crate::extract::extract_from_store;
use crate::markov::run_markov_chain;
use crate::models::{Analysis, ScenarioConfig};
use crate::monte_carlo::run_monte_carlo;
use crate::random::SeededRandom;
use crate::solver;
use crate::state::{Report, RunMetadata};
use crate::store::{EventStore, QueueRegistry};

pub fn run_scenario(config: &ScenarioConfig) -> Result<Report> {
    let model = config.model();
    let seed = if config.analysis.uses_randomness() {
        let seed = config.seed.unwrap_or_else(rand::random);
        info!(seed, analysis = %config.analysis, "seeding random source");
        Some(seed)
    } else {
        None
    };
    let metadata = RunMetadata {
        analysis: config.analysis.to_string(),
        lambda: config.lambda,
        mu: config.mu,
        servers: config.servers,
        seed,
    };
    let mut rng = SeededRandom::new(seed.unwrap_or(0));

    match config.analysis {
        Analysis::Solve => {
            let steady = solver::solve(config.lambda, config.mu, config.servers, config.max_state)?;
            Ok(Report::Steady { metadata, steady })
        }
        Analysis::Simulate { total_time } => {
            let outcome = run_simulation(model, total_time, &mut rng)?;
            Ok(Report::Trace {
                metadata,
                statistics: outcome.statistics,
                trace: outcome.trace,
            })
        }
        Analysis::MonteCarlo { total_time, runs } => {
            let summary = run_monte_carlo(model, total_time, runs, &mut rng)?;
            Ok(Report::MonteCarlo { metadata, summary })
        }
        Analysis::Markov { steps } => {
            let steps = run_markov_chain(model, steps, &mut rng)?;
            Ok(Report::Markov { metadata, steps })
        }
    }
}

pub fn run_extraction<S>(
    store: &S,
    arrival_queue: &str,
    service_queue: &str,
    max_state: usize,
) -> Result<Report>
where
    S: EventStore + QueueRegistry,
{
    let metrics = extract_from_store(store, arrival_queue, service_queue, max_state)?;
    Ok(Report::Empirical {
        arrival_queue: arrival_queue.to_string(),
        service_queue: service_queue.to_string(),
        metrics,
    })
}

pub fn run_case_studies() -> Result<Report> {
    Ok(Report::Cases {
        cases: cases::solve_all()?,
    })
}
