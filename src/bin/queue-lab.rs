use queue_lab::config::{self, FormatArg, Job};
use queue_lab::error::Result;
use queue_lab::output::{Formatter, HumanFormatter, JsonFormatter, SummaryFormatter};
use queue_lab::scenario;
use queue_lab::store::{self, MemoryStore};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("queue_lab=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = config::parse_args()?;
    let (job, format) = config::build_job(args)?;
    let report = match job {
        Job::Scenario(config) => scenario::run_scenario(&config)?,
        Job::Extract {
            events,
            arrival_queue,
            service_queue,
            max_state,
        } => {
            let log = store::load_event_log(&events)?;
            let store = MemoryStore::from_log(log)?;
            scenario::run_extraction(&store, &arrival_queue, &service_queue, max_state)?
        }
        Job::Cases => scenario::run_case_studies()?,
    };

    let formatter = formatter_for(&format);
    print!("{}", formatter.write(&report));

    Ok(())
}

fn formatter_for(format: &FormatArg) -> Box<dyn Formatter> {
    match format {
        FormatArg::Human => Box::new(HumanFormatter),
        FormatArg::Summary => Box::new(SummaryFormatter),
        FormatArg::Json => Box::new(JsonFormatter),
    }
}
