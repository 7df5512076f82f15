use tracing::debug;

use crate::engine::run_simulation_summary;
use crate::error::{Error, Result};
use crate::models::QueueModel;
use crate::random::RandomSource;
use crate::state::MonteCarloSummary;

/// Repeats the discrete-event run `runs` times and averages the per-run
/// averages. Raw samples are never pooled across runs.
pub fn run_monte_carlo(
    model: QueueModel,
    total_time: f64,
    runs: usize,
    rng: &mut dyn RandomSource,
) -> Result<MonteCarloSummary> {
    model.require_stable()?;
    if runs == 0 {
        return Err(Error::InvalidParameter(
            "number of runs must be >= 1".to_string(),
        ));
    }

    let mut queue_length = 0.0;
    let mut utilization = 0.0;
    let mut waiting_time = 0.0;
    for run in 0..runs {
        let stats = run_simulation_summary(model, total_time, rng)?;
        debug!(run, customers = stats.customers, "monte carlo run finished");
        queue_length += stats.avg_queue_length;
        utilization += stats.avg_utilization;
        waiting_time += stats.avg_waiting_time;
    }

    let runs_f = runs as f64;
    Ok(MonteCarloSummary {
        runs,
        avg_queue_length: queue_length / runs_f,
        avg_utilization: utilization / runs_f,
        avg_waiting_time: waiting_time / runs_f,
    })
}
