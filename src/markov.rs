use tracing::debug;

use crate::error::{Error, Result};
use crate::models::QueueModel;
use crate::random::RandomSource;
use crate::state::{MarkovStep, MarkovTrace};

/// Steps the embedded birth-death chain starting from an empty system.
///
/// Each step moves up with probability `lambda / (lambda + min(c, n) * mu)`
/// and otherwise down (never below zero). This is a discrete-time
/// approximation of the continuous-time chain; holding times are ignored.
pub fn run_markov_chain(
    model: QueueModel,
    steps: usize,
    rng: &mut dyn RandomSource,
) -> Result<MarkovTrace> {
    model.require_stable()?;
    if steps == 0 {
        return Err(Error::InvalidParameter(
            "number of steps must be >= 1".to_string(),
        ));
    }

    let mut state = 0usize;
    let len = steps.checked_add(1).ok_or_else(|| too_many_steps(steps))?;
    let mut trace: MarkovTrace = Vec::new();
    trace
        .try_reserve_exact(len)
        .map_err(|_| too_many_steps(steps))?;
    trace.push(MarkovStep { step: 0, state });
    for step in 1..=steps {
        if rng.uniform01() < arrival_probability(&model, state) {
            state += 1;
        } else {
            state = state.saturating_sub(1);
        }
        trace.push(MarkovStep { step, state });
    }

    debug!(steps, final_state = state, "markov chain finished");
    Ok(trace)
}

fn too_many_steps(steps: usize) -> Error {
    Error::InvalidParameter(format!("{} steps are too many to record", steps))
}

fn arrival_probability(model: &QueueModel, state: usize) -> f64 {
    let busy = state.min(model.servers as usize) as f64;
    model.lambda / (model.lambda + busy * model.mu)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::testing::{CountingRandom, ScriptedRandom};
    use crate::random::SeededRandom;

    #[test]
    fn empty_system_always_moves_up() {
        let model = QueueModel::new(0.5, 1.0, 1);
        assert_eq!(arrival_probability(&model, 0), 1.0);
        assert!((arrival_probability(&model, 1) - 1.0 / 3.0).abs() < 1e-12);
        assert!((arrival_probability(&model, 7) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn busy_servers_cap_at_server_count() {
        let model = QueueModel::new(1.0, 1.0, 2);
        assert!((arrival_probability(&model, 1) - 0.5).abs() < 1e-12);
        assert!((arrival_probability(&model, 2) - 1.0 / 3.0).abs() < 1e-12);
        assert!((arrival_probability(&model, 9) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn scripted_steps_follow_draws() {
        let model = QueueModel::new(0.5, 1.0, 1);
        let mut rng = ScriptedRandom::new(vec![0.9, 0.2, 0.9, 0.9, 0.5]);
        let trace = run_markov_chain(model, 5, &mut rng).expect("chain should run");
        let states: Vec<usize> = trace.iter().map(|s| s.state).collect();
        assert_eq!(states, vec![0, 1, 2, 1, 0, 1]);
        let steps: Vec<usize> = trace.iter().map(|s| s.step).collect();
        assert_eq!(steps, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn seeded_chain_is_reproducible() {
        let model = QueueModel::new(1.2, 0.5, 3);
        let a = run_markov_chain(model, 500, &mut SeededRandom::new(8)).expect("chain should run");
        let b = run_markov_chain(model, 500, &mut SeededRandom::new(8)).expect("chain should run");
        assert_eq!(a, b);
        assert_eq!(a.len(), 501);
    }

    #[test]
    fn unstable_system_is_rejected_before_drawing() {
        let mut rng = CountingRandom::default();
        let err = run_markov_chain(QueueModel::new(1.0, 1.0, 1), 10, &mut rng).unwrap_err();
        assert!(matches!(err, Error::UnstableSystem { .. }));
        assert_eq!(rng.draws, 0);
    }

    #[test]
    fn zero_steps_is_rejected() {
        let mut rng = CountingRandom::default();
        let err = run_markov_chain(QueueModel::new(0.5, 1.0, 1), 0, &mut rng).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[test]
    fn unrecordable_step_count_is_rejected_before_drawing() {
        for steps in [usize::MAX, usize::MAX - 1] {
            let mut rng = CountingRandom::default();
            let err = run_markov_chain(QueueModel::new(0.5, 1.0, 1), steps, &mut rng).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("invalid parameter: {} steps are too many to record", steps)
            );
            assert_eq!(rng.draws, 0);
        }
    }
}
