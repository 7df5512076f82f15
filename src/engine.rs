use std::collections::VecDeque;

use tracing::debug;

use crate::error::{Error, Result};
use crate::events::{next_event, Event};
use crate::models::QueueModel;
use crate::random::{exponential, RandomSource};
use crate::state::{RunStatistics, SimulationTrace, TracePoint};

#[derive(Clone, Debug, Default)]
pub struct SimulationOutcome {
    pub trace: SimulationTrace,
    pub statistics: RunStatistics,
}

#[derive(Clone, Debug)]
struct EngineState {
    time: f64,
    next_arrival: f64,
    departures: Vec<f64>,
    waiting: VecDeque<f64>,
    busy: usize,
}

impl EngineState {
    fn occupancy(&self) -> usize {
        self.waiting.len() + self.busy
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Accumulators {
    queue_area: f64,
    busy_area: f64,
    waiting_sum: f64,
    served: usize,
}

/// Event-by-event M/M/c simulation over `[0, total_time]`.
pub struct SimulationEngine<'a> {
    model: QueueModel,
    total_time: f64,
    rng: &'a mut dyn RandomSource,
}

impl<'a> SimulationEngine<'a> {
    pub fn new(model: QueueModel, total_time: f64, rng: &'a mut dyn RandomSource) -> Self {
        Self {
            model,
            total_time,
            rng,
        }
    }

    pub fn run(&mut self, record_trace: bool) -> Result<SimulationOutcome> {
        self.model.require_stable()?;
        if !self.total_time.is_finite() || self.total_time <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "total time must be > 0 (got {})",
                self.total_time
            )));
        }

        let servers = self.model.servers as usize;
        let mut state = EngineState {
            time: 0.0,
            next_arrival: exponential(self.rng, self.model.lambda),
            departures: vec![f64::INFINITY; servers],
            waiting: VecDeque::new(),
            busy: 0,
        };
        let mut acc = Accumulators::default();
        let mut trace = Vec::new();

        loop {
            let scheduled = next_event(state.next_arrival, &state.departures);
            if scheduled.time > self.total_time {
                break;
            }

            let elapsed = scheduled.time - state.time;
            acc.queue_area += state.occupancy() as f64 * elapsed;
            acc.busy_area += state.busy as f64 * elapsed;
            state.time = scheduled.time;

            if record_trace {
                trace.push(TracePoint {
                    time: state.time,
                    queue_length: state.occupancy(),
                });
            }

            match scheduled.event {
                Event::Arrival => {
                    state.waiting.push_back(state.time);
                    state.next_arrival = state.time + exponential(self.rng, self.model.lambda);
                    if let Some(server) = state.departures.iter().position(|t| t.is_infinite()) {
                        state.busy += 1;
                        self.start_service(&mut state, &mut acc, server);
                    }
                }
                Event::Departure { server } => {
                    state.departures[server] = f64::INFINITY;
                    state.busy -= 1;
                    if !state.waiting.is_empty() {
                        state.busy += 1;
                        self.start_service(&mut state, &mut acc, server);
                    }
                }
            }
        }

        let statistics = RunStatistics {
            avg_queue_length: acc.queue_area / self.total_time,
            avg_utilization: acc.busy_area / (self.total_time * servers as f64),
            avg_waiting_time: if acc.served == 0 {
                0.0
            } else {
                acc.waiting_sum / acc.served as f64
            },
            customers: acc.served,
        };

        debug!(
            lambda = self.model.lambda,
            mu = self.model.mu,
            servers,
            total_time = self.total_time,
            served = acc.served,
            "discrete-event run finished"
        );

        Ok(SimulationOutcome { trace, statistics })
    }

    fn start_service(&mut self, state: &mut EngineState, acc: &mut Accumulators, server: usize) {
        if let Some(arrived_at) = state.waiting.pop_front() {
            acc.waiting_sum += state.time - arrived_at;
            acc.served += 1;
        }
        state.departures[server] = state.time + exponential(self.rng, self.model.mu);
    }
}

pub fn run_simulation(
    model: QueueModel,
    total_time: f64,
    rng: &mut dyn RandomSource,
) -> Result<SimulationOutcome> {
    run_simulation_with_options(model, total_time, rng, true)
}

pub fn run_simulation_summary(
    model: QueueModel,
    total_time: f64,
    rng: &mut dyn RandomSource,
) -> Result<RunStatistics> {
    run_simulation_with_options(model, total_time, rng, false).map(|outcome| outcome.statistics)
}

pub fn run_simulation_with_options(
    model: QueueModel,
    total_time: f64,
    rng: &mut dyn RandomSource,
    record_trace: bool,
) -> Result<SimulationOutcome> {
    let mut engine = SimulationEngine::new(model, total_time, rng);
    engine.run(record_trace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::testing::{CountingRandom, ScriptedRandom};
    use crate::random::SeededRandom;

    /// Uniform draw whose exponential sample at `rate` equals `value`.
    fn draw_for(value: f64, rate: f64) -> f64 {
        (-value * rate).exp()
    }

    #[test]
    fn scripted_single_server_trace() {
        // arrival at 1, service 2, arrival at 2 waits, second service 1
        let mut rng = ScriptedRandom::new(vec![
            draw_for(1.0, 1.0),
            draw_for(1.0, 1.0),
            draw_for(2.0, 2.0),
            draw_for(10.0, 1.0),
            draw_for(1.0, 2.0),
        ]);
        let model = QueueModel::new(1.0, 2.0, 1);
        let outcome = run_simulation(model, 5.0, &mut rng).expect("simulation should succeed");

        let times: Vec<f64> = outcome.trace.iter().map(|p| p.time).collect();
        let lengths: Vec<usize> = outcome.trace.iter().map(|p| p.queue_length).collect();
        assert_eq!(lengths, vec![0, 1, 2, 1]);
        for (actual, expected) in times.iter().zip([1.0, 2.0, 3.0, 4.0]) {
            assert!((actual - expected).abs() < 1e-9);
        }

        let stats = outcome.statistics;
        assert_eq!(stats.customers, 2);
        assert!((stats.avg_waiting_time - 0.5).abs() < 1e-9);
        assert!((stats.avg_queue_length - 4.0 / 5.0).abs() < 1e-9);
        assert!((stats.avg_utilization - 3.0 / 5.0).abs() < 1e-9);
    }

    #[test]
    fn trace_times_are_non_decreasing_and_bounded() {
        let mut rng = SeededRandom::new(7);
        let model = QueueModel::new(1.5, 1.0, 2);
        let outcome = run_simulation(model, 200.0, &mut rng).expect("simulation should succeed");
        assert!(!outcome.trace.is_empty());
        for pair in outcome.trace.windows(2) {
            assert!(pair[0].time <= pair[1].time);
        }
        assert!(outcome.trace.iter().all(|p| p.time <= 200.0));
    }

    #[test]
    fn utilization_tracks_rho_over_long_runs() {
        let mut rng = SeededRandom::new(11);
        let model = QueueModel::new(0.5, 1.0, 1);
        let stats =
            run_simulation_summary(model, 50_000.0, &mut rng).expect("simulation should succeed");
        assert!((stats.avg_utilization - 0.5).abs() < 0.05);
        assert!((stats.avg_queue_length - 1.0).abs() < 0.25);
    }

    #[test]
    fn summary_run_skips_trace_but_matches_statistics() {
        let model = QueueModel::new(0.9, 0.5, 3);
        let mut full_rng = SeededRandom::new(3);
        let mut summary_rng = SeededRandom::new(3);
        let full = run_simulation(model, 300.0, &mut full_rng).expect("simulation should succeed");
        let summary = run_simulation_summary(model, 300.0, &mut summary_rng)
            .expect("simulation should succeed");
        assert_eq!(full.statistics, summary);
    }

    #[test]
    fn unstable_system_is_rejected_before_drawing() {
        let mut rng = CountingRandom::default();
        let err = run_simulation(QueueModel::new(2.0, 1.0, 2), 10.0, &mut rng).unwrap_err();
        assert!(matches!(err, Error::UnstableSystem { .. }));
        assert_eq!(rng.draws, 0);
    }

    #[test]
    fn non_positive_horizon_is_rejected() {
        let mut rng = CountingRandom::default();
        let err = run_simulation(QueueModel::new(0.5, 1.0, 1), 0.0, &mut rng).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
        assert_eq!(rng.draws, 0);
    }
}
