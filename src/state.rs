use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cases::CaseReport;

/// Truncated birth-death equilibrium of an M/M/c system.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct SteadyState {
    pub lambda: f64,
    pub mu: f64,
    pub servers: u32,
    pub rho: f64,
    pub p: Vec<f64>,
    pub l: f64,
    pub lq: f64,
    pub w: f64,
    pub wq: f64,
}

impl SteadyState {
    pub fn is_stable(&self) -> bool {
        self.rho < 1.0
    }

    pub fn p0(&self) -> f64 {
        self.p.first().copied().unwrap_or(0.0)
    }

    pub fn max_state(&self) -> usize {
        self.p.len().saturating_sub(1)
    }
}

/// Metrics derived from measured arrival/service logs.
///
/// Times are in seconds. `waiting_times`, `idle_times` and `timestamps` are
/// indexed by matched element in sequence order; `inter_arrivals` and
/// `service_times` only keep the strictly positive samples used for the rate
/// estimates.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct QueueMetrics {
    pub lambda: f64,
    pub mu: f64,
    pub rho: f64,
    pub servers: u32,
    pub l: f64,
    pub lq: f64,
    pub w: f64,
    pub wq: f64,
    pub p: Vec<f64>,
    pub idle_time: f64,
    pub idle_proportion: f64,
    pub avg_service_time: f64,
    pub waiting_times: Vec<f64>,
    pub idle_times: Vec<f64>,
    pub inter_arrivals: Vec<f64>,
    pub service_times: Vec<f64>,
    pub timestamps: Vec<DateTime<Utc>>,
    pub flow: Vec<FlowPoint>,
}

impl QueueMetrics {
    pub fn is_stable(&self) -> bool {
        self.rho < 1.0
    }
}

/// Running arrival and departure counts at `time` seconds after the first
/// logged event.
#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct FlowPoint {
    pub time: f64,
    pub arrivals: usize,
    pub departures: usize,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct TracePoint {
    pub time: f64,
    pub queue_length: usize,
}

pub type SimulationTrace = Vec<TracePoint>;

/// Time-weighted averages of a single discrete-event run.
#[derive(Clone, Copy, Debug, Default, Serialize, PartialEq)]
pub struct RunStatistics {
    pub avg_queue_length: f64,
    pub avg_utilization: f64,
    pub avg_waiting_time: f64,
    pub customers: usize,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct MonteCarloSummary {
    pub runs: usize,
    pub avg_queue_length: f64,
    pub avg_utilization: f64,
    pub avg_waiting_time: f64,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct MarkovStep {
    pub step: usize,
    pub state: usize,
}

pub type MarkovTrace = Vec<MarkovStep>;

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct RunMetadata {
    pub analysis: String,
    pub lambda: f64,
    pub mu: f64,
    pub servers: u32,
    pub seed: Option<u64>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "report", rename_all = "kebab-case")]
pub enum Report {
    Steady {
        metadata: RunMetadata,
        steady: SteadyState,
    },
    Empirical {
        arrival_queue: String,
        service_queue: String,
        metrics: QueueMetrics,
    },
    Trace {
        metadata: RunMetadata,
        statistics: RunStatistics,
        trace: SimulationTrace,
    },
    MonteCarlo {
        metadata: RunMetadata,
        summary: MonteCarloSummary,
    },
    Markov {
        metadata: RunMetadata,
        steps: MarkovTrace,
    },
    Cases {
        cases: Vec<CaseReport>,
    },
}
