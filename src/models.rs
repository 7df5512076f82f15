use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    Arrival,
    Service,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Arrival => write!(f, "arrival"),
            EventKind::Service => write!(f, "service"),
        }
    }
}

/// A single stopwatch measurement taken by an operator.
///
/// Arrival records only carry `timestamp`. Service records additionally carry
/// the instants the client entered and left service, with `total_duration_ms`
/// holding the measured service time.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct EventRecord {
    pub queue: String,
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
    pub total_duration_ms: f64,
    pub element: u64,
    #[serde(default)]
    pub service_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub service_end: Option<DateTime<Utc>>,
}

pub type QueueRole = EventKind;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct QueueDefinition {
    pub name: String,
    pub role: QueueRole,
    #[serde(default = "default_servers")]
    pub servers: u32,
}

impl QueueDefinition {
    pub fn arrival(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: QueueRole::Arrival,
            servers: 1,
        }
    }

    pub fn service(name: impl Into<String>, servers: u32) -> Self {
        Self {
            name: name.into(),
            role: QueueRole::Service,
            servers,
        }
    }
}

/// A client currently being served on a service queue.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ActiveService {
    pub element: u64,
    pub started: DateTime<Utc>,
}

/// Rates and server count of an M/M/c system.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
pub struct QueueModel {
    pub lambda: f64,
    pub mu: f64,
    pub servers: u32,
}

impl QueueModel {
    pub fn new(lambda: f64, mu: f64, servers: u32) -> Self {
        Self {
            lambda,
            mu,
            servers,
        }
    }

    pub fn rho(&self) -> f64 {
        self.lambda / (self.servers as f64 * self.mu)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.lambda.is_finite() || self.lambda <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "arrival rate must be > 0 (got {})",
                self.lambda
            )));
        }
        if !self.mu.is_finite() || self.mu <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "service rate must be > 0 (got {})",
                self.mu
            )));
        }
        if self.servers == 0 {
            return Err(Error::InvalidParameter(
                "server count must be >= 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Simulators refuse to start on a system whose queue grows without bound.
    pub fn require_stable(&self) -> Result<()> {
        self.validate()?;
        let rho = self.rho();
        if rho >= 1.0 {
            return Err(Error::UnstableSystem { rho });
        }
        Ok(())
    }
}

/// On-disk shape of an exported event log.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventLog {
    #[serde(default)]
    pub queues: Vec<QueueDefinition>,
    #[serde(default)]
    pub records: Vec<EventRecord>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ScenarioConfig {
    pub lambda: f64,
    pub mu: f64,
    #[serde(default = "default_servers")]
    pub servers: u32,
    #[serde(default = "default_max_state")]
    pub max_state: usize,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub analysis: Analysis,
}

#[derive(Clone, Debug, Deserialize, Serialize, Default, PartialEq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Analysis {
    #[default]
    Solve,
    Simulate {
        #[serde(default = "default_total_time")]
        total_time: f64,
    },
    MonteCarlo {
        #[serde(default = "default_total_time")]
        total_time: f64,
        #[serde(default = "default_runs")]
        runs: usize,
    },
    Markov {
        #[serde(default = "default_steps")]
        steps: usize,
    },
}

impl ScenarioConfig {
    pub fn model(&self) -> QueueModel {
        QueueModel::new(self.lambda, self.mu, self.servers)
    }
}

impl Analysis {
    pub fn uses_randomness(&self) -> bool {
        !matches!(self, Analysis::Solve)
    }
}

impl fmt::Display for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Analysis::Solve => write!(f, "solve"),
            Analysis::Simulate { .. } => write!(f, "simulate"),
            Analysis::MonteCarlo { .. } => write!(f, "monte-carlo"),
            Analysis::Markov { .. } => write!(f, "markov"),
        }
    }
}

fn default_servers() -> u32 {
    1
}

pub(crate) fn default_max_state() -> usize {
    50
}

pub(crate) fn default_total_time() -> f64 {
    100.0
}

pub(crate) fn default_runs() -> usize {
    10
}

pub(crate) fn default_steps() -> usize {
    100
}
