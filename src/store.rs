use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use std::path::Path;

use tracing::debug;

use crate::config;
use crate::error::{Error, Result};
use crate::models::{
    ActiveService, EventKind, EventLog, EventRecord, QueueDefinition, QueueRole,
};

pub trait EventStore {
    fn records(&self, queue: &str) -> Vec<EventRecord>;

    fn records_of_kind(&self, queue: &str, kind: EventKind) -> Vec<EventRecord> {
        self.records(queue)
            .into_iter()
            .filter(|record| record.kind == kind)
            .collect()
    }
}

pub trait QueueRegistry {
    fn queue(&self, name: &str) -> Option<QueueDefinition>;
}

/// In-process store backing both persistence ports.
///
/// Queue renames and deletions cascade to every record, total and in-progress
/// service that references the queue.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    queues: BTreeMap<String, QueueDefinition>,
    records: Vec<EventRecord>,
    totals: BTreeMap<String, u64>,
    active: BTreeMap<String, VecDeque<ActiveService>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_log(log: EventLog) -> Result<Self> {
        let mut store = Self::new();
        for queue in log.queues {
            store.add_queue(queue)?;
        }
        for record in log.records {
            store.append(record)?;
        }
        Ok(store)
    }

    pub fn add_queue(&mut self, queue: QueueDefinition) -> Result<()> {
        if queue.name.trim().is_empty() {
            return Err(Error::InvalidParameter(
                "queue name must not be empty".to_string(),
            ));
        }
        if queue.role == QueueRole::Service && queue.servers == 0 {
            return Err(Error::InvalidParameter(format!(
                "service queue '{}' needs at least one server",
                queue.name
            )));
        }
        if self.queues.contains_key(&queue.name) {
            return Err(Error::DuplicateQueue(queue.name));
        }
        self.totals.entry(queue.name.clone()).or_insert(0);
        self.queues.insert(queue.name.clone(), queue);
        Ok(())
    }

    pub fn append(&mut self, record: EventRecord) -> Result<()> {
        if !self.queues.contains_key(&record.queue) {
            return Err(Error::UnknownQueue(record.queue));
        }
        let total = self.totals.entry(record.queue.clone()).or_insert(0);
        *total = (*total).max(record.element);
        self.records.push(record);
        Ok(())
    }

    /// Next sequence element for `queue`, one past the highest recorded so far.
    pub fn next_element(&self, queue: &str) -> Result<u64> {
        self.totals
            .get(queue)
            .map(|total| total + 1)
            .ok_or_else(|| Error::UnknownQueue(queue.to_string()))
    }

    pub fn rename_queue(&mut self, old: &str, new: &str) -> Result<()> {
        if !self.queues.contains_key(old) {
            return Err(Error::UnknownQueue(old.to_string()));
        }
        if old == new {
            return Ok(());
        }
        if new.trim().is_empty() {
            return Err(Error::InvalidParameter(
                "queue name must not be empty".to_string(),
            ));
        }
        if self.queues.contains_key(new) {
            return Err(Error::DuplicateQueue(new.to_string()));
        }
        if let Some(mut definition) = self.queues.remove(old) {
            definition.name = new.to_string();
            self.queues.insert(new.to_string(), definition);
        }

        let mut renamed = 0usize;
        for record in self.records.iter_mut().filter(|record| record.queue == old) {
            record.queue = new.to_string();
            renamed += 1;
        }
        if let Some(total) = self.totals.remove(old) {
            self.totals.insert(new.to_string(), total);
        }
        if let Some(active) = self.active.remove(old) {
            self.active.insert(new.to_string(), active);
        }
        debug!(old, new, renamed, "renamed queue");
        Ok(())
    }

    pub fn delete_queue(&mut self, name: &str) -> Result<()> {
        if self.queues.remove(name).is_none() {
            return Err(Error::UnknownQueue(name.to_string()));
        }
        self.records.retain(|record| record.queue != name);
        self.totals.remove(name);
        self.active.remove(name);
        debug!(name, "deleted queue");
        Ok(())
    }

    /// Puts the next client of a service queue into service and returns its
    /// sequence element.
    pub fn begin_service(&mut self, queue: &str, started: DateTime<Utc>) -> Result<u64> {
        self.require_service_queue(queue)?;
        let element = self.next_element(queue)?;
        self.totals.insert(queue.to_string(), element);
        self.active
            .entry(queue.to_string())
            .or_default()
            .push_back(ActiveService { element, started });
        Ok(element)
    }

    /// Completes the longest-running service on `queue` and records it.
    pub fn complete_service(&mut self, queue: &str, ended: DateTime<Utc>) -> Result<EventRecord> {
        self.require_service_queue(queue)?;
        let started = self
            .active
            .get(queue)
            .and_then(|active| active.front())
            .map(|service| service.started)
            .ok_or_else(|| {
                Error::InvalidParameter(format!("no service in progress on queue '{}'", queue))
            })?;
        let duration_ms = (ended - started)
            .num_microseconds()
            .map(|micros| micros as f64 / 1000.0)
            .filter(|ms| *ms >= 0.0)
            .ok_or_else(|| {
                Error::InvalidParameter(format!(
                    "service on queue '{}' cannot end before it started",
                    queue
                ))
            })?;
        let service = self
            .active
            .get_mut(queue)
            .and_then(|active| active.pop_front())
            .ok_or_else(|| {
                Error::InvalidParameter(format!("no service in progress on queue '{}'", queue))
            })?;

        let record = EventRecord {
            queue: queue.to_string(),
            kind: EventKind::Service,
            timestamp: service.started,
            total_duration_ms: duration_ms,
            element: service.element,
            service_start: Some(service.started),
            service_end: Some(ended),
        };
        self.append(record.clone())?;
        Ok(record)
    }

    pub fn active_services(&self, queue: &str) -> impl Iterator<Item = &ActiveService> {
        self.active.get(queue).into_iter().flatten()
    }

    fn require_service_queue(&self, queue: &str) -> Result<()> {
        let definition = self
            .queues
            .get(queue)
            .ok_or_else(|| Error::UnknownQueue(queue.to_string()))?;
        if definition.role != QueueRole::Service {
            return Err(Error::WrongQueueRole {
                name: queue.to_string(),
                expected: QueueRole::Service.to_string(),
            });
        }
        Ok(())
    }

    pub fn queues(&self) -> impl Iterator<Item = &QueueDefinition> {
        self.queues.values()
    }

    pub fn totals(&self) -> &BTreeMap<String, u64> {
        &self.totals
    }
}

impl EventStore for MemoryStore {
    fn records(&self, queue: &str) -> Vec<EventRecord> {
        self.records
            .iter()
            .filter(|record| record.queue == queue)
            .cloned()
            .collect()
    }
}

impl QueueRegistry for MemoryStore {
    fn queue(&self, name: &str) -> Option<QueueDefinition> {
        self.queues.get(name).cloned()
    }
}

pub fn load_event_log(path: &Path) -> Result<EventLog> {
    config::load_by_extension(path, "event log")
}
