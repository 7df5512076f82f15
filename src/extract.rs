use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{EventKind, EventRecord, QueueRole};
use crate::solver;
use crate::state::{FlowPoint, QueueMetrics};
use crate::store::{EventStore, QueueRegistry};

/// An arrival paired with the service record sharing its sequence element.
struct MatchedElement<'a> {
    element: u64,
    arrival: &'a EventRecord,
    service: &'a EventRecord,
    service_start: DateTime<Utc>,
}

/// Estimates lambda and mu from measured logs and feeds them to the solver.
///
/// Only sequence elements present in both logs are used. The whole batch is
/// rejected if any service starts before its matching arrival.
pub fn extract(
    arrivals: &[EventRecord],
    services: &[EventRecord],
    servers: u32,
    max_state: usize,
) -> Result<QueueMetrics> {
    if servers == 0 {
        return Err(Error::InvalidParameter(
            "server count must be >= 1".to_string(),
        ));
    }

    let matched = match_elements(arrivals, services);
    if matched.is_empty() {
        return Err(Error::InsufficientData(
            "no sequence element appears in both the arrival and service logs".to_string(),
        ));
    }

    let inter_arrivals: Vec<f64> = matched
        .windows(2)
        .map(|pair| seconds_between(pair[0].arrival.timestamp, pair[1].arrival.timestamp))
        .filter(|gap| *gap > 0.0)
        .collect();
    if inter_arrivals.is_empty() {
        return Err(Error::InsufficientData(
            "no positive inter-arrival gap; all arrivals share one timestamp".to_string(),
        ));
    }
    let lambda = 1.0 / mean(&inter_arrivals);
    if !lambda.is_finite() || lambda <= 0.0 {
        return Err(Error::InvalidParameter(format!(
            "estimated arrival rate is not usable ({})",
            lambda
        )));
    }

    let service_times: Vec<f64> = matched
        .iter()
        .map(|entry| entry.service.total_duration_ms / 1000.0)
        .filter(|duration| *duration > 0.0)
        .collect();
    if service_times.is_empty() {
        return Err(Error::InsufficientData(
            "no positive service duration recorded".to_string(),
        ));
    }
    let avg_service_time = mean(&service_times);
    let mu = 1.0 / avg_service_time;
    if !mu.is_finite() || mu <= 0.0 {
        return Err(Error::InvalidParameter(format!(
            "estimated service rate is not usable ({})",
            mu
        )));
    }

    let mut waiting_times = Vec::with_capacity(matched.len());
    for entry in &matched {
        let wait = seconds_between(entry.arrival.timestamp, entry.service_start);
        if wait < 0.0 {
            return Err(Error::CausalityViolation {
                element: entry.element,
                wait_seconds: -wait,
            });
        }
        waiting_times.push(wait);
    }

    let steady = solver::solve(lambda, mu, servers, max_state)?;
    if !steady.is_stable() {
        warn!(
            rho = steady.rho,
            "measured system is unstable; steady-state metrics are approximate"
        );
    }

    let first_arrival = matched[0].arrival.timestamp;
    let mut server_free_at = 0.0;
    let mut idle_times = Vec::with_capacity(matched.len());
    for entry in &matched {
        let arrival = seconds_between(first_arrival, entry.arrival.timestamp);
        let idle = (arrival - server_free_at).max(0.0);
        idle_times.push(idle);
        let duration = (entry.service.total_duration_ms / 1000.0).max(0.0);
        server_free_at = server_free_at.max(arrival) + duration;
    }
    let idle_time: f64 = idle_times.iter().sum();
    let idle_proportion = if server_free_at > 0.0 {
        idle_time / server_free_at
    } else {
        0.0
    };

    debug!(
        elements = matched.len(),
        lambda, mu, idle_time, "extracted empirical metrics"
    );

    Ok(QueueMetrics {
        lambda,
        mu,
        rho: steady.rho,
        servers,
        l: steady.l,
        lq: steady.lq,
        w: steady.w,
        wq: steady.wq,
        p: steady.p,
        idle_time,
        idle_proportion,
        avg_service_time,
        waiting_times,
        idle_times,
        inter_arrivals,
        service_times,
        timestamps: matched.iter().map(|entry| entry.arrival.timestamp).collect(),
        flow: cumulative_flow(arrivals, services),
    })
}

/// Upper bound on the number of points kept by [`cumulative_flow`].
pub const FLOW_POINTS: usize = 100;

/// Cumulative arrivals and departures over the whole logs, unmatched records
/// included.
///
/// Arrivals count at their timestamp and services at `service_end`; services
/// missing either instant are skipped. An arrival sorts before a departure at
/// the same instant. Only every `ceil(len / FLOW_POINTS)`-th event is kept,
/// starting with the first, but the counts always include every event.
pub fn cumulative_flow(arrivals: &[EventRecord], services: &[EventRecord]) -> Vec<FlowPoint> {
    let mut events: Vec<(DateTime<Utc>, bool)> = arrivals
        .iter()
        .filter(|record| record.kind == EventKind::Arrival)
        .map(|record| (record.timestamp, true))
        .collect();
    events.extend(
        services
            .iter()
            .filter(|record| record.kind == EventKind::Service && record.service_start.is_some())
            .filter_map(|record| record.service_end)
            .map(|end| (end, false)),
    );
    events.sort_by_key(|&(time, _)| time);

    let Some(&(start, _)) = events.first() else {
        return Vec::new();
    };
    let step = events.len().div_ceil(FLOW_POINTS).max(1);
    let mut arrived = 0;
    let mut departed = 0;
    let mut points = Vec::with_capacity(events.len() / step + 1);
    for (idx, &(time, is_arrival)) in events.iter().enumerate() {
        if is_arrival {
            arrived += 1;
        } else {
            departed += 1;
        }
        if idx % step == 0 {
            points.push(FlowPoint {
                time: seconds_between(start, time),
                arrivals: arrived,
                departures: departed,
            });
        }
    }
    points
}

/// Pulls both logs and the server count through the persistence ports.
pub fn extract_from_store<S>(
    store: &S,
    arrival_queue: &str,
    service_queue: &str,
    max_state: usize,
) -> Result<QueueMetrics>
where
    S: EventStore + QueueRegistry,
{
    let arrival_def = store
        .queue(arrival_queue)
        .ok_or_else(|| Error::UnknownQueue(arrival_queue.to_string()))?;
    if arrival_def.role != QueueRole::Arrival {
        return Err(Error::WrongQueueRole {
            name: arrival_queue.to_string(),
            expected: QueueRole::Arrival.to_string(),
        });
    }
    let service_def = store
        .queue(service_queue)
        .ok_or_else(|| Error::UnknownQueue(service_queue.to_string()))?;
    if service_def.role != QueueRole::Service {
        return Err(Error::WrongQueueRole {
            name: service_queue.to_string(),
            expected: QueueRole::Service.to_string(),
        });
    }

    let arrivals = store.records_of_kind(arrival_queue, EventKind::Arrival);
    let services = store.records_of_kind(service_queue, EventKind::Service);
    extract(&arrivals, &services, service_def.servers, max_state)
}

fn match_elements<'a>(
    arrivals: &'a [EventRecord],
    services: &'a [EventRecord],
) -> Vec<MatchedElement<'a>> {
    let mut by_element: BTreeMap<u64, &EventRecord> = BTreeMap::new();
    for record in arrivals {
        by_element.entry(record.element).or_insert(record);
    }

    let mut service_by_element: BTreeMap<u64, (&EventRecord, DateTime<Utc>)> = BTreeMap::new();
    for record in services {
        if let Some(start) = record.service_start {
            service_by_element
                .entry(record.element)
                .or_insert((record, start));
        }
    }

    by_element
        .into_iter()
        .filter_map(|(element, arrival)| {
            service_by_element
                .get(&element)
                .map(|&(service, service_start)| MatchedElement {
                    element,
                    arrival,
                    service,
                    service_start,
                })
        })
        .collect()
}

fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_microseconds().unwrap_or(i64::MAX) as f64 / 1_000_000.0
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
