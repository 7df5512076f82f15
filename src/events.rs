#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Event {
    Arrival,
    Departure { server: usize },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduledEvent {
    pub time: f64,
    pub event: Event,
}

impl ScheduledEvent {
    pub fn new(time: f64, event: Event) -> Self {
        Self { time, event }
    }
}

/// Earliest pending event given the next arrival and one departure slot per
/// server (`f64::INFINITY` marks an idle server).
///
/// The arrival wins a tie with a departure; equal departures resolve to the
/// lowest server index.
pub fn next_event(next_arrival: f64, departures: &[f64]) -> ScheduledEvent {
    let mut earliest = ScheduledEvent::new(next_arrival, Event::Arrival);
    for (server, &time) in departures.iter().enumerate() {
        if time < earliest.time {
            earliest = ScheduledEvent::new(time, Event::Departure { server });
        }
    }
    earliest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_earliest_departure() {
        let event = next_event(5.0, &[f64::INFINITY, 3.0, 4.0]);
        assert_eq!(event, ScheduledEvent::new(3.0, Event::Departure { server: 1 }));
    }

    #[test]
    fn arrival_wins_tie() {
        let event = next_event(2.0, &[2.0, f64::INFINITY]);
        assert_eq!(event.event, Event::Arrival);
    }

    #[test]
    fn equal_departures_resolve_to_lowest_server() {
        let event = next_event(9.0, &[f64::INFINITY, 1.5, 1.5]);
        assert_eq!(event.event, Event::Departure { server: 1 });
    }

    #[test]
    fn idle_servers_leave_arrival_pending() {
        let event = next_event(0.7, &[f64::INFINITY; 3]);
        assert_eq!(event, ScheduledEvent::new(0.7, Event::Arrival));
    }
}
