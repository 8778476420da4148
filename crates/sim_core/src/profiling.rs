//! Event processing counters: totals, per-kind counts and wall-clock rate.

use std::collections::BTreeMap;
use std::time::Instant;

use bevy_ecs::prelude::Resource;

use crate::clock::EventKind;

#[derive(Debug, Default, Resource)]
pub struct EventMetrics {
    pub events_processed: u64,
    /// Wall-clock instant of the first recorded event.
    pub start_time: Option<Instant>,
    pub events_by_kind: BTreeMap<EventKind, u64>,
}

impl EventMetrics {
    pub fn record_event(&mut self, kind: EventKind) {
        if self.start_time.is_none() {
            self.start_time = Some(Instant::now());
        }
        self.events_processed += 1;
        *self.events_by_kind.entry(kind).or_insert(0) += 1;
    }

    pub fn count(&self, kind: EventKind) -> u64 {
        self.events_by_kind.get(&kind).copied().unwrap_or(0)
    }

    /// Events per wall-clock second since the first recorded event.
    pub fn events_per_second(&self) -> f64 {
        let Some(start) = self.start_time else {
            return 0.0;
        };
        let elapsed = start.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.events_processed as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn print_summary(&self) {
        println!("\n=== Event Processing Summary ===");
        println!("Total events processed: {}", self.events_processed);
        if let Some(start) = self.start_time {
            println!("Total time: {:.2}s", start.elapsed().as_secs_f64());
            println!("Events per second: {:.0}", self.events_per_second());
        }

        println!("\nEvents by kind:");
        for kind in EventKind::ALL {
            println!("  {:24} : {}", kind.as_str(), self.count(kind));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_kind() {
        let mut metrics = EventMetrics::default();
        metrics.record_event(EventKind::PickUp);
        metrics.record_event(EventKind::PickUp);
        metrics.record_event(EventKind::DropOff);
        assert_eq!(metrics.events_processed, 3);
        assert_eq!(metrics.count(EventKind::PickUp), 2);
        assert_eq!(metrics.count(EventKind::DropOff), 1);
        assert_eq!(metrics.count(EventKind::IdleArrival), 0);
        assert!(metrics.start_time.is_some());
    }
}
