//! Telemetry: the ordered trace of processed events and the KPIs derived from a run.

use std::fmt::Write as _;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::clock::{Event, SimEvent};
use crate::entities::{DriverId, EntityStore, ReservationId};
use crate::spatial::GridPos;

/// One processed event. `driver_location` is the driver's position after the
/// handler ran (`None` for events without a driver).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    pub step: u64,
    pub time: f64,
    pub event: SimEvent,
    pub driver_location: Option<GridPos>,
}

impl TraceRecord {
    pub fn new(step: u64, event: &Event, driver_location: Option<GridPos>) -> Self {
        Self {
            step,
            time: event.timestamp,
            event: event.payload,
            driver_location,
        }
    }

    /// Single log line: `time, kind, location, ids`.
    pub fn describe(&self) -> String {
        let mut line = format!("{:.1}, {}", self.time, self.event.kind().as_str());
        if let Some(location) = self.driver_location {
            let _ = write!(line, ", {location}");
        }
        if let Some(driver) = self.event.driver() {
            let _ = write!(line, ", DriverId: {}", driver.0);
        }
        if let Some(reservation) = self.event.reservation() {
            let _ = write!(line, ", ResId: {}", reservation.0);
        }
        line
    }
}

/// Processed events in processing order.
#[derive(Debug, Default, Clone, Resource)]
pub struct EventTrace {
    pub records: Vec<TraceRecord>,
}

impl EventTrace {
    pub fn push(&mut self, record: TraceRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last_time(&self) -> Option<f64> {
        self.records.last().map(|record| record.time)
    }

    /// Event-log text, one described record per line.
    pub fn to_log_lines(&self) -> String {
        let mut out = String::new();
        for record in &self.records {
            out.push_str(&record.describe());
            out.push('\n');
        }
        out
    }
}

/// Reservations a driver has dropped off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverHistory {
    pub driver: DriverId,
    pub serviced: Vec<ReservationId>,
}

/// Summary statistics over a set of samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WaitStats {
    pub avg: f64,
    pub median: f64,
    pub p90: f64,
}

impl WaitStats {
    /// Empty input yields all zeros.
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let n = sorted.len();
        let avg = sorted.iter().sum::<f64>() / n as f64;
        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };
        let p90_idx = ((n - 1) as f64 * 0.9) as usize;
        let p90 = sorted[p90_idx.min(n - 1)];
        Self { avg, median, p90 }
    }
}

/// KPIs computed from the entity store at the end of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimMetrics {
    pub reservations: usize,
    pub completed: usize,
    /// Reservations never assigned to a driver.
    pub unserved: usize,
    pub free_rides: usize,
    pub free_ride_passengers: u32,
    pub total_passengers: u32,
    /// `1 − free_ride_passengers / total_passengers`; 1.0 when there were no passengers.
    pub paid_fraction: f64,
    pub wait: WaitStats,
    pub driver_histories: Vec<DriverHistory>,
}

impl SimMetrics {
    pub fn from_store(store: &EntityStore, free_ride_threshold_secs: f64) -> Self {
        let reservations = store.reservations();
        let completed = reservations
            .iter()
            .filter(|reservation| reservation.dropoff_time.is_some())
            .count();
        let unserved = reservations
            .iter()
            .filter(|reservation| !reservation.assigned)
            .count();

        let free: Vec<_> = reservations
            .iter()
            .filter(|reservation| {
                reservation
                    .wait_time()
                    .is_some_and(|wait| wait > free_ride_threshold_secs)
            })
            .collect();
        let free_ride_passengers = free.iter().map(|reservation| reservation.party_size).sum();
        let total_passengers: u32 = reservations
            .iter()
            .map(|reservation| reservation.party_size)
            .sum();
        let paid_fraction = if total_passengers == 0 {
            1.0
        } else {
            1.0 - f64::from(free_ride_passengers) / f64::from(total_passengers)
        };

        let waits: Vec<f64> = reservations
            .iter()
            .filter_map(|reservation| reservation.wait_time())
            .collect();

        let driver_histories = store
            .drivers()
            .iter()
            .map(|driver| DriverHistory {
                driver: driver.id,
                serviced: driver.serviced_passengers.clone(),
            })
            .collect();

        Self {
            reservations: reservations.len(),
            completed,
            unserved,
            free_rides: free.len(),
            free_ride_passengers,
            total_passengers,
            paid_fraction,
            wait: WaitStats::from_samples(&waits),
            driver_histories,
        }
    }
}
