//! Metrics extraction from simulation results.
//!
//! Flattens the end-of-run KPIs of one simulation into a single exportable row.

use bevy_ecs::prelude::World;
use serde::{Deserialize, Serialize};
use sim_core::entities::EntityStore;
use sim_core::profiling::EventMetrics;
use sim_core::scenario::FreeRideThresholdSecs;
use sim_core::telemetry::{EventTrace, SimMetrics};

/// Aggregated metrics from a single simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub total_reservations: usize,
    pub total_drivers: usize,
    pub completed_reservations: usize,
    /// Reservations that never got a driver.
    pub unserved_reservations: usize,
    pub free_rides: usize,
    pub free_ride_passengers: u32,
    pub total_passengers: u32,
    /// Share of passengers who paid for their ride.
    pub paid_fraction: f64,
    /// Wait = pickup time − reservation time, over picked-up reservations (seconds).
    pub avg_wait_secs: f64,
    pub median_wait_secs: f64,
    pub p90_wait_secs: f64,
    pub events_processed: u64,
    /// Simulation time of the last processed event.
    pub end_time_secs: f64,
}

impl SimulationResult {
    pub fn from_metrics(metrics: &SimMetrics, total_drivers: usize) -> Self {
        Self {
            total_reservations: metrics.reservations,
            total_drivers,
            completed_reservations: metrics.completed,
            unserved_reservations: metrics.unserved,
            free_rides: metrics.free_rides,
            free_ride_passengers: metrics.free_ride_passengers,
            total_passengers: metrics.total_passengers,
            paid_fraction: metrics.paid_fraction,
            avg_wait_secs: metrics.wait.avg,
            median_wait_secs: metrics.wait.median,
            p90_wait_secs: metrics.wait.p90,
            events_processed: 0,
            end_time_secs: 0.0,
        }
    }
}

/// Extract metrics from a completed simulation world.
///
/// Returns `None` if the world was not built by `build_scenario`.
pub fn extract_metrics(world: &World) -> Option<SimulationResult> {
    let store = world.get_resource::<EntityStore>()?;
    let threshold = world
        .get_resource::<FreeRideThresholdSecs>()
        .copied()
        .unwrap_or_default();
    let metrics = SimMetrics::from_store(store, threshold.0);

    let mut result = SimulationResult::from_metrics(&metrics, store.driver_count());
    result.events_processed = world
        .get_resource::<EventMetrics>()
        .map(|metrics| metrics.events_processed)
        .unwrap_or(0);
    result.end_time_secs = world
        .get_resource::<EventTrace>()
        .and_then(EventTrace::last_time)
        .unwrap_or(0.0);
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::runner::{run_until_empty, simulation_schedule};
    use sim_core::scenario::{create_world, ScenarioParams};

    #[test]
    fn extracts_from_finished_run() {
        let mut world =
            create_world(ScenarioParams::default().with_seed(21).with_reservations(30))
                .expect("world");
        let steps = run_until_empty(&mut world, &mut simulation_schedule(), 1_000_000);

        let result = extract_metrics(&world).expect("metrics");
        assert_eq!(result.total_reservations, 30);
        assert_eq!(result.total_drivers, 20);
        assert_eq!(result.events_processed, steps as u64);
        assert!(result.end_time_secs > 0.0);
        assert!(result.completed_reservations + result.unserved_reservations <= 30);
        assert!((0.0..=1.0).contains(&result.paid_fraction));
        assert!(result.median_wait_secs <= result.p90_wait_secs);
    }

    #[test]
    fn empty_world_has_no_metrics() {
        assert!(extract_metrics(&World::new()).is_none());
    }
}
