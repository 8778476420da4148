//! Test helpers for common test setup and utilities.
//!
//! This module provides shared test utilities to reduce duplication across test files.

use bevy_ecs::prelude::World;

use crate::clock::{CurrentEvent, Event, SimEvent, SimulationClock};
use crate::distributions::{RandomModel, RandomModelConfig};
use crate::entities::{DriverId, EntityStore, NewReservation, ReservationId};
use crate::matching::MatchingPolicyResource;
use crate::profiling::EventMetrics;
use crate::scenario::{CarpoolThreshold, FreeRideThresholdSecs};
use crate::spatial::GridPos;
use crate::telemetry::EventTrace;

/// Seed used by [`create_test_world`].
pub const TEST_SEED: u64 = 1;

/// Create a world with every resource the handlers need and no entities.
///
/// For generated scenarios, use [`crate::scenario::build_scenario`] instead.
///
/// # Panics
///
/// Panics if the default random model cannot be built (should never happen).
pub fn create_test_world() -> World {
    let mut world = World::new();
    world.insert_resource(SimulationClock::default());
    world.insert_resource(EntityStore::new());
    world.insert_resource(
        RandomModel::new(Some(TEST_SEED), RandomModelConfig::default())
            .expect("default random model"),
    );
    world.insert_resource(MatchingPolicyResource::default());
    world.insert_resource(CarpoolThreshold::default());
    world.insert_resource(FreeRideThresholdSecs::default());
    world.insert_resource(EventTrace::default());
    world.insert_resource(EventMetrics::default());
    world
}

pub fn add_driver(world: &mut World, location: GridPos, capacity: u32) -> DriverId {
    world
        .resource_mut::<EntityStore>()
        .add_driver(location, capacity)
}

pub fn add_reservation(
    world: &mut World,
    party_size: u32,
    reserve_time: f64,
    pickup: GridPos,
    dropoff: GridPos,
    carpool: bool,
) -> ReservationId {
    world
        .resource_mut::<EntityStore>()
        .add_reservation(NewReservation {
            party_size,
            reserve_time,
            pickup,
            dropoff,
            carpool,
        })
}

/// Push `payload` at `timestamp`, pop it to advance the clock, and make it the
/// current event, as the runner would. Anything already queued earlier pops first,
/// so call this on an empty clock.
///
/// # Panics
///
/// Panics if the clock is empty after scheduling (should never happen).
pub fn make_current(world: &mut World, timestamp: f64, payload: SimEvent) -> Event {
    let mut clock = world.resource_mut::<SimulationClock>();
    clock.schedule_at(timestamp, payload);
    let event = clock.pop_next().expect("scheduled event");
    world.insert_resource(CurrentEvent(event));
    event
}

/// Drain every queued event payload in pop order.
pub fn drain_queue(world: &mut World) -> Vec<Event> {
    let mut clock = world.resource_mut::<SimulationClock>();
    std::iter::from_fn(|| clock.pop_next()).collect()
}
