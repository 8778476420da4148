#![allow(dead_code)]

use std::collections::HashMap;

use bevy_ecs::prelude::World;
use bevy_ecs::schedule::Schedule;
use sim_core::clock::Event;
use sim_core::distributions::RandomModel;
use sim_core::entities::{DriverId, EntityStore, ReservationId};
use sim_core::runner::{
    run_next_event, run_until_empty, run_until_empty_with_hook, simulation_schedule,
};
use sim_core::spatial::GridBounds;
use sim_core::telemetry::EventTrace;

/// Upper bound for draining a test world; reaching it means the run did not converge.
pub const MAX_STEPS: usize = 1_000_000;

/// Helper that owns a reusable `Schedule` so tests can step or drain the event queue.
pub struct ScheduleRunner {
    schedule: Schedule,
}

impl Default for ScheduleRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleRunner {
    /// Create a runner with the default simulation schedule.
    pub fn new() -> Self {
        Self {
            schedule: simulation_schedule(),
        }
    }

    /// Run a single event (returns `true` if an event was processed).
    pub fn run_one(&mut self, world: &mut World) -> bool {
        run_next_event(world, &mut self.schedule)
    }

    /// Run multiple events up to `max_steps`, returning the number of steps executed.
    pub fn run_until_empty(&mut self, world: &mut World, max_steps: usize) -> usize {
        run_until_empty(world, &mut self.schedule, max_steps)
    }

    /// Drive the simulation until the event queue is empty.
    pub fn run_full(&mut self, world: &mut World) -> usize {
        let steps = self.run_until_empty(world, MAX_STEPS);
        assert!(steps < MAX_STEPS, "runner did not converge");
        steps
    }

    /// Drive the simulation until empty, checking [`InvariantChecker`] after every event.
    pub fn run_full_checked(&mut self, world: &mut World) -> usize {
        let mut checker = InvariantChecker::default();
        let steps = run_until_empty_with_hook(world, &mut self.schedule, MAX_STEPS, |world, event| {
            checker.check(world, event)
        });
        assert!(steps < MAX_STEPS, "runner did not converge");
        steps
    }
}

/// Entity and ordering invariants that must hold after every processed event.
#[derive(Debug, Default)]
pub struct InvariantChecker {
    last_time: Option<f64>,
    committed: HashMap<ReservationId, DriverId>,
}

impl InvariantChecker {
    pub fn check(&mut self, world: &World, event: &Event) {
        if let Some(last) = self.last_time {
            assert!(
                event.timestamp >= last,
                "time went backwards: {} after {last}",
                event.timestamp
            );
        }
        self.last_time = Some(event.timestamp);

        let trace = world.resource::<EventTrace>();
        assert_eq!(trace.records.last().map(|record| record.time), Some(event.timestamp));

        let bounds = GridBounds::new(world.resource::<RandomModel>().grid_size());
        let store = world.resource::<EntityStore>();
        for driver in store.drivers() {
            assert!(
                bounds.contains(driver.current_location),
                "{} left the grid at {}",
                driver.id,
                driver.current_location
            );
            assert_eq!(
                store.booked_seats(driver),
                driver.seats_filled,
                "{} seats out of sync at t={}",
                driver.id,
                event.timestamp
            );
            assert!(driver.seats_filled <= driver.capacity, "{} over capacity", driver.id);
            let mut ids = driver.current_reservations.clone();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), driver.current_reservations.len(), "duplicate booking");
        }

        for reservation in store.reservations() {
            if let Some(driver) = self.committed.get(&reservation.id) {
                assert!(reservation.assigned, "{} was unassigned", reservation.id);
                assert_eq!(reservation.driver_id, Some(*driver), "{} reassigned", reservation.id);
            } else if reservation.assigned {
                let driver = reservation.driver_id.expect("assigned reservation has a driver");
                self.committed.insert(reservation.id, driver);
            }
            if let Some(pickup) = reservation.pickup_time {
                assert!(pickup >= reservation.reserve_time, "{} picked up early", reservation.id);
            }
            if let (Some(pickup), Some(dropoff)) = (reservation.pickup_time, reservation.dropoff_time) {
                assert!(dropoff >= pickup, "{} dropped before pickup", reservation.id);
            }
            if reservation.dropoff_time.is_some() {
                assert!(reservation.pickup_time.is_some());
            }
            assert!(
                bounds.contains(reservation.current_location),
                "{} left the grid",
                reservation.id
            );
        }
    }
}
