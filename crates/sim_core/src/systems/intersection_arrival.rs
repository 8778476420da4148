use bevy_ecs::prelude::{Res, ResMut};
use tracing::{debug, trace};

use crate::clock::{CurrentEvent, SimEvent, SimulationClock};
use crate::distributions::RandomModel;
use crate::entities::EntityStore;
use crate::matching::MatchingPolicyResource;
use crate::movement::{advance, MovementOutcome};
use crate::scenario::CarpoolThreshold;

/// A driver reached an intersection: request at most one nearby carpool party,
/// then take one step toward the nearest booked reservation.
///
/// The requested party joins the driver's books when its assignment commits;
/// the running chain picks it up as a target from the next arrival on.
///
/// # Panics
///
/// Panics when a busy driver arrives with no reservations on its books; the
/// movement chain only runs while the driver has reservations.
pub fn intersection_arrival_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    mut store: ResMut<EntityStore>,
    mut rng: ResMut<RandomModel>,
    policy: Res<MatchingPolicyResource>,
    threshold: Res<CarpoolThreshold>,
) {
    let SimEvent::IntersectionArrival { driver: driver_id } = event.0.payload else {
        return;
    };
    let now = clock.now();
    let Some(driver) = store.driver(driver_id) else {
        return;
    };

    if let Some(candidate) =
        policy.carpool_candidate(driver, store.reservations(), threshold.0, now)
    {
        debug!(driver = %driver_id, reservation = %candidate, "carpool party nearby");
        let at = now + rng.jitter();
        clock.schedule_at(
            at,
            SimEvent::AssignmentRequested {
                driver: driver_id,
                reservation: candidate,
            },
        );
    }

    if driver.current_reservations.is_empty() {
        assert!(
            driver.idle,
            "driver {driver_id} is busy at {} with no reservations (t={now})",
            driver.current_location
        );
        trace!(driver = %driver_id, "idle driver arrival, chain ends");
        if let Some(driver) = store.driver_mut(driver_id) {
            driver.en_route = false;
        }
        return;
    }

    let Some(target) = policy.active_target(driver, &store) else {
        return;
    };
    let Some((driver, reservation)) = store.pair_mut(driver_id, target) else {
        return;
    };
    let (at, next) = match advance(driver, reservation, &mut rng) {
        MovementOutcome::ArrivedPickup => (
            now + rng.jitter(),
            SimEvent::PickUp {
                driver: driver_id,
                reservation: target,
            },
        ),
        MovementOutcome::ArrivedDropoff => (
            now + rng.jitter(),
            SimEvent::DropOff {
                driver: driver_id,
                reservation: target,
            },
        ),
        MovementOutcome::Moved {
            travel_time_secs, ..
        } => (
            now + travel_time_secs + rng.jitter(),
            SimEvent::IntersectionArrival { driver: driver_id },
        ),
    };
    clock.schedule_at(at, next);
}
