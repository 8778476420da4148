use bevy_ecs::prelude::{Res, ResMut};
use tracing::{trace, warn};

use crate::clock::{CurrentEvent, SimEvent, SimulationClock};
use crate::distributions::RandomModel;
use crate::entities::EntityStore;

/// Commit an assignment. The first committed request for a reservation wins;
/// later ones are no-ops.
///
/// A committed driver without a running movement chain starts one; a driver
/// already on the move keeps its single chain.
pub fn assignment_requested_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    mut store: ResMut<EntityStore>,
    mut rng: ResMut<RandomModel>,
) {
    let SimEvent::AssignmentRequested {
        driver: driver_id,
        reservation: reservation_id,
    } = event.0.payload
    else {
        return;
    };
    let now = clock.now();
    let Some((driver, reservation)) = store.pair_mut(driver_id, reservation_id) else {
        return;
    };

    if reservation.assigned {
        trace!(
            driver = %driver_id,
            reservation = %reservation_id,
            "duplicate assignment request"
        );
    } else if !driver.fits(reservation.party_size) {
        warn!(
            driver = %driver_id,
            reservation = %reservation_id,
            party_size = reservation.party_size,
            free_seats = driver.free_seats(),
            "party no longer fits, re-dispatching"
        );
        clock.schedule_at(
            now,
            SimEvent::ReservationCreated {
                reservation: reservation_id,
            },
        );
    } else {
        reservation.assigned = true;
        reservation.driver_id = Some(driver_id);
        driver.current_reservations.push(reservation_id);
        driver.seats_filled += reservation.party_size;
        driver.idle = false;

        if !driver.en_route {
            driver.en_route = true;
            let at = now + rng.jitter();
            clock.schedule_at(at, SimEvent::IntersectionArrival { driver: driver_id });
        }
    }
}
