use bevy_ecs::prelude::{Res, ResMut};
use tracing::debug;

use crate::clock::{CurrentEvent, SimEvent, SimulationClock};
use crate::distributions::RandomModel;
use crate::entities::EntityStore;

/// Complete a reservation and free its seats. The chain continues while the
/// driver has reservations left; otherwise the driver heads for idle.
pub fn drop_off_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    mut store: ResMut<EntityStore>,
    mut rng: ResMut<RandomModel>,
) {
    let SimEvent::DropOff {
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

    reservation.dropoff_time = Some(now);
    driver.serviced_passengers.push(reservation_id);
    debug_assert!(driver.seats_filled >= reservation.party_size);
    driver.seats_filled = driver.seats_filled.saturating_sub(reservation.party_size);
    driver.current_reservations.retain(|id| *id != reservation_id);
    debug!(
        driver = %driver_id,
        reservation = %reservation_id,
        remaining = driver.current_reservations.len(),
        "dropped off"
    );

    let at = now + rng.jitter();
    if driver.current_reservations.is_empty() {
        driver.en_route = false;
        clock.schedule_at(at, SimEvent::IdleArrival { driver: driver_id });
    } else {
        clock.schedule_at(at, SimEvent::IntersectionArrival { driver: driver_id });
    }
}
