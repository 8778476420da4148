use bevy_ecs::prelude::{Res, ResMut};
use tracing::debug;

use crate::clock::{CurrentEvent, SimEvent, SimulationClock};
use crate::distributions::RandomModel;
use crate::entities::EntityStore;

pub fn pick_up_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    mut store: ResMut<EntityStore>,
    mut rng: ResMut<RandomModel>,
) {
    let SimEvent::PickUp {
        driver,
        reservation: reservation_id,
    } = event.0.payload
    else {
        return;
    };
    let now = clock.now();
    let Some(reservation) = store.reservation_mut(reservation_id) else {
        return;
    };
    debug_assert!(!reservation.picked_up, "{reservation_id} picked up twice");
    reservation.picked_up = true;
    reservation.pickup_time = Some(now);
    debug!(
        %driver,
        reservation = %reservation_id,
        wait_secs = now - reservation.reserve_time,
        "picked up"
    );

    let at = now + rng.jitter();
    clock.schedule_at(at, SimEvent::IntersectionArrival { driver });
}
