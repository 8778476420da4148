use bevy_ecs::prelude::{Res, ResMut};
use tracing::trace;

use crate::clock::{CurrentEvent, SimEvent, SimulationClock};
use crate::entities::EntityStore;

/// Mark the driver idle and retry the oldest request still waiting for a driver.
pub fn idle_arrival_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    mut store: ResMut<EntityStore>,
) {
    let SimEvent::IdleArrival { driver: driver_id } = event.0.payload else {
        return;
    };
    let now = clock.now();
    let Some(driver) = store.driver_mut(driver_id) else {
        return;
    };
    // An assignment may have landed between the drop-off and this event.
    if driver.current_reservations.is_empty() {
        driver.idle = true;
    }

    if let Some(waiting) = store.first_waiting(now) {
        trace!(driver = %driver_id, reservation = %waiting, "retrying waiting reservation");
        clock.schedule_at(
            now,
            SimEvent::ReservationCreated {
                reservation: waiting,
            },
        );
    }
}
