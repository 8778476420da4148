use bevy_ecs::prelude::{Res, ResMut};
use tracing::{debug, trace};

use crate::clock::{CurrentEvent, SimEvent, SimulationClock};
use crate::distributions::RandomModel;
use crate::entities::EntityStore;
use crate::matching::MatchingPolicyResource;

/// Dispatch a new (or retried) reservation to the nearest driver with room for the party.
pub fn reservation_created_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    store: Res<EntityStore>,
    policy: Res<MatchingPolicyResource>,
    mut rng: ResMut<RandomModel>,
) {
    let SimEvent::ReservationCreated { reservation } = event.0.payload else {
        return;
    };
    let Some(res) = store.reservation(reservation) else {
        return;
    };
    if res.assigned {
        trace!(%reservation, "reservation already assigned");
        return;
    }

    let Some(driver) = policy.find_driver(res, store.drivers()) else {
        debug!(%reservation, party_size = res.party_size, "no driver can seat the party");
        return;
    };

    let at = clock.now() + rng.jitter();
    clock.schedule_at(
        at,
        SimEvent::AssignmentRequested {
            driver,
            reservation,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::prelude::Schedule;

    use crate::clock::EventKind;
    use crate::entities::DriverId;
    use crate::spatial::GridPos;
    use crate::test_helpers::{
        add_driver, add_reservation, create_test_world, drain_queue, make_current,
    };

    fn run(world: &mut bevy_ecs::prelude::World) {
        let mut schedule = Schedule::default();
        schedule.add_systems(reservation_created_system);
        schedule.run(world);
    }

    #[test]
    fn requests_assignment_from_nearest_fitting_driver() {
        let mut world = create_test_world();
        add_driver(&mut world, GridPos::new(10, 10), 1);
        let roomy = add_driver(&mut world, GridPos::new(0, 0), 4);
        let reservation = add_reservation(
            &mut world,
            2,
            5.0,
            GridPos::new(10, 10),
            GridPos::new(10, 16),
            false,
        );
        make_current(&mut world, 5.0, SimEvent::ReservationCreated { reservation });

        run(&mut world);

        let queued = drain_queue(&mut world);
        assert_eq!(queued.len(), 1);
        assert_eq!(
            queued[0].payload,
            SimEvent::AssignmentRequested {
                driver: roomy,
                reservation
            }
        );
        assert!((5.0..6.0).contains(&queued[0].timestamp));
    }

    #[test]
    fn no_driver_means_no_follow_up() {
        let mut world = create_test_world();
        let reservation = add_reservation(
            &mut world,
            1,
            0.0,
            GridPos::new(3, 3),
            GridPos::new(4, 8),
            true,
        );
        make_current(&mut world, 0.0, SimEvent::ReservationCreated { reservation });

        run(&mut world);

        assert!(world.resource::<SimulationClock>().is_empty());
    }

    #[test]
    fn assigned_reservation_is_ignored() {
        let mut world = create_test_world();
        add_driver(&mut world, GridPos::new(0, 0), 4);
        let reservation = add_reservation(
            &mut world,
            1,
            0.0,
            GridPos::new(3, 3),
            GridPos::new(4, 8),
            true,
        );
        {
            let mut store = world.resource_mut::<EntityStore>();
            let res = store.reservation_mut(reservation).expect("reservation");
            res.assigned = true;
            res.driver_id = Some(DriverId(0));
        }
        make_current(&mut world, 1.0, SimEvent::ReservationCreated { reservation });

        run(&mut world);

        assert!(drain_queue(&mut world)
            .iter()
            .all(|event| event.kind() != EventKind::AssignmentRequested));
    }
}
