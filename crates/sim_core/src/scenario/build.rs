use bevy_ecs::prelude::World;
use tracing::info;

use crate::clock::{SimEvent, SimulationClock};
use crate::distributions::RandomModel;
use crate::entities::{EntityStore, NewReservation};
use crate::error::ScenarioError;
use crate::matching::MatchingPolicyResource;
use crate::profiling::EventMetrics;
use crate::scenario::params::{CarpoolThreshold, FreeRideThresholdSecs, ScenarioParams};
use crate::telemetry::EventTrace;

/// Generate reservations until the goal count is reached or the generation clock
/// passes `horizon_secs`. Returns the number of reservations created.
///
/// The goal is checked before each draw; a gap that carries the clock past the
/// horizon ends generation without creating a reservation.
pub fn generate_reservations(
    rng: &mut RandomModel,
    store: &mut EntityStore,
    horizon_secs: f64,
    goal: usize,
) -> usize {
    let mut generated = 0;
    let mut time = 0.0;
    while generated < goal {
        time += rng.inter_arrival_secs();
        if time > horizon_secs {
            break;
        }
        let party_size = rng.party_size();
        let carpool = rng.carpool(party_size);
        let pickup = rng.uniform_position();
        let dropoff = rng.dropoff_position();
        store.add_reservation(NewReservation {
            party_size,
            reserve_time: time,
            pickup,
            dropoff,
            carpool,
        });
        generated += 1;
    }
    generated
}

/// Place `count` drivers at uniform positions with sampled capacities.
pub fn generate_drivers(rng: &mut RandomModel, store: &mut EntityStore, count: usize) {
    for _ in 0..count {
        let location = rng.uniform_position();
        let capacity = rng.driver_capacity();
        store.add_driver(location, capacity);
    }
}

/// Populate `world` with every resource a run needs and schedule one
/// `ReservationCreated` event per generated reservation.
pub fn build_scenario(world: &mut World, params: ScenarioParams) -> Result<(), ScenarioError> {
    params.validate()?;

    let mut rng = RandomModel::new(params.seed, params.random_model_config())?;
    let mut store = EntityStore::new();
    let generated = generate_reservations(
        &mut rng,
        &mut store,
        params.total_simulated_time_secs,
        params.num_reservations,
    );
    generate_drivers(&mut rng, &mut store, params.num_drivers);

    let mut clock = SimulationClock::default();
    for reservation in store.reservations() {
        clock.schedule_at(
            reservation.reserve_time,
            SimEvent::ReservationCreated {
                reservation: reservation.id,
            },
        );
    }

    info!(
        reservations = generated,
        goal = params.num_reservations,
        drivers = params.num_drivers,
        seed = ?params.seed,
        "scenario built"
    );

    world.insert_resource(clock);
    world.insert_resource(store);
    world.insert_resource(rng);
    world.insert_resource(MatchingPolicyResource::default());
    world.insert_resource(CarpoolThreshold(params.carpool_threshold));
    world.insert_resource(FreeRideThresholdSecs(params.free_ride_threshold_secs));
    world.insert_resource(EventTrace::default());
    world.insert_resource(EventMetrics::default());
    Ok(())
}

/// Fresh world with the scenario built in.
pub fn create_world(params: ScenarioParams) -> Result<World, ScenarioError> {
    let mut world = World::new();
    build_scenario(&mut world, params)?;
    Ok(world)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::RandomModelConfig;

    fn rng(seed: u64) -> RandomModel {
        RandomModel::new(Some(seed), RandomModelConfig::default()).expect("model")
    }

    #[test]
    fn generation_stops_at_goal() {
        let mut rng = rng(1);
        let mut store = EntityStore::new();
        let generated = generate_reservations(&mut rng, &mut store, 1.0e9, 25);
        assert_eq!(generated, 25);
        assert_eq!(store.reservation_count(), 25);
    }

    #[test]
    fn generation_stops_at_horizon() {
        let mut rng = rng(2);
        let mut store = EntityStore::new();
        let generated = generate_reservations(&mut rng, &mut store, 600.0, usize::MAX);
        assert!(generated > 0);
        assert!(store
            .reservations()
            .iter()
            .all(|reservation| reservation.reserve_time <= 600.0));
    }

    #[test]
    fn reservation_times_increase_with_id() {
        let mut rng = rng(3);
        let mut store = EntityStore::new();
        generate_reservations(&mut rng, &mut store, 7200.0, 100);
        let times: Vec<f64> = store.reservations().iter().map(|r| r.reserve_time).collect();
        assert!(times.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn zero_goal_generates_nothing() {
        let mut rng = rng(4);
        let mut store = EntityStore::new();
        assert_eq!(generate_reservations(&mut rng, &mut store, 7200.0, 0), 0);
    }

    #[test]
    fn build_schedules_one_creation_event_per_reservation() {
        let world = create_world(
            ScenarioParams::default()
                .with_seed(9)
                .with_reservations(30)
                .with_drivers(4),
        )
        .expect("world");
        let store = world.resource::<EntityStore>();
        let clock = world.resource::<SimulationClock>();
        assert_eq!(store.driver_count(), 4);
        assert_eq!(clock.len(), store.reservation_count());
        assert!(store.reservation_count() <= 30);
        assert!(store
            .drivers()
            .iter()
            .all(|driver| (1..=6).contains(&driver.capacity) && driver.idle));
    }

    #[test]
    fn invalid_params_are_rejected_before_building() {
        let mut world = World::new();
        let result = build_scenario(&mut world, ScenarioParams::default().with_mean_inter_arrival_secs(-1.0));
        assert!(result.is_err());
        assert!(world.get_resource::<EntityStore>().is_none());
    }
}
