#![allow(dead_code)]

use bevy_ecs::prelude::World;
use sim_core::clock::SimulationClock;
use sim_core::distributions::{RandomModel, RandomModelConfig};
use sim_core::entities::EntityStore;
use sim_core::matching::MatchingPolicyResource;
use sim_core::profiling::EventMetrics;
use sim_core::scenario::{CarpoolThreshold, FreeRideThresholdSecs};
use sim_core::telemetry::EventTrace;

/// Builder configuration for reproducible test worlds.
#[derive(Clone, Debug)]
pub struct TestWorldConfig {
    pub seed: u64,
    pub carpool_threshold: u32,
    pub free_ride_threshold_secs: f64,
    pub random: RandomModelConfig,
}

impl Default for TestWorldConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            carpool_threshold: 3,
            free_ride_threshold_secs: 900.0,
            random: RandomModelConfig::default(),
        }
    }
}

/// Helper that populates the ECS world with all shared resources used in integration tests.
///
/// Entities are added afterwards with the fixtures in `support::entities`.
#[derive(Debug, Default)]
pub struct TestWorldBuilder {
    config: TestWorldConfig,
}

impl TestWorldBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the seed of the run's random model.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn with_carpool_threshold(mut self, threshold: u32) -> Self {
        self.config.carpool_threshold = threshold;
        self
    }

    /// Fixed per-block travel time (zero spread) so event times are predictable.
    pub fn with_fixed_travel_time(mut self, secs: f64) -> Self {
        self.config.random.travel_time_mean_secs = secs;
        self.config.random.travel_time_std_secs = 0.0;
        self
    }

    /// Build the ECS world with the configured resources and an empty entity store.
    pub fn build(self) -> World {
        let TestWorldConfig {
            seed,
            carpool_threshold,
            free_ride_threshold_secs,
            random,
        } = self.config;

        let mut world = World::new();
        world.insert_resource(SimulationClock::default());
        world.insert_resource(EntityStore::new());
        world.insert_resource(RandomModel::new(Some(seed), random).expect("random model"));
        world.insert_resource(MatchingPolicyResource::default());
        world.insert_resource(CarpoolThreshold(carpool_threshold));
        world.insert_resource(FreeRideThresholdSecs(free_ride_threshold_secs));
        world.insert_resource(EventTrace::default());
        world.insert_resource(EventMetrics::default());
        world
    }
}
