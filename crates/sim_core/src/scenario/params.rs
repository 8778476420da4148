use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::distributions::RandomModelConfig;
use crate::error::ScenarioError;
use crate::spatial::DEFAULT_GRID_SIZE;

/// Default simulated-time horizon for reservation generation: 2 hours.
const DEFAULT_TOTAL_SIMULATED_TIME_SECS: f64 = 2.0 * 60.0 * 60.0;

/// A pickup later than this after the request makes the ride free: 15 minutes.
const DEFAULT_FREE_RIDE_THRESHOLD_SECS: f64 = 15.0 * 60.0;

/// Max Chebyshev distance (blocks) between a busy driver and a waiting carpool party.
#[derive(Debug, Clone, Copy, Resource)]
pub struct CarpoolThreshold(pub u32);

impl Default for CarpoolThreshold {
    fn default() -> Self {
        Self(3)
    }
}

/// Wait (pickup − reservation time) beyond which a ride counts as free.
#[derive(Debug, Clone, Copy, Resource)]
pub struct FreeRideThresholdSecs(pub f64);

impl Default for FreeRideThresholdSecs {
    fn default() -> Self {
        Self(DEFAULT_FREE_RIDE_THRESHOLD_SECS)
    }
}

/// Parameters for building a simulation scenario.
///
/// Deserializes from partial JSON: missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioParams {
    /// Reservation generation stops once its clock passes this time (seconds).
    pub total_simulated_time_secs: f64,
    pub num_drivers: usize,
    /// Goal number of reservations; generation stops when it is reached.
    pub num_reservations: usize,
    pub carpool_threshold: u32,
    /// Random seed for reproducibility (optional; if None, uses entropy).
    pub seed: Option<u64>,
    /// Intersections per axis.
    pub grid_size: i32,
    pub mean_inter_arrival_secs: f64,
    pub travel_time_mean_secs: f64,
    pub travel_time_std_secs: f64,
    /// Floor applied to each travel-time sample.
    pub min_travel_time_secs: f64,
    pub free_ride_threshold_secs: f64,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            total_simulated_time_secs: DEFAULT_TOTAL_SIMULATED_TIME_SECS,
            num_drivers: 20,
            num_reservations: 100,
            carpool_threshold: 3,
            seed: None,
            grid_size: DEFAULT_GRID_SIZE,
            mean_inter_arrival_secs: 30.0,
            travel_time_mean_secs: 60.0,
            travel_time_std_secs: 20.0,
            min_travel_time_secs: 1.0,
            free_ride_threshold_secs: DEFAULT_FREE_RIDE_THRESHOLD_SECS,
        }
    }
}

impl ScenarioParams {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_drivers(mut self, num_drivers: usize) -> Self {
        self.num_drivers = num_drivers;
        self
    }

    pub fn with_reservations(mut self, num_reservations: usize) -> Self {
        self.num_reservations = num_reservations;
        self
    }

    pub fn with_total_simulated_time_secs(mut self, secs: f64) -> Self {
        self.total_simulated_time_secs = secs;
        self
    }

    pub fn with_carpool_threshold(mut self, threshold: u32) -> Self {
        self.carpool_threshold = threshold;
        self
    }

    pub fn with_mean_inter_arrival_secs(mut self, secs: f64) -> Self {
        self.mean_inter_arrival_secs = secs;
        self
    }

    pub fn random_model_config(&self) -> RandomModelConfig {
        RandomModelConfig {
            grid_size: self.grid_size,
            mean_inter_arrival_secs: self.mean_inter_arrival_secs,
            travel_time_mean_secs: self.travel_time_mean_secs,
            travel_time_std_secs: self.travel_time_std_secs,
            min_travel_time_secs: self.min_travel_time_secs,
        }
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.grid_size < 1 {
            return Err(ScenarioError::InvalidGridSize(self.grid_size));
        }
        for (name, value) in [
            ("total_simulated_time_secs", self.total_simulated_time_secs),
            ("travel_time_std_secs", self.travel_time_std_secs),
            ("free_ride_threshold_secs", self.free_ride_threshold_secs),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ScenarioError::InvalidDuration { name, value });
            }
        }
        for (name, value) in [
            ("mean_inter_arrival_secs", self.mean_inter_arrival_secs),
            ("min_travel_time_secs", self.min_travel_time_secs),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ScenarioError::NonPositive { name, value });
            }
        }
        if !self.travel_time_mean_secs.is_finite() {
            return Err(ScenarioError::InvalidDuration {
                name: "travel_time_mean_secs",
                value: self.travel_time_mean_secs,
            });
        }
        if self.carpool_threshold as i64 > i64::from(self.grid_size) {
            return Err(ScenarioError::CarpoolThresholdTooLarge {
                threshold: self.carpool_threshold,
                grid_size: self.grid_size,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let params = ScenarioParams::default();
        assert_eq!(params.total_simulated_time_secs, 7200.0);
        assert_eq!(params.num_reservations, 100);
        assert_eq!(params.carpool_threshold, 3);
        assert_eq!(params.validate(), Ok(()));
    }

    #[test]
    fn rejects_non_positive_inter_arrival_mean() {
        let params = ScenarioParams::default().with_mean_inter_arrival_secs(0.0);
        assert!(matches!(
            params.validate(),
            Err(ScenarioError::NonPositive {
                name: "mean_inter_arrival_secs",
                ..
            })
        ));
    }

    #[test]
    fn rejects_nan_horizon() {
        let params = ScenarioParams::default().with_total_simulated_time_secs(f64::NAN);
        assert!(matches!(
            params.validate(),
            Err(ScenarioError::InvalidDuration { .. })
        ));
    }

    #[test]
    fn rejects_oversized_carpool_threshold() {
        let params = ScenarioParams::default().with_carpool_threshold(21);
        assert_eq!(
            params.validate(),
            Err(ScenarioError::CarpoolThresholdTooLarge {
                threshold: 21,
                grid_size: 20
            })
        );
    }

    #[test]
    fn partial_json_fills_defaults() {
        let params: ScenarioParams =
            serde_json::from_str(r#"{"num_drivers": 7, "seed": 5}"#).expect("params");
        assert_eq!(params.num_drivers, 7);
        assert_eq!(params.seed, Some(5));
        assert_eq!(params.num_reservations, 100);
        assert_eq!(params.grid_size, 20);
    }
}
