//! Random model: every stochastic draw of a run goes through [`RandomModel`].
//!
//! The model owns the run's only RNG. Seeding it makes the whole run
//! (generation, dispatch jitter, movement) reproducible.

use bevy_ecs::prelude::Resource;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Exp, Normal};

use crate::error::ScenarioError;
use crate::spatial::GridPos;

/// Party sizes 1..=4.
const PARTY_SIZE_WEIGHTS: [f64; 4] = [0.60, 0.25, 0.10, 0.05];

/// Vehicle capacities 1..=6.
const CAPACITY_WEIGHTS: [f64; 6] = [0.05, 0.05, 0.40, 0.30, 0.15, 0.05];

/// Probability that a dropoff lands on an arterial street ("standard hours").
const ARTERIAL_DROPOFF_PROB: f64 = 0.75;

/// Arterial streets are every fourth street, excluding the boundary street 0.
const ARTERIAL_SPACING: usize = 4;

/// Probability that a party of the given size accepts sharing the vehicle.
pub fn carpool_probability(party_size: u32) -> f64 {
    match party_size {
        0 | 1 => 0.5,
        2 => 0.65,
        3 => 0.45,
        _ => 0.30,
    }
}

/// Distribution parameters for a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomModelConfig {
    pub grid_size: i32,
    pub mean_inter_arrival_secs: f64,
    pub travel_time_mean_secs: f64,
    pub travel_time_std_secs: f64,
    /// Lower clamp for travel-time samples; keeps event times moving forward.
    pub min_travel_time_secs: f64,
}

impl Default for RandomModelConfig {
    fn default() -> Self {
        Self {
            grid_size: crate::spatial::DEFAULT_GRID_SIZE,
            mean_inter_arrival_secs: 30.0,
            travel_time_mean_secs: 60.0,
            travel_time_std_secs: 20.0,
            min_travel_time_secs: 1.0,
        }
    }
}

#[derive(Resource)]
pub struct RandomModel {
    rng: StdRng,
    grid_size: i32,
    party_size: WeightedIndex<f64>,
    capacity: WeightedIndex<f64>,
    inter_arrival: Exp<f64>,
    travel_time: Normal<f64>,
    min_travel_time_secs: f64,
    arterial_streets: Vec<i32>,
    other_streets: Vec<i32>,
}

impl RandomModel {
    pub fn new(seed: Option<u64>, config: RandomModelConfig) -> Result<Self, ScenarioError> {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(rng, config)
    }

    pub fn with_rng(rng: StdRng, config: RandomModelConfig) -> Result<Self, ScenarioError> {
        if config.grid_size < 1 {
            return Err(ScenarioError::InvalidGridSize(config.grid_size));
        }
        let std = config.travel_time_std_secs;
        if !(std.is_finite() && std >= 0.0) {
            return Err(ScenarioError::InvalidDuration {
                name: "travel_time_std_secs",
                value: std,
            });
        }
        let party_size = WeightedIndex::new(PARTY_SIZE_WEIGHTS)
            .map_err(|e| ScenarioError::Distribution(e.to_string()))?;
        let capacity = WeightedIndex::new(CAPACITY_WEIGHTS)
            .map_err(|e| ScenarioError::Distribution(e.to_string()))?;
        let inter_arrival = Exp::new(1.0 / config.mean_inter_arrival_secs)
            .map_err(|e| ScenarioError::Distribution(format!("inter-arrival: {e}")))?;
        let travel_time = Normal::new(config.travel_time_mean_secs, std)
            .map_err(|e| ScenarioError::Distribution(format!("travel time: {e}")))?;

        let (arterial_streets, other_streets): (Vec<i32>, Vec<i32>) = (0..config.grid_size)
            .partition(|street| *street > 0 && *street as usize % ARTERIAL_SPACING == 0);

        Ok(Self {
            rng,
            grid_size: config.grid_size,
            party_size,
            capacity,
            inter_arrival,
            travel_time,
            min_travel_time_secs: config.min_travel_time_secs,
            arterial_streets,
            other_streets,
        })
    }

    pub fn grid_size(&self) -> i32 {
        self.grid_size
    }

    pub fn party_size(&mut self) -> u32 {
        self.party_size.sample(&mut self.rng) as u32 + 1
    }

    pub fn carpool(&mut self, party_size: u32) -> bool {
        self.rng.gen_bool(carpool_probability(party_size))
    }

    pub fn driver_capacity(&mut self) -> u32 {
        self.capacity.sample(&mut self.rng) as u32 + 1
    }

    /// Uniform intersection; used for pickups and driver start positions.
    pub fn uniform_position(&mut self) -> GridPos {
        let x = self.rng.gen_range(0..self.grid_size);
        let y = self.rng.gen_range(0..self.grid_size);
        GridPos::new(x, y)
    }

    /// Dropoff: uniform row, street drawn from the time-of-day dependent street set.
    pub fn dropoff_position(&mut self) -> GridPos {
        let x = self.rng.gen_range(0..self.grid_size);
        let standard_hours = self.rng.gen_bool(ARTERIAL_DROPOFF_PROB);
        let streets = if standard_hours {
            &self.arterial_streets
        } else {
            &self.other_streets
        };
        let y = if streets.is_empty() {
            self.rng.gen_range(0..self.grid_size)
        } else {
            streets[self.rng.gen_range(0..streets.len())]
        };
        GridPos::new(x, y)
    }

    pub fn inter_arrival_secs(&mut self) -> f64 {
        self.inter_arrival.sample(&mut self.rng)
    }

    /// One block of travel; normal samples are clamped to the configured floor.
    pub fn travel_time_secs(&mut self) -> f64 {
        self.travel_time
            .sample(&mut self.rng)
            .max(self.min_travel_time_secs)
    }

    /// Uniform offset in `[0, 1)` added to follow-up event times.
    pub fn jitter(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Fair coin; `true` means step along the x axis.
    pub fn choose_x_axis(&mut self) -> bool {
        self.rng.gen_bool(0.5)
    }
}
