//! Parameter variation framework for exploring simulation parameter space.
//!
//! A [`ParameterSpace`] is a grid over driver count, reservation goal and
//! carpool threshold; every grid point is run `replications` times with
//! distinct, reproducible seeds.

use serde::Serialize;
use sim_core::scenario::ScenarioParams;

/// Multiplier spreading consecutive run indices across the seed space.
const SEED_STRIDE: u64 = 0x9e37_79b9;

/// A single parameter configuration for a simulation run.
///
/// Wraps `ScenarioParams` with additional experiment metadata for tracking
/// and reproducibility.
#[derive(Debug, Clone, Serialize)]
pub struct ParameterSet {
    pub params: ScenarioParams,
    /// Identifies the grid point; shared by all of its replications.
    pub experiment_id: String,
    /// Replication index within the experiment.
    pub run_id: usize,
    pub seed: u64,
}

impl ParameterSet {
    pub fn new(params: ScenarioParams, experiment_id: String, run_id: usize, seed: u64) -> Self {
        Self {
            params,
            experiment_id,
            run_id,
            seed,
        }
    }

    /// Get the scenario params with seed applied.
    pub fn scenario_params(&self) -> ScenarioParams {
        let mut params = self.params.clone();
        params.seed = Some(self.seed);
        params
    }
}

/// Seed of the `index`-th run, offset by the base seed when one is set.
pub fn run_seed(base_seed: Option<u64>, index: usize) -> u64 {
    (index as u64)
        .wrapping_mul(SEED_STRIDE)
        .wrapping_add(base_seed.unwrap_or(0))
}

/// Defines a parameter grid for exploration.
///
/// Dimensions left empty take their value from the base parameters.
#[derive(Debug, Clone)]
pub struct ParameterSpace {
    base: ScenarioParams,
    num_drivers: Vec<usize>,
    num_reservations: Vec<usize>,
    carpool_thresholds: Vec<u32>,
    replications: usize,
}

impl Default for ParameterSpace {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterSpace {
    pub fn new() -> Self {
        Self {
            base: ScenarioParams::default(),
            num_drivers: vec![],
            num_reservations: vec![],
            carpool_thresholds: vec![],
            replications: 1,
        }
    }

    /// Create a new parameter space for grid search.
    pub fn grid() -> Self {
        Self::new()
    }

    pub fn num_drivers(mut self, counts: Vec<usize>) -> Self {
        self.num_drivers = counts;
        self
    }

    pub fn num_reservations(mut self, counts: Vec<usize>) -> Self {
        self.num_reservations = counts;
        self
    }

    pub fn carpool_threshold(mut self, thresholds: Vec<u32>) -> Self {
        self.carpool_thresholds = thresholds;
        self
    }

    /// Runs per grid point (at least one).
    pub fn replications(mut self, replications: usize) -> Self {
        self.replications = replications.max(1);
        self
    }

    /// Set base parameters (used as defaults).
    pub fn with_base(mut self, base: ScenarioParams) -> Self {
        self.base = base;
        self
    }

    pub fn base(&self) -> &ScenarioParams {
        &self.base
    }

    /// Number of grid points (not counting replications).
    pub fn combinations(&self) -> usize {
        Self::or_base(&self.num_drivers, self.base.num_drivers).len()
            * Self::or_base(&self.num_reservations, self.base.num_reservations).len()
            * Self::or_base(&self.carpool_thresholds, self.base.carpool_threshold).len()
    }

    fn or_base<T: Copy>(values: &[T], base: T) -> Vec<T> {
        if values.is_empty() {
            vec![base]
        } else {
            values.to_vec()
        }
    }

    /// Generate every grid point × replication, in grid order with replications innermost.
    pub fn generate(&self) -> Vec<ParameterSet> {
        let drivers = Self::or_base(&self.num_drivers, self.base.num_drivers);
        let reservations = Self::or_base(&self.num_reservations, self.base.num_reservations);
        let thresholds = Self::or_base(&self.carpool_thresholds, self.base.carpool_threshold);

        let (reservations, thresholds) = (&reservations, &thresholds);
        let combos = drivers.iter().flat_map(move |&num_drivers| {
            reservations.iter().flat_map(move |&num_reservations| {
                thresholds
                    .iter()
                    .map(move |&threshold| (num_drivers, num_reservations, threshold))
            })
        });

        let mut sets = Vec::with_capacity(self.combinations() * self.replications);
        for (experiment_id, (num_drivers, num_reservations, threshold)) in combos.enumerate() {
            let mut params = self.base.clone();
            params.num_drivers = num_drivers;
            params.num_reservations = num_reservations;
            params.carpool_threshold = threshold;
            for run_id in 0..self.replications {
                let seed = run_seed(self.base.seed, sets.len());
                sets.push(ParameterSet::new(
                    params.clone(),
                    format!("exp_{experiment_id}"),
                    run_id,
                    seed,
                ));
            }
        }
        sets
    }
}
