//! Parallel simulation execution using rayon.
//!
//! Every run builds its own `World`, so runs share nothing and can be spread
//! over a thread pool freely.

use bevy_ecs::prelude::World;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use sim_core::clock::SimulationClock;
use sim_core::runner::{run_until_empty, simulation_schedule};
use sim_core::scenario::{create_world, ScenarioParams};
use tracing::{debug, info, warn};

use crate::error::ExperimentError;
use crate::metrics::{extract_metrics, SimulationResult};
use crate::parameters::ParameterSet;

/// Upper bound on processed events per run.
pub const DEFAULT_MAX_STEPS: usize = 2_000_000;

/// Build a world from `params` and run it until the event queue drains.
///
/// The returned world still holds every resource (trace, store, metrics), so
/// callers can export more than the summary row.
pub fn run_to_completion(
    params: ScenarioParams,
    experiment_id: &str,
    run_id: usize,
) -> Result<World, ExperimentError> {
    let mut world = create_world(params)?;
    let mut schedule = simulation_schedule();
    let steps = run_until_empty(&mut world, &mut schedule, DEFAULT_MAX_STEPS);

    let drained = world
        .get_resource::<SimulationClock>()
        .map(SimulationClock::is_empty)
        .unwrap_or(true);
    if !drained {
        warn!(experiment_id, run_id, steps, "run stopped at the step limit");
        return Err(ExperimentError::StepLimit {
            experiment_id: experiment_id.to_string(),
            run_id,
            max_steps: DEFAULT_MAX_STEPS,
        });
    }
    debug!(experiment_id, run_id, steps, "run finished");
    Ok(world)
}

/// Run a single simulation with the given parameter set and extract its metrics.
pub fn run_single_simulation(
    param_set: &ParameterSet,
) -> Result<SimulationResult, ExperimentError> {
    let world = run_to_completion(
        param_set.scenario_params(),
        &param_set.experiment_id,
        param_set.run_id,
    )?;
    extract_metrics(&world).ok_or(ExperimentError::MissingResource("EntityStore"))
}

/// Run multiple simulations in parallel.
///
/// Results come back in the same order as `parameter_sets`.
pub fn run_parallel_experiments(
    parameter_sets: &[ParameterSet],
    num_threads: Option<usize>,
) -> Result<Vec<SimulationResult>, ExperimentError> {
    run_parallel_experiments_with_progress(parameter_sets, num_threads, true)
}

/// Run multiple simulations in parallel with optional progress bar.
///
/// The first failing run aborts the batch.
pub fn run_parallel_experiments_with_progress(
    parameter_sets: &[ParameterSet],
    num_threads: Option<usize>,
    show_progress: bool,
) -> Result<Vec<SimulationResult>, ExperimentError> {
    let total = parameter_sets.len();
    info!(runs = total, threads = ?num_threads, "starting experiment batch");

    let pb = if show_progress && total > 0 {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Some(bar)
    } else {
        None
    };

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = num_threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder.build()?;

    let results = pool.install(|| {
        parameter_sets
            .par_iter()
            .map(|param_set| {
                let result = run_single_simulation(param_set);
                if let Some(progress_bar) = &pb {
                    progress_bar.inc(1);
                }
                result
            })
            .collect::<Result<Vec<_>, _>>()
    });

    if let Some(progress_bar) = &pb {
        progress_bar.finish_with_message("Completed");
    }
    let results = results?;
    info!(runs = results.len(), "experiment batch finished");
    Ok(results)
}
