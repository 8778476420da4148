use sim_core::error::ScenarioError;
use thiserror::Error;

/// Failure while running experiments.
#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error("invalid scenario: {0}")]
    Scenario(#[from] ScenarioError),
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("world is missing the {0} resource")]
    MissingResource(&'static str),
    #[error("run {experiment_id}/{run_id} hit the step limit of {max_steps}")]
    StepLimit {
        experiment_id: String,
        run_id: usize,
        max_steps: usize,
    },
}

/// Failure while writing results or traces.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no results to export")]
    Empty,
    #[error("results length ({results}) doesn't match parameter sets length ({parameter_sets})")]
    LengthMismatch {
        results: usize,
        parameter_sets: usize,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
