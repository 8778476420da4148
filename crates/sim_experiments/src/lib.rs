//! Replications, parameter sweeps and exports for the ride-sharing grid simulation.
//!
//! Every run builds its own world from a [`ParameterSet`], so runs are spread
//! over a rayon thread pool without shared state.
//!
//! # Quick Start
//!
//! ```no_run
//! use sim_experiments::{export_to_csv, run_parallel_experiments, ParameterSpace};
//!
//! let sets = ParameterSpace::grid()
//!     .num_drivers(vec![10, 20, 40])
//!     .carpool_threshold(vec![0, 3])
//!     .replications(5)
//!     .generate();
//!
//! let results = run_parallel_experiments(&sets, None)?;
//! export_to_csv(&results, &sets, "sweep.csv")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Modules
//!
//! - [`parameters`]: parameter grid and per-run seeds
//! - [`runner`]: single and parallel runs
//! - [`metrics`]: per-run result row
//! - [`replication`]: paid-fraction summary with a Student-t interval
//! - [`export`]: CSV/JSON writers for results, traces and reservations

pub mod error;
pub mod export;
pub mod metrics;
pub mod parameters;
pub mod replication;
pub mod runner;

pub use error::{ExperimentError, ExportError};
pub use export::{
    export_event_log, export_reservations_csv, export_summary_json, export_to_csv,
    export_to_json, export_trace_csv, export_trace_json,
};
pub use metrics::{extract_metrics, SimulationResult};
pub use parameters::{run_seed, ParameterSet, ParameterSpace};
pub use replication::{run_replications, ReplicationReport, ReplicationSummary};
pub use runner::{run_parallel_experiments, run_single_simulation, run_to_completion};
