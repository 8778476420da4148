//! Result and trace export.
//!
//! Sweep and replication rows go to CSV/JSON; a single run's event trace and
//! reservation table go to CSV, JSON or a plain line-per-event log.

use std::io::Write;
use std::path::Path;

use sim_core::entities::EntityStore;
use sim_core::telemetry::EventTrace;

use crate::error::ExportError;
use crate::metrics::SimulationResult;
use crate::parameters::ParameterSet;
use crate::replication::ReplicationSummary;

#[path = "export/csv.rs"]
mod csv;
#[path = "export/json.rs"]
mod json;
#[path = "export/writer_utils.rs"]
mod writer_utils;

/// Export simulation results to JSON format (an array of result objects).
pub fn export_to_json(
    results: &[SimulationResult],
    path: impl AsRef<Path>,
) -> Result<(), ExportError> {
    let file = writer_utils::create_output_file(path)?;
    json::export_to_json_impl(results, file)
}

/// Export simulation results with parameters to CSV format.
///
/// Parameters and results are paired by index (results[i] corresponds to parameter_sets[i]).
///
/// # Errors
///
/// Fails on empty input, mismatched lengths, or any IO/CSV error.
pub fn export_to_csv(
    results: &[SimulationResult],
    parameter_sets: &[ParameterSet],
    path: impl AsRef<Path>,
) -> Result<(), ExportError> {
    writer_utils::ensure_not_empty(results)?;
    let file = writer_utils::create_output_file(path)?;
    csv::export_to_csv_impl(results, parameter_sets, file)
}

pub fn export_summary_json(
    summary: &ReplicationSummary,
    path: impl AsRef<Path>,
) -> Result<(), ExportError> {
    let file = writer_utils::create_output_file(path)?;
    json::export_to_json_impl(summary, file)
}

/// One row per processed event; ids and locations that don't apply are `-1`.
pub fn export_trace_csv(trace: &EventTrace, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let file = writer_utils::create_output_file(path)?;
    csv::export_trace_csv_impl(trace, file)
}

pub fn export_trace_json(trace: &EventTrace, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let file = writer_utils::create_output_file(path)?;
    json::export_to_json_impl(&trace.records, file)
}

/// Human-readable event log, one `describe()` line per event.
pub fn export_event_log(trace: &EventTrace, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let mut file = writer_utils::create_output_file(path)?;
    file.write_all(trace.to_log_lines().as_bytes())?;
    Ok(())
}

/// Final state of every reservation; unset times are `-1`.
pub fn export_reservations_csv(
    store: &EntityStore,
    path: impl AsRef<Path>,
) -> Result<(), ExportError> {
    let file = writer_utils::create_output_file(path)?;
    csv::export_reservations_csv_impl(store, file)
}
