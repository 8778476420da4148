use std::io::Write;

use sim_core::entities::EntityStore;
use sim_core::telemetry::EventTrace;

use super::writer_utils::or_unset;
use crate::error::ExportError;
use crate::metrics::SimulationResult;
use crate::parameters::ParameterSet;

pub(crate) fn export_to_csv_impl<W: Write>(
    results: &[SimulationResult],
    parameter_sets: &[ParameterSet],
    writer: W,
) -> Result<(), ExportError> {
    if results.len() != parameter_sets.len() {
        return Err(ExportError::LengthMismatch {
            results: results.len(),
            parameter_sets: parameter_sets.len(),
        });
    }

    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record([
        "experiment_id",
        "run_id",
        "seed",
        "num_drivers",
        "num_reservations",
        "carpool_threshold",
        "grid_size",
        "total_simulated_time_secs",
        "total_reservations",
        "total_drivers",
        "completed_reservations",
        "unserved_reservations",
        "free_rides",
        "free_ride_passengers",
        "total_passengers",
        "paid_fraction",
        "avg_wait_secs",
        "median_wait_secs",
        "p90_wait_secs",
        "events_processed",
        "end_time_secs",
    ])?;

    for (result, param_set) in results.iter().zip(parameter_sets) {
        let params = &param_set.params;
        wtr.write_record([
            param_set.experiment_id.clone(),
            param_set.run_id.to_string(),
            param_set.seed.to_string(),
            params.num_drivers.to_string(),
            params.num_reservations.to_string(),
            params.carpool_threshold.to_string(),
            params.grid_size.to_string(),
            params.total_simulated_time_secs.to_string(),
            result.total_reservations.to_string(),
            result.total_drivers.to_string(),
            result.completed_reservations.to_string(),
            result.unserved_reservations.to_string(),
            result.free_rides.to_string(),
            result.free_ride_passengers.to_string(),
            result.total_passengers.to_string(),
            result.paid_fraction.to_string(),
            result.avg_wait_secs.to_string(),
            result.median_wait_secs.to_string(),
            result.p90_wait_secs.to_string(),
            result.events_processed.to_string(),
            result.end_time_secs.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub(crate) fn export_trace_csv_impl<W: Write>(
    trace: &EventTrace,
    writer: W,
) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["step", "time", "event", "driver", "reservation", "x", "y"])?;

    for record in &trace.records {
        let event = &record.event;
        let location = record.driver_location;
        wtr.write_record([
            record.step.to_string(),
            record.time.to_string(),
            event.kind().as_str().to_string(),
            or_unset(event.driver().map(|id| id.0)),
            or_unset(event.reservation().map(|id| id.0)),
            or_unset(location.map(|pos| pos.x)),
            or_unset(location.map(|pos| pos.y)),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub(crate) fn export_reservations_csv_impl<W: Write>(
    store: &EntityStore,
    writer: W,
) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([
        "reservation",
        "party_size",
        "carpool",
        "reserve_time",
        "pickup_x",
        "pickup_y",
        "dropoff_x",
        "dropoff_y",
        "driver",
        "pickup_time",
        "dropoff_time",
        "wait_secs",
    ])?;

    for reservation in store.reservations() {
        wtr.write_record([
            reservation.id.0.to_string(),
            reservation.party_size.to_string(),
            reservation.carpool.to_string(),
            reservation.reserve_time.to_string(),
            reservation.pickup_coords.x.to_string(),
            reservation.pickup_coords.y.to_string(),
            reservation.dropoff_coords.x.to_string(),
            reservation.dropoff_coords.y.to_string(),
            or_unset(reservation.driver_id.map(|id| id.0)),
            or_unset(reservation.pickup_time),
            or_unset(reservation.dropoff_time),
            or_unset(reservation.wait_time()),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
