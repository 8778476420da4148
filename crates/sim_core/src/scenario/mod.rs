//! Scenario setup: generate reservations and drivers, seed the future event list.
//!
//! Reservations are generated up front from an exponential inter-arrival process;
//! each one is scheduled as a `ReservationCreated` event at its reservation time.

mod build;
mod params;

pub use build::{build_scenario, create_world, generate_drivers, generate_reservations};
pub use params::{CarpoolThreshold, FreeRideThresholdSecs, ScenarioParams};
