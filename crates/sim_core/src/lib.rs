pub mod clock;
pub mod distributions;
pub mod entities;
pub mod error;
pub mod matching;
pub mod movement;
pub mod profiling;
pub mod runner;
pub mod scenario;
pub mod spatial;
pub mod systems;
pub mod telemetry;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
