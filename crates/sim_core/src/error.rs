use thiserror::Error;

/// Rejected scenario configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ScenarioError {
    #[error("grid size must be at least 1, got {0}")]
    InvalidGridSize(i32),
    #[error("{name} must be a finite, non-negative number of seconds, got {value}")]
    InvalidDuration { name: &'static str, value: f64 },
    #[error("{name} must be finite and strictly positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("carpool threshold {threshold} exceeds the grid size {grid_size}")]
    CarpoolThresholdTooLarge { threshold: u32, grid_size: i32 },
    #[error("invalid distribution parameters: {0}")]
    Distribution(String),
}
