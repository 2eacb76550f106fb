//! Error types for scheduling and profile loading.

use std::time::Duration;

use thiserror::Error;

/// Scheduling contract violations, caught when a delay range is built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error("delay range is inverted: min {min:?} > max {max:?}")]
    InvertedRange { min: Duration, max: Duration },

    #[error("{secs} seconds is not a valid delay")]
    InvalidDuration { secs: f64 },
}

/// Errors while loading an encounter profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("failed to parse encounter profile")]
    Parse(#[source] serde_json::Error),

    #[error("{field} must be a probability in [0, 1], got {value}")]
    Probability { field: &'static str, value: f64 },

    #[error("{field} must be a positive radius, got {value}")]
    Radius { field: &'static str, value: f32 },
}
