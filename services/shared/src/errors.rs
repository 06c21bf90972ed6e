/// Error types shared by the booster value model and the engine
///
/// Design Philosophy:
/// - Construction-time validation errors are plain `thiserror` enums
/// - Activation failures are expected business outcomes, not errors; they are
///   classified by `FailureCategory`, which drives status codes and log levels
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid input detected while building a value object
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Multiplier must be a finite value greater than 0, got {0}")]
    InvalidMultiplier(f64),

    #[error("Duration must be greater than 0 seconds")]
    InvalidDuration,

    #[error("End time {end_ms} must be after start time {start_ms}")]
    InvalidTimeRange { start_ms: i64, end_ms: i64 },

    #[error("Unknown booster type: {0}")]
    UnknownBoosterType(String),
}

/// Failure categories that map to HTTP status codes and logging severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureCategory {
    /// Caller mistakes (400 Bad Request), never retried
    Validation,

    /// Expected business outcomes (409 Conflict)
    Policy,

    /// The engine cannot take the request right now (503 Service Unavailable)
    Availability,

    /// Storage or programming errors caught at the boundary (500)
    Internal,
}

impl FailureCategory {
    /// Map failure category to HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            FailureCategory::Validation => 400,
            FailureCategory::Policy => 409,
            FailureCategory::Availability => 503,
            FailureCategory::Internal => 500,
        }
    }

    /// Map failure category to log level
    pub fn log_level(&self) -> &'static str {
        match self {
            FailureCategory::Validation => "info",
            FailureCategory::Policy => "debug",
            FailureCategory::Availability => "warn",
            FailureCategory::Internal => "error",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FailureCategory::Validation => "Validation",
            FailureCategory::Policy => "Policy",
            FailureCategory::Availability => "Availability",
            FailureCategory::Internal => "Internal",
        }
    }
}
