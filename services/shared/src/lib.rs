pub mod booster;
pub mod booster_type;
pub mod constants;
pub mod errors;
pub mod outcome;
pub mod request;
pub mod types;

pub use booster::{Booster, TimeFormat};
pub use booster_type::BoosterType;
pub use constants::*;
pub use errors::{FailureCategory, ValidationError};
pub use outcome::{ActivationOutcome, ActivationResult, FailureReason};
pub use request::{BoosterRequest, BoosterRequestBuilder};
pub use types::*;

/// Current wall-clock time in Unix milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
