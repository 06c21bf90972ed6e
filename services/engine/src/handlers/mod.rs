pub mod actors;
pub mod boosters;
pub mod globals;
pub mod health;
pub mod metrics;

use shared::BoosterType;

use crate::errors::{AppError, Result};

pub(crate) fn parse_booster_type(raw: &str) -> Result<BoosterType> {
    raw.parse::<BoosterType>()
        .map_err(|e| AppError::InvalidInput(e.to_string()))
}
