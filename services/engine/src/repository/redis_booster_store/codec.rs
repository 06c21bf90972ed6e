//! Stored booster record
//!
//! The booster type is the hash field, so the record only carries the
//! multiplier and the time window.

use serde::{Deserialize, Serialize};
use shared::{Booster, BoosterType};

use crate::repository::StoreError;

#[derive(Debug, Serialize, Deserialize)]
struct StoredBooster {
    multiplier: f64,
    start_ms: i64,
    end_ms: i64,
}

pub fn encode(booster: &Booster) -> Result<String, StoreError> {
    let record = StoredBooster {
        multiplier: booster.multiplier(),
        start_ms: booster.start_ms(),
        end_ms: booster.end_ms(),
    };
    Ok(serde_json::to_string(&record)?)
}

pub fn decode(field: &str, value: &str) -> Result<Booster, StoreError> {
    let booster_type: BoosterType = field
        .parse()
        .map_err(|e| StoreError::InvalidRecord(format!("field '{}': {}", field, e)))?;
    let record: StoredBooster = serde_json::from_str(value)?;

    Booster::restore(booster_type, record.multiplier, record.start_ms, record.end_ms)
        .map_err(|e| StoreError::InvalidRecord(format!("field '{}': {}", field, e)))
}
