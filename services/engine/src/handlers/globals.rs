use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::parse_booster_type;
use crate::errors::{AppError, Result};
use crate::extractors::ValidatedJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GlobalBoosterBody {
    pub multiplier: f64,
    pub duration_seconds: u64,
}

pub async fn set_global_booster(
    State(state): State<AppState>,
    Path(booster_type): Path<String>,
    ValidatedJson(body): ValidatedJson<GlobalBoosterBody>,
) -> Result<Json<Value>> {
    let booster_type = parse_booster_type(&booster_type)?;
    let global = state
        .manager
        .set_global_booster(booster_type, body.multiplier, body.duration_seconds)
        .await?;

    Ok(Json(json!({
        "booster_type": booster_type,
        "multiplier": global.multiplier,
        "end_ms": global.end_ms,
    })))
}

pub async fn clear_global_booster(
    State(state): State<AppState>,
    Path(booster_type): Path<String>,
) -> Result<Json<Value>> {
    let booster_type = parse_booster_type(&booster_type)?;

    if !state.manager.clear_global_booster(booster_type).await {
        return Err(AppError::NotFound(format!(
            "No global {} is set",
            booster_type.formatted_name()
        )));
    }

    Ok(Json(json!({ "cleared": true })))
}
