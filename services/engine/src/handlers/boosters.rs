use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shared::{
    ActivationResult, ActorId, Booster, BoosterRequest, BoosterSource, BoosterType, StackingStrategy, TimeFormat,
};

use tracing::Instrument;

use super::parse_booster_type;
use crate::errors::{AppError, Result};
use crate::extractors::ValidatedJson;
use crate::manager::MultiplierBreakdown;
use crate::state::AppState;

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct ActivateBoosterBody {
    pub booster_type: String,
    /// Falls back to the channel's default multiplier
    pub multiplier: Option<f64>,
    pub duration_seconds: u64,
    pub stacking_strategy: Option<String>,
    #[serde(default)]
    pub source: Option<BoosterSource>,
    pub note: Option<String>,
    #[serde(default)]
    pub bypass_limit: bool,
    #[serde(default)]
    pub bypass_validation: bool,
    #[serde(default)]
    pub silent: bool,
    #[serde(default = "default_true")]
    pub save_to_storage: bool,
}

#[derive(Debug, Serialize)]
pub struct BoosterView {
    pub booster_type: BoosterType,
    pub name: String,
    pub icon: &'static str,
    pub multiplier: f64,
    pub start_ms: i64,
    pub end_ms: i64,
    pub remaining_seconds: u64,
    pub remaining: String,
    pub remaining_compact: String,
    pub progress_percentage: f64,
    pub source: Option<BoosterSource>,
    pub stacking_strategy: Option<StackingStrategy>,
    pub note: Option<String>,
}

impl BoosterView {
    fn new(booster: &Booster, metadata: Option<&BoosterRequest>, now_ms: i64) -> Self {
        Self {
            booster_type: booster.booster_type(),
            name: booster.booster_type().formatted_name(),
            icon: booster.booster_type().icon(),
            multiplier: booster.multiplier(),
            start_ms: booster.start_ms(),
            end_ms: booster.end_ms(),
            remaining_seconds: booster.remaining_seconds_at(now_ms),
            remaining: booster.format_time_left_at(TimeFormat::Full, now_ms),
            remaining_compact: booster.format_time_left_at(TimeFormat::Compact, now_ms),
            progress_percentage: booster.progress_percentage_at(now_ms),
            source: metadata.map(BoosterRequest::source),
            stacking_strategy: metadata.and_then(BoosterRequest::stacking_strategy),
            note: metadata.and_then(|m| m.note().map(str::to_string)),
        }
    }
}

pub async fn activate_booster(
    State(state): State<AppState>,
    Path(actor_id): Path<ActorId>,
    ValidatedJson(body): ValidatedJson<ActivateBoosterBody>,
) -> Result<Json<ActivationResult>> {
    let booster_type = parse_booster_type(&body.booster_type)?;
    let multiplier = body
        .multiplier
        .unwrap_or_else(|| state.manager.registry().default_multiplier(booster_type));

    let mut builder = BoosterRequest::builder(booster_type)
        .multiplier(multiplier)
        .duration_seconds(body.duration_seconds)
        .source(body.source.unwrap_or(BoosterSource::Api))
        .bypass_limit(body.bypass_limit)
        .bypass_validation(body.bypass_validation)
        .silent(body.silent)
        .save_to_storage(body.save_to_storage);
    if let Some(raw) = body.stacking_strategy.as_deref() {
        builder = builder.stacking_strategy(StackingStrategy::parse(raw));
    }
    if let Some(note) = body.note {
        builder = builder.note(note);
    }
    let request = builder.build()?;

    let span = tracing::info_span!("activate_booster", %actor_id, %booster_type);
    let result = state.manager.activate(actor_id, request).instrument(span).await;
    if let Some(reason) = result.failure_reason() {
        return Err(AppError::Rejected {
            reason,
            message: result.message,
        });
    }

    Ok(Json(result))
}

pub async fn list_boosters(
    State(state): State<AppState>,
    Path(actor_id): Path<ActorId>,
) -> Result<Json<Value>> {
    let boosters = state.manager.list(actor_id).await;
    let now_ms = state.manager.now_ms();

    let mut views = Vec::with_capacity(boosters.len());
    for booster in &boosters {
        let metadata = state.manager.metadata(actor_id, booster.booster_type()).await;
        views.push(BoosterView::new(booster, metadata.as_ref(), now_ms));
    }

    Ok(Json(json!({
        "actor_id": actor_id,
        "boosters": views,
        "count": views.len(),
    })))
}

pub async fn remove_booster(
    State(state): State<AppState>,
    Path((actor_id, booster_type)): Path<(ActorId, String)>,
) -> Result<Json<Value>> {
    let booster_type = parse_booster_type(&booster_type)?;

    if !state.manager.remove(actor_id, booster_type).await {
        return Err(AppError::NotFound(format!(
            "Actor {} has no active {}",
            actor_id,
            booster_type.formatted_name()
        )));
    }

    Ok(Json(json!({ "removed": true })))
}

pub async fn get_multipliers(
    State(state): State<AppState>,
    Path(actor_id): Path<ActorId>,
) -> Result<Json<Value>> {
    let mut breakdowns: Vec<MultiplierBreakdown> = Vec::with_capacity(BoosterType::ALL.len());
    for booster_type in BoosterType::ALL {
        breakdowns.push(state.manager.multiplier_breakdown(actor_id, booster_type).await);
    }

    Ok(Json(json!({
        "actor_id": actor_id,
        "multipliers": breakdowns,
    })))
}
