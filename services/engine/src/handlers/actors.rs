use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use shared::ActorId;

use crate::errors::{AppError, Result};
use crate::extractors::ValidatedJson;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SessionBody {
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Mark an actor online and pull any stored boosters it does not hold yet
pub async fn join(
    State(state): State<AppState>,
    Path(actor_id): Path<ActorId>,
    ValidatedJson(body): ValidatedJson<SessionBody>,
) -> Result<Json<Value>> {
    let permissions = body.permissions.len();
    state.directory.join(actor_id, body.permissions);

    let restored = match state.manager.restore_actor(actor_id).await {
        Ok(restored) => restored,
        Err(e) => {
            tracing::warn!(%actor_id, error = %e, "Could not restore stored boosters on join");
            0
        }
    };

    tracing::info!(%actor_id, permissions, restored, "Actor joined");

    Ok(Json(json!({
        "actor_id": actor_id,
        "online": true,
        "restored": restored,
    })))
}

pub async fn quit(State(state): State<AppState>, Path(actor_id): Path<ActorId>) -> Result<Json<Value>> {
    if !state.directory.quit(actor_id) {
        return Err(AppError::NotFound(format!("Actor {} is not online", actor_id)));
    }
    state.manager.on_actor_quit(actor_id);

    tracing::info!(%actor_id, "Actor quit");

    Ok(Json(json!({
        "actor_id": actor_id,
        "online": false,
    })))
}
