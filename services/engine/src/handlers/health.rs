use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

pub async fn detailed_health(State(state): State<AppState>) -> Json<Value> {
    let store_healthy = state.manager.store_health().await.is_ok();
    let accepting = !state.manager.is_shutting_down();

    Json(json!({
        "status": if store_healthy && accepting { "healthy" } else { "degraded" },
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "components": {
            "store": {
                "backend": state.manager.store_backend(),
                "status": if store_healthy { "healthy" } else { "unhealthy" },
            },
            "manager": if accepting { "running" } else { "shutting_down" },
        },
        "active_actors": state.manager.active_actor_count().await,
        "online_actors": state.directory.online_count(),
    }))
}
