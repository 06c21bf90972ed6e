use axum::{extract::State, response::IntoResponse};

use crate::state::AppState;

pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    // Prometheus scrapes the dedicated exporter port
    format!("Metrics available on port {}", state.config.metrics_port)
}
