// Library interface for the booster engine - exposes modules for testing

pub mod clock;
pub mod config;
pub mod directory;
pub mod display;
pub mod errors;
pub mod extractors;
pub mod handlers;
pub mod manager;
pub mod registry;
pub mod repository;
pub mod retry;
pub mod state;

use axum::{
    routing::{get, post, put},
    Router,
};
use state::AppState;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health::health_check))
        .route("/health/detailed", get(handlers::health::detailed_health))
        // Sessions
        .route(
            "/api/actors/:actor_id/session",
            post(handlers::actors::join).delete(handlers::actors::quit),
        )
        // Boosters
        .route(
            "/api/actors/:actor_id/boosters",
            post(handlers::boosters::activate_booster).get(handlers::boosters::list_boosters),
        )
        .route(
            "/api/actors/:actor_id/boosters/:booster_type",
            axum::routing::delete(handlers::boosters::remove_booster),
        )
        .route("/api/actors/:actor_id/multipliers", get(handlers::boosters::get_multipliers))
        // Global event boosters
        .route(
            "/api/global-boosters/:booster_type",
            put(handlers::globals::set_global_booster).delete(handlers::globals::clear_global_booster),
        )
        // Metrics
        .route("/metrics", get(handlers::metrics::metrics_handler))
        // State
        .with_state(state)
        // Middleware
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}
