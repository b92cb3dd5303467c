pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::sessions::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/assets", post(handlers::handle_upload))
        .route(
            "/api/v1/sessions/:session_id/documents/grid",
            post(handlers::handle_generate_grid),
        )
        .route(
            "/api/v1/sessions/:session_id/documents/individual",
            post(handlers::handle_generate_individual),
        )
        .route(
            "/api/v1/sessions/:session_id",
            delete(handlers::handle_reset),
        )
        .with_state(state)
}
