//! Axum router construction for the scene gateway.
//!
//! Assembles both read-only routes into a single [`Router`] with CORS
//! middleware enabled for the frontend dev server.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// - `GET /api/health` -- processor and dataset availability
/// - `GET /api/scene` -- latest scene (`?refresh=true` to regenerate)
///
/// CORS allows any origin.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/scene", get(handlers::get_scene))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
