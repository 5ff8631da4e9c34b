//! REST endpoint handlers for the scene gateway.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/health` | Processor and dataset availability |
//! | `GET` | `/api/scene` | Latest scene, optionally regenerated |

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use searchscape_core::load_or_generate;
use searchscape_types::Scene;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for `GET /api/scene`.
#[derive(Debug, Default, Deserialize)]
pub struct SceneQuery {
    /// Regenerate the scene from the search log before returning it.
    #[serde(default)]
    pub refresh: bool,
}

/// Response body of `GET /api/health`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Always `"ok"` when the server answers.
    pub status: String,
    /// Path of the loaded configuration file.
    pub config: String,
    /// Whether the configured search log exists.
    pub dataset_exists: bool,
    /// When the cached scene was last written, if it exists.
    pub last_scene_updated: Option<String>,
}

/// Report processor and dataset availability.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: String::from("ok"),
        config: state.config_path.display().to_string(),
        dataset_exists: state.config.input_path().is_file(),
        last_scene_updated: state.store.last_modified().map(|at| at.to_rfc3339()),
    })
}

/// Return the cached scene, regenerating it when `refresh=true` or when no
/// artifact exists yet.
///
/// Generation is blocking file and CPU work, so it runs on the blocking
/// pool. Concurrent requests queue on the rebuild lock.
pub async fn get_scene(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SceneQuery>,
) -> Result<Json<Scene>, ApiError> {
    let _guard = state.rebuild_lock.lock().await;

    let config = Arc::clone(&state.config);
    let store = Arc::clone(&state.store);
    let refresh = params.refresh;
    if refresh {
        info!("Scene regeneration requested");
    }

    let scene = tokio::task::spawn_blocking(move || {
        load_or_generate(&config, store.as_ref(), refresh)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("scene task failed: {e}")))??;

    Ok(Json(scene))
}
