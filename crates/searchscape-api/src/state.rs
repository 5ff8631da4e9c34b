//! Shared application state for the scene gateway.
//!
//! [`AppState`] holds the loaded configuration, the artifact store, and a
//! lock that serialises rebuilds so two `refresh=true` requests never
//! write the artifact at the same time.

use std::path::PathBuf;
use std::sync::Arc;

use searchscape_core::{FileSceneStore, SceneStore, SearchscapeConfig};
use tokio::sync::Mutex;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Configuration the scene is generated from.
    pub config: Arc<SearchscapeConfig>,
    /// Where the config was loaded from, reported by the health endpoint.
    pub config_path: PathBuf,
    /// The cached scene artifact.
    pub store: Arc<dyn SceneStore>,
    /// Held while a scene is being generated or read.
    pub rebuild_lock: Arc<Mutex<()>>,
}

impl AppState {
    /// Create state backed by the file store at the configured output path.
    pub fn new(config: SearchscapeConfig, config_path: PathBuf) -> Self {
        let store = FileSceneStore::new(config.output_path());
        Self::with_store(config, config_path, Arc::new(store))
    }

    /// Create state with an explicit store.
    pub fn with_store(
        config: SearchscapeConfig,
        config_path: PathBuf,
        store: Arc<dyn SceneStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            config_path,
            store,
            rebuild_lock: Arc::new(Mutex::new(())),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config_path", &self.config_path)
            .field("scene_exists", &self.store.exists())
            .finish_non_exhaustive()
    }
}
