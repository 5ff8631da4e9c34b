//! End-to-end scene generation: search log in, cached artifact out.
//!
//! The scene is always built completely before the store is touched, so
//! an empty or malformed log never overwrites the existing artifact.

use std::io::ErrorKind;

use searchscape_types::Scene;
use tracing::info;

use crate::config::SearchscapeConfig;
use crate::logs::{load_logs, LogError};
use crate::scene::{build_scene, SceneError};
use crate::store::{SceneStore, StoreError};

/// Errors from any stage of scene generation.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The search log could not be read.
    #[error("log error: {source}")]
    Log {
        /// The underlying log error.
        #[from]
        source: LogError,
    },

    /// The scene could not be built.
    #[error("scene error: {source}")]
    Scene {
        /// The underlying build error.
        #[from]
        source: SceneError,
    },

    /// The artifact could not be read or written.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: StoreError,
    },
}

impl PipelineError {
    /// Whether this failure means "something the caller asked for does not
    /// exist" rather than an internal fault.
    ///
    /// Only a log file that is absent counts. Other I/O failures on the
    /// log, such as a permission error, are internal.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Store {
                source: StoreError::NotFound(_),
            } => true,
            Self::Log {
                source: LogError::Io { source, .. },
            } => source.kind() == ErrorKind::NotFound,
            _ => false,
        }
    }
}

/// Read the configured log, build the scene and write it to `store`.
///
/// # Errors
///
/// Returns the first failure. Nothing is written unless the build
/// succeeded.
pub fn generate_scene(
    config: &SearchscapeConfig,
    store: &dyn SceneStore,
) -> Result<Scene, PipelineError> {
    let input = config.input_path();
    let events = load_logs(&input)?;
    let scene = build_scene(&events, &config.build_config())?;
    store.write(&scene)?;

    info!(
        event_count = events.len(),
        bucket_count = scene.terrain_profile.len(),
        topic_count = scene.metadata.topics.len(),
        input = %input.display(),
        "Scene generated"
    );
    Ok(scene)
}

/// Return the cached scene, regenerating it when `refresh` is set or no
/// artifact exists yet.
///
/// # Errors
///
/// See [`generate_scene`]; a cache read can also fail with
/// [`StoreError`].
pub fn load_or_generate(
    config: &SearchscapeConfig,
    store: &dyn SceneStore,
    refresh: bool,
) -> Result<Scene, PipelineError> {
    if refresh || !store.exists() {
        return generate_scene(config, store);
    }
    Ok(store.read()?)
}
