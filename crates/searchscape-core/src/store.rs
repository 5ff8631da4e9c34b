//! Persistence for the generated scene artifact.
//!
//! [`SceneStore`] is the read/write/exists seam between the pure pipeline
//! and stable storage. [`FileSceneStore`] keeps a single pretty-printed
//! JSON file and replaces it atomically, so a failed write never leaves a
//! partial artifact behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use searchscape_types::Scene;
use tracing::debug;

/// Errors that can occur while reading or writing the scene artifact.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No artifact exists yet.
    #[error("scene cache missing at {0}; regenerate with refresh=true")]
    NotFound(String),

    /// Reading or writing the artifact failed.
    #[error("scene store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The artifact could not be encoded or decoded.
    #[error("scene serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Storage for the single cached scene artifact.
pub trait SceneStore: Send + Sync {
    /// Read the cached scene.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no artifact exists.
    fn read(&self) -> Result<Scene, StoreError>;

    /// Replace the cached scene.
    fn write(&self, scene: &Scene) -> Result<(), StoreError>;

    /// Whether an artifact exists.
    fn exists(&self) -> bool;

    /// When the artifact was last written, if it exists.
    fn last_modified(&self) -> Option<DateTime<Utc>>;
}

/// A [`SceneStore`] backed by one JSON file.
#[derive(Debug, Clone)]
pub struct FileSceneStore {
    path: PathBuf,
}

impl FileSceneStore {
    /// Create a store for the artifact at `path`. Nothing is touched on disk
    /// until the first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the artifact.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SceneStore for FileSceneStore {
    fn read(&self) -> Result<Scene, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(self.path.display().to_string()));
            }
            Err(e) => return Err(StoreError::Io(e)),
        };
        Ok(serde_json::from_str(&contents)?)
    }

    fn write(&self, scene: &Scene) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(scene)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let temp = self.temp_path();
        let result = (|| -> std::io::Result<()> {
            let mut file = fs::File::create(&temp)?;
            file.write_all(json.as_bytes())?;
            file.write_all(b"\n")?;
            file.sync_all()?;
            fs::rename(&temp, &self.path)
        })();

        if let Err(e) = result {
            // Cleanup failure is ignored.
            let _ = fs::remove_file(&temp);
            return Err(StoreError::Io(e));
        }

        debug!(path = %self.path.display(), bytes = json.len(), "Scene artifact written");
        Ok(())
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn last_modified(&self) -> Option<DateTime<Utc>> {
        fs::metadata(&self.path)
            .and_then(|meta| meta.modified())
            .ok()
            .map(DateTime::<Utc>::from)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use searchscape_types::{EventTime, SceneMetadata, TerrainPoint};

    use super::*;

    fn scene() -> Scene {
        let ts = EventTime::parse("2024-05-01T09:00:00").unwrap();
        Scene {
            metadata: SceneMetadata {
                start: ts,
                end: ts,
                bucket_minutes: 60,
                topics: Vec::new(),
            },
            terrain_profile: vec![TerrainPoint {
                bucket: 0,
                x: 0.0,
                height: 12.5,
                top_topics: Vec::new(),
            }],
            queries: Vec::new(),
        }
    }

    #[test]
    fn missing_artifact_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSceneStore::new(dir.path().join("scene.json"));

        assert!(!store.exists());
        assert!(store.last_modified().is_none());
        assert!(matches!(store.read(), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn write_creates_parent_dirs_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSceneStore::new(dir.path().join("dist/nested/scene.json"));

        store.write(&scene()).unwrap();

        assert!(store.exists());
        assert!(store.last_modified().is_some());
        assert_eq!(store.read().unwrap(), scene());
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn artifact_is_pretty_printed_with_two_space_indent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSceneStore::new(dir.path().join("scene.json"));
        store.write(&scene()).unwrap();

        let text = std::fs::read_to_string(store.path()).unwrap();
        assert!(text.starts_with("{\n  \"metadata\""));
    }

    #[test]
    fn write_overwrites_previous_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSceneStore::new(dir.path().join("scene.json"));
        store.write(&scene()).unwrap();

        let mut updated = scene();
        updated.metadata.bucket_minutes = 15;
        store.write(&updated).unwrap();

        assert_eq!(store.read().unwrap().metadata.bucket_minutes, 15);
    }

    #[test]
    fn corrupt_artifact_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = FileSceneStore::new(path);
        assert!(matches!(store.read(), Err(StoreError::Serialization(_))));
    }
}
