//! Configuration loading and typed config structures for Searchscape.
//!
//! The canonical configuration lives in `searchscape.yaml` next to the
//! search log it points at. This module defines strongly-typed structs
//! that mirror the YAML structure, a loader that reads the file, and the
//! projection into the immutable [`BuildConfig`] consumed by the scene
//! builder.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level Searchscape configuration.
///
/// Mirrors the structure of `searchscape.yaml`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchscapeConfig {
    /// Path to the search log CSV. Relative paths resolve against
    /// [`base_dir`](Self::base_dir).
    #[serde(default = "default_input_csv")]
    pub input_csv: PathBuf,

    /// Path of the cached scene artifact.
    #[serde(default = "default_output_scene")]
    pub output_scene: PathBuf,

    /// Time bucketing.
    #[serde(default)]
    pub timeline: TimelineConfig,

    /// Spatial layout of the scene.
    #[serde(default)]
    pub scene: SceneLayoutConfig,

    /// Terrain height settings.
    #[serde(default)]
    pub terrain: TerrainConfig,

    /// HTTP gateway binding.
    #[serde(default)]
    pub server: ServerSection,

    /// Logging output.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Directory relative paths are resolved against. Set to the config
    /// file's parent by [`from_file`](Self::from_file).
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Default for SearchscapeConfig {
    fn default() -> Self {
        Self {
            input_csv: default_input_csv(),
            output_scene: default_output_scene(),
            timeline: TimelineConfig::default(),
            scene: SceneLayoutConfig::default(),
            terrain: TerrainConfig::default(),
            server: ServerSection::default(),
            logging: LoggingConfig::default(),
            base_dir: PathBuf::from("."),
        }
    }
}

impl SearchscapeConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `SEARCHSCAPE_HOST` and `SEARCHSCAPE_PORT` override the `server`
    /// section when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.base_dir = path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// An empty document yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        if config.base_dir.as_os_str().is_empty() {
            config.base_dir = PathBuf::from(".");
        }
        config.server.apply_env_overrides();
        Ok(config)
    }

    /// Resolve a configured path: absolute paths pass through, relative
    /// ones are joined onto [`base_dir`](Self::base_dir).
    pub fn resolve_relative(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Resolved location of the search log.
    pub fn input_path(&self) -> PathBuf {
        self.resolve_relative(&self.input_csv)
    }

    /// Resolved location of the scene artifact.
    pub fn output_path(&self) -> PathBuf {
        self.resolve_relative(&self.output_scene)
    }

    /// Project the pipeline knobs into a [`BuildConfig`].
    ///
    /// `smoothing_window` is clamped to at least 1.
    pub fn build_config(&self) -> BuildConfig {
        BuildConfig {
            bucket_minutes: self.timeline.bucket_minutes,
            length_units: self.scene.length_units,
            topic_spread: self.scene.topic_spread,
            max_height: self.terrain.max_height,
            smoothing_window: self.terrain.smoothing_window.max(1),
        }
    }
}

// ---------------------------------------------------------------------------
// Build configuration
// ---------------------------------------------------------------------------

/// Immutable knobs consumed once per scene build.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildConfig {
    /// Width of each terrain bucket in minutes.
    pub bucket_minutes: u32,
    /// Spatial length of the full timeline along the x axis.
    pub length_units: f64,
    /// Offset between topic lanes along the z axis.
    pub topic_spread: f64,
    /// Vertical scale cap for query and terrain heights.
    pub max_height: f64,
    /// Moving-average window over bucket heights. 1 disables smoothing.
    pub smoothing_window: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            bucket_minutes: default_bucket_minutes(),
            length_units: default_length_units(),
            topic_spread: default_topic_spread(),
            max_height: default_max_height(),
            smoothing_window: default_smoothing_window(),
        }
    }
}

impl BuildConfig {
    /// Check that the knobs describe a buildable scene.
    ///
    /// Returns a human-readable reason on failure.
    pub fn validate(&self) -> Result<(), String> {
        if self.bucket_minutes == 0 {
            return Err("bucket_minutes must be at least 1".to_owned());
        }
        for (name, value) in [
            ("length_units", self.length_units),
            ("topic_spread", self.topic_spread),
            ("max_height", self.max_height),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} must be a finite, non-negative number"));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Time bucketing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimelineConfig {
    /// Width of each terrain bucket in minutes.
    #[serde(default = "default_bucket_minutes")]
    pub bucket_minutes: u32,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            bucket_minutes: default_bucket_minutes(),
        }
    }
}

/// Spatial layout configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SceneLayoutConfig {
    /// Length of the timeline along the x axis.
    #[serde(default = "default_length_units")]
    pub length_units: f64,

    /// Offset between topic lanes along the z axis.
    #[serde(default = "default_topic_spread")]
    pub topic_spread: f64,
}

impl Default for SceneLayoutConfig {
    fn default() -> Self {
        Self {
            length_units: default_length_units(),
            topic_spread: default_topic_spread(),
        }
    }
}

/// Terrain configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TerrainConfig {
    /// Vertical scale cap.
    #[serde(default = "default_max_height")]
    pub max_height: f64,

    /// Moving-average window width over bucket heights.
    #[serde(default = "default_smoothing_window")]
    pub smoothing_window: usize,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            max_height: default_max_height(),
            smoothing_window: default_smoothing_window(),
        }
    }
}

/// HTTP gateway binding.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSection {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerSection {
    /// Override the binding with `SEARCHSCAPE_HOST` / `SEARCHSCAPE_PORT`
    /// when set. An unparseable port is ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("SEARCHSCAPE_HOST") {
            self.host = val;
        }
        if let Some(port) = std::env::var("SEARCHSCAPE_PORT")
            .ok()
            .and_then(|val| val.parse().ok())
        {
            self.port = port;
        }
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, one line per event.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_input_csv() -> PathBuf {
    PathBuf::from("sample_logs/queries.csv")
}

fn default_output_scene() -> PathBuf {
    PathBuf::from("dist/scene.json")
}

const fn default_bucket_minutes() -> u32 {
    60
}

const fn default_length_units() -> f64 {
    120.0
}

const fn default_topic_spread() -> f64 {
    10.0
}

const fn default_max_height() -> f64 {
    40.0
}

const fn default_smoothing_window() -> usize {
    1
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_values() {
        let config = SearchscapeConfig::default();
        let build = config.build_config();
        assert_eq!(build.bucket_minutes, 60);
        assert_eq!(build.length_units, 120.0);
        assert_eq!(build.topic_spread, 10.0);
        assert_eq!(build.max_height, 40.0);
        assert_eq!(build.smoothing_window, 1);
        assert_eq!(build, BuildConfig::default());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
input_csv: logs/q.csv
output_scene: out/scene.json
timeline:
  bucket_minutes: 30
scene:
  length_units: 200
  topic_spread: 4.5
terrain:
  max_height: 25
  smoothing_window: 3
logging:
  level: debug
  format: json
";
        let config = SearchscapeConfig::parse(yaml).unwrap();
        assert_eq!(config.input_csv, PathBuf::from("logs/q.csv"));
        assert_eq!(config.timeline.bucket_minutes, 30);
        assert_eq!(config.scene.length_units, 200.0);
        assert_eq!(config.scene.topic_spread, 4.5);
        assert_eq!(config.terrain.max_height, 25.0);
        assert_eq!(config.terrain.smoothing_window, 3);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let config = SearchscapeConfig::parse("terrain:\n  max_height: 10\n").unwrap();
        assert_eq!(config.terrain.max_height, 10.0);
        assert_eq!(config.terrain.smoothing_window, 1);
        assert_eq!(config.timeline.bucket_minutes, 60);
        assert_eq!(config.output_scene, PathBuf::from("dist/scene.json"));
    }

    #[test]
    fn empty_yaml_is_default() {
        let config = SearchscapeConfig::parse("").unwrap();
        assert_eq!(config.build_config(), BuildConfig::default());
    }

    #[test]
    fn zero_smoothing_window_is_clamped() {
        let config = SearchscapeConfig::parse("terrain:\n  smoothing_window: 0\n").unwrap();
        assert_eq!(config.build_config().smoothing_window, 1);
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let result = SearchscapeConfig::parse("timeline: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn from_file_resolves_relative_paths_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("searchscape.yaml");
        std::fs::write(&path, "input_csv: data/q.csv\n").unwrap();

        let config = SearchscapeConfig::from_file(&path).unwrap();
        assert_eq!(config.input_path(), dir.path().join("data/q.csv"));
        assert_eq!(config.output_path(), dir.path().join("dist/scene.json"));
    }

    #[test]
    fn absolute_paths_pass_through() {
        let config = SearchscapeConfig {
            base_dir: PathBuf::from("/srv/searchscape"),
            ..SearchscapeConfig::default()
        };
        let abs = PathBuf::from("/tmp/scene.json");
        assert_eq!(config.resolve_relative(&abs), abs);
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = SearchscapeConfig::from_file(Path::new("/nonexistent/searchscape.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn validate_rejects_zero_bucket_width() {
        let build = BuildConfig {
            bucket_minutes: 0,
            ..BuildConfig::default()
        };
        assert!(build.validate().is_err());
    }

    #[test]
    fn validate_rejects_negative_scale() {
        let build = BuildConfig {
            max_height: -1.0,
            ..BuildConfig::default()
        };
        assert!(build.validate().is_err());
        assert!(BuildConfig::default().validate().is_ok());
    }
}
