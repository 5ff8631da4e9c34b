//! Error types for the `searchscape` binary.
//!
//! [`CliError`] is the top-level error type that wraps every failure mode
//! during startup, processing and serving.

/// Top-level error for the `searchscape` binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: searchscape_core::config::ConfigError,
    },

    /// Scene generation failed.
    #[error("pipeline error: {source}")]
    Pipeline {
        /// The underlying pipeline error.
        #[from]
        source: searchscape_core::PipelineError,
    },

    /// The gateway server failed.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: searchscape_api::ServerError,
    },

    /// The logging subscriber could not be installed.
    #[error("logging error: {message}")]
    Logging {
        /// Description of the logging failure.
        message: String,
    },
}
