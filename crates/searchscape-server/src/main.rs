//! `searchscape` binary: turns a search log into a 3D scene and serves it.
//!
//! # Subcommands
//!
//! - `process` -- read the configured CSV, build the scene, write
//!   `scene.json`, and exit
//! - `serve` -- run the scene gateway (`/api/scene`, `/api/health`)
//!
//! # Startup Sequence
//!
//! 1. Parse command-line arguments
//! 2. Load configuration from `searchscape.yaml` (defaults if absent)
//! 3. Initialize structured logging (tracing)
//! 4. Run the selected subcommand

mod error;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use searchscape_api::AppState;
use searchscape_core::config::{LogFormat, LoggingConfig};
use searchscape_core::{generate_scene, FileSceneStore, SearchscapeConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::CliError;

#[derive(Debug, Parser)]
#[command(name = "searchscape", about = "Search history to 3D scene pipeline", version)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, global = true, default_value = "searchscape.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Process the search log into a scene JSON file and exit
    Process,
    /// Serve the scene over HTTP
    Serve,
}

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, processing or serving fails.
#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    let (config, config_found) = load_config(&cli.config)?;
    init_logging(&config.logging)?;

    info!(
        config = %cli.config.display(),
        config_found,
        input = %config.input_path().display(),
        output = %config.output_path().display(),
        "searchscape starting"
    );

    match cli.command {
        Command::Process => process(&config),
        Command::Serve => serve(config, cli.config).await,
    }
}

/// Load configuration, falling back to defaults rooted at the config
/// file's directory when the file does not exist.
fn load_config(path: &Path) -> Result<(SearchscapeConfig, bool), CliError> {
    if path.exists() {
        return Ok((SearchscapeConfig::from_file(path)?, true));
    }
    let mut config = SearchscapeConfig::parse("")?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        config.base_dir = parent.to_path_buf();
    }
    Ok((config, false))
}

/// Install the global tracing subscriber. `RUST_LOG` takes precedence over
/// the configured level.
fn init_logging(logging: &LoggingConfig) -> Result<(), CliError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = match logging.format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.map_err(|e| CliError::Logging {
        message: e.to_string(),
    })
}

fn process(config: &SearchscapeConfig) -> Result<(), CliError> {
    let store = FileSceneStore::new(config.output_path());
    let scene = generate_scene(config, &store)?;
    info!(
        event_count = scene.queries.len(),
        output = %store.path().display(),
        "Processed search log"
    );
    Ok(())
}

async fn serve(config: SearchscapeConfig, config_path: PathBuf) -> Result<(), CliError> {
    let state = Arc::new(AppState::new(config, config_path));
    searchscape_api::start_server(state).await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_subcommands_and_config_flag() {
        let cli = Cli::try_parse_from(["searchscape", "process", "--config", "cfg/s.yaml"]).unwrap();
        assert!(matches!(cli.command, Command::Process));
        assert_eq!(cli.config, PathBuf::from("cfg/s.yaml"));

        let cli = Cli::try_parse_from(["searchscape", "serve"]).unwrap();
        assert!(matches!(cli.command, Command::Serve));
        assert_eq!(cli.config, PathBuf::from("searchscape.yaml"));
    }

    #[test]
    fn missing_config_falls_back_to_defaults_in_its_directory() {
        let dir = tempfile::tempdir().unwrap();
        let (config, found) = load_config(&dir.path().join("absent.yaml")).unwrap();

        assert!(!found);
        assert_eq!(config.output_path(), dir.path().join("dist/scene.json"));
    }

    #[test]
    fn process_writes_scene_artifact() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("queries.csv"),
            "timestamp,query,intent_topic,session_id,clicks,dwell_seconds,result_count\n\
             2024-05-01T09:00:00,q,t,s,1,2,3\n",
        )
        .unwrap();
        let config_path = dir.path().join("searchscape.yaml");
        std::fs::write(&config_path, "input_csv: queries.csv\noutput_scene: out/scene.json\n")
            .unwrap();

        let (config, found) = load_config(&config_path).unwrap();
        assert!(found);
        process(&config).unwrap();
        assert!(dir.path().join("out/scene.json").is_file());
    }
}
