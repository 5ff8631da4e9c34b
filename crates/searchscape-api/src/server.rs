//! Gateway lifecycle: bind the configured address, serve until shutdown.
//!
//! The binding comes from the `server` section of the loaded
//! [`SearchscapeConfig`](searchscape_core::SearchscapeConfig), so a host
//! name such as `localhost` resolves here and port `0` picks a free port.

use std::future::Future;
use std::io;
use std::sync::Arc;

use searchscape_core::config::ServerSection;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::router::build_router;
use crate::state::AppState;

/// Errors that can occur when starting or running the gateway server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The configured address could not be resolved or bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// The `host:port` that was requested.
        addr: String,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// The server hit a fatal I/O error while running.
    #[error("serve error: {source}")]
    Serve {
        /// The underlying I/O error.
        #[from]
        source: io::Error,
    },
}

/// Bind a listener for the given `server` section.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the host does not resolve or the port
/// is unavailable.
pub async fn bind(section: &ServerSection) -> Result<TcpListener, ServerError> {
    TcpListener::bind((section.host.as_str(), section.port))
        .await
        .map_err(|source| ServerError::Bind {
            addr: format!("{}:{}", section.host, section.port),
            source,
        })
}

/// Serve the gateway on `listener` until `shutdown` resolves.
///
/// # Errors
///
/// Returns [`ServerError::Serve`] on a fatal I/O error.
pub async fn serve_until<F>(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, config = %state.config_path.display(), "Scene gateway listening");
    }

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Scene gateway stopped");
    Ok(())
}

/// Bind the address configured in `state` and serve until `Ctrl-C`.
///
/// # Errors
///
/// Returns an error if binding fails or the server hits a fatal I/O error.
pub async fn start_server(state: Arc<AppState>) -> Result<(), ServerError> {
    let listener = bind(&state.config.server).await?;
    serve_until(listener, state, ctrl_c()).await
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
