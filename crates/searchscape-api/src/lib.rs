//! Scene gateway API server for Searchscape.
//!
//! This crate provides an Axum HTTP server that bridges the scene pipeline
//! with the 3D frontend:
//!
//! - **`GET /api/scene`** returns the cached scene JSON, regenerating it
//!   from the search log when `refresh=true` or when no artifact exists
//! - **`GET /api/health`** reports the config path, whether the dataset
//!   exists, and when the scene was last written
//!
//! # Architecture
//!
//! Handlers never build scenes on the async executor. Generation runs on
//! Tokio's blocking pool behind a mutex, so at most one rebuild writes the
//! artifact at a time.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{bind, serve_until, start_server, ServerError};
pub use state::AppState;
