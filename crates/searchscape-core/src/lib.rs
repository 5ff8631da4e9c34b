//! Search log to 3D scene pipeline for Searchscape.
//!
//! This crate turns a chronological log of search queries into a
//! [`Scene`](searchscape_types::Scene): per-query positions and engagement
//! scores, a smoothed terrain profile over fixed time buckets, and
//! deterministic pseudo-embeddings for styling.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `searchscape.yaml` and the
//!   immutable [`BuildConfig`].
//! - [`embedding`] -- Deterministic label-to-vector hash.
//! - [`bucket`] -- Time bucketing and moving-average smoothing.
//! - [`scene`] -- [`build_scene`], the pure scene builder.
//! - [`logs`] -- CSV search log reader.
//! - [`store`] -- [`SceneStore`] trait and the file-backed artifact store.
//! - [`pipeline`] -- Log -> scene -> artifact orchestration.
//!
//! [`BuildConfig`]: config::BuildConfig
//! [`build_scene`]: scene::build_scene
//! [`SceneStore`]: store::SceneStore

pub mod bucket;
pub mod config;
pub mod embedding;
pub mod logs;
pub mod pipeline;
pub mod scene;
pub mod store;

pub use config::{BuildConfig, SearchscapeConfig};
pub use pipeline::{generate_scene, load_or_generate, PipelineError};
pub use scene::{build_scene, SceneError};
pub use store::{FileSceneStore, SceneStore, StoreError};
