//! Shared type definitions for Searchscape.
//!
//! This crate is the single source of truth for the search log record and
//! the scene document. Types defined here flow downstream to `TypeScript`
//! via `ts-rs` for the 3D frontend.
//!
//! # Modules
//!
//! - [`event`] -- The [`QueryEvent`] log record
//! - [`scene`] -- The [`Scene`] document and its parts
//! - [`time`] -- [`EventTime`], a log timestamp that remembers its offset

pub mod event;
pub mod scene;
pub mod time;

// Re-export all public types at crate root for convenience.
pub use event::QueryEvent;
pub use scene::{QueryMetrics, QueryNode, Scene, SceneMetadata, TerrainPoint, TopicLane};
pub use time::{EventTime, ParseEventTimeError};
