//! The scene document handed to the rendering frontend.
//!
//! Field names, nesting and units here are the wire contract shared with
//! the frontend and with the cached `scene.json` artifact. All real-valued
//! coordinates and scores are rounded to three decimal places by the
//! builder before they land in these structs.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::time::EventTime;

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

/// A complete, immutable scene snapshot derived from one event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Scene {
    /// Global time range, bucket width and topic lanes.
    pub metadata: SceneMetadata,
    /// One entry per time bucket, in bucket order.
    pub terrain_profile: Vec<TerrainPoint>,
    /// One entry per input event, in ascending timestamp order.
    pub queries: Vec<QueryNode>,
}

/// Scene-wide metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct SceneMetadata {
    /// Timestamp of the earliest event.
    #[ts(as = "String")]
    pub start: EventTime,
    /// Timestamp of the latest event.
    #[ts(as = "String")]
    pub end: EventTime,
    /// Width of each terrain bucket in minutes.
    pub bucket_minutes: u32,
    /// Distinct topics in first-seen order.
    pub topics: Vec<TopicLane>,
}

/// A distinct topic and the lane it occupies along the z axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct TopicLane {
    /// The topic label.
    pub topic: String,
    /// Zero-based lane index, equal to first-seen order.
    pub lane: u32,
    /// Decorative pseudo-embedding of the topic label.
    pub embedding: Vec<f64>,
}

// ---------------------------------------------------------------------------
// Terrain
// ---------------------------------------------------------------------------

/// One time bucket of the terrain profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct TerrainPoint {
    /// Zero-based bucket index.
    pub bucket: u32,
    /// Position along the timeline axis.
    pub x: f64,
    /// Smoothed, normalized height in `[0, maxHeight]`.
    pub height: f64,
    /// Up to three topics with the largest contribution to this bucket.
    pub top_topics: Vec<String>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// A single query placed in 3D space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct QueryNode {
    /// Display text of the query.
    pub query: String,
    /// Topic label.
    pub topic: String,
    /// When the query was issued.
    #[ts(as = "String")]
    pub timestamp: EventTime,
    /// Opaque session identifier, carried through unchanged.
    pub session_id: String,
    /// Raw and derived engagement metrics.
    pub metrics: QueryMetrics,
    /// `[x, y, z]`: timeline position, engagement height, topic lane offset.
    #[ts(as = "(f64, f64, f64)")]
    pub position: [f64; 3],
    /// Decorative pseudo-embedding of the query text.
    pub embedding: Vec<f64>,
}

/// Engagement metrics attached to a [`QueryNode`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct QueryMetrics {
    /// Number of result clicks.
    pub clicks: u32,
    /// Dwell time in seconds.
    pub dwell_seconds: f64,
    /// Number of results shown.
    pub results: u32,
    /// Weighted engagement score in `[0, 1]`.
    pub engagement: f64,
}
