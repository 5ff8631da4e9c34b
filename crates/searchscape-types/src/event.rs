//! The search interaction record consumed by the scene pipeline.
//!
//! One [`QueryEvent`] corresponds to one row of the search log. The log
//! reader in `searchscape-core` is responsible for producing these; this
//! module only defines the shape.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::time::EventTime;

/// One observed search interaction.
///
/// Numeric fields are zero when the source row left them empty. The
/// `session_id` and `result_count` fields are carried through to the
/// scene unchanged and never take part in aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct QueryEvent {
    /// When the query was issued, with or without an offset.
    #[ts(as = "String")]
    pub timestamp: EventTime,
    /// Display text of the query. Never empty.
    pub query: String,
    /// Classification label, used as the grouping key for lanes.
    pub topic: String,
    /// Opaque session identifier.
    pub session_id: String,
    /// Number of result clicks.
    pub clicks: u32,
    /// Time spent on results, in seconds. Non-negative and finite.
    pub dwell_seconds: f64,
    /// Number of results shown for the query.
    pub result_count: u32,
}

impl QueryEvent {
    /// Create an event with zero engagement and an empty session id.
    ///
    /// Mostly useful for fixtures; the log reader fills every field.
    pub fn new(
        timestamp: impl Into<EventTime>,
        query: impl Into<String>,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            query: query.into(),
            topic: topic.into(),
            session_id: String::new(),
            clicks: 0,
            dwell_seconds: 0.0,
            result_count: 0,
        }
    }

    /// Set the click and dwell signal, returning the updated event.
    #[must_use]
    pub const fn with_engagement(mut self, clicks: u32, dwell_seconds: f64) -> Self {
        self.clicks = clicks;
        self.dwell_seconds = dwell_seconds;
        self
    }
}
