//! Scene construction from a search log.
//!
//! [`build_scene`] is the single entry point. It sorts the events, derives
//! normalization bases, places each query in 3D space, aggregates
//! per-bucket contributions into a terrain profile, smooths it, and ranks
//! the dominant topics of each bucket.
//!
//! # Two engagement formulas
//!
//! Individual query height uses `0.4 * clicks + 0.6 * dwell` (normalized),
//! while terrain buckets accumulate the unweighted mean
//! `(clicks + dwell) / 2`.
//!
//! The builder does no I/O. Identical input yields an identical [`Scene`].

use std::collections::{BTreeMap, HashMap};

use searchscape_types::{
    QueryEvent, QueryMetrics, QueryNode, Scene, SceneMetadata, TerrainPoint, TopicLane,
};
use tracing::debug;

use crate::bucket::{bucket_index, minutes_between, smooth};
use crate::config::BuildConfig;
use crate::embedding::pseudo_embedding;

/// Weight of normalized clicks in per-query engagement.
const CLICK_WEIGHT: f64 = 0.4;
/// Weight of normalized dwell time in per-query engagement.
const DWELL_WEIGHT: f64 = 0.6;
/// Number of topics reported per terrain bucket.
const TOP_TOPICS: usize = 3;

/// Errors that abort a scene build. No partial scene is ever produced.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// The event list was empty, so there is no time range to normalize.
    #[error("no events found in log")]
    EmptyInput,

    /// The build configuration cannot describe a scene.
    #[error("invalid build configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// Round to three decimal places, the precision of the wire format.
///
/// Rounds the exact binary value of `value`, with ties to even, so
/// `1.0005` (stored just below the midpoint) becomes `1.0` and the exact
/// midpoint `1.0625` becomes `1.062`.
#[must_use]
pub fn round3(value: f64) -> f64 {
    format!("{value:.3}").parse().unwrap_or(value)
}

/// Accumulated contribution of one topic within one bucket.
#[derive(Debug, Clone, Copy)]
struct TopicTally {
    /// Order in which the topic first appeared in this bucket.
    first_seen: usize,
    /// Sum of contributions.
    contribution: f64,
}

/// Build a scene from `events`.
///
/// Events may arrive in any order; they are stably sorted by timestamp
/// first, so ties keep input order and topic lanes always follow
/// first-seen order in time.
///
/// # Errors
///
/// Returns [`SceneError::EmptyInput`] for an empty list and
/// [`SceneError::InvalidConfig`] if [`BuildConfig::validate`] fails.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::arithmetic_side_effects,
    clippy::suboptimal_flops,
    clippy::too_many_lines
)]
pub fn build_scene(events: &[QueryEvent], config: &BuildConfig) -> Result<Scene, SceneError> {
    config
        .validate()
        .map_err(|reason| SceneError::InvalidConfig { reason })?;

    let mut sorted: Vec<&QueryEvent> = events.iter().collect();
    sorted.sort_by_key(|event| event.timestamp.to_utc());

    let (Some(first), Some(last)) = (sorted.first(), sorted.last()) else {
        return Err(SceneError::EmptyInput);
    };
    let start = first.timestamp;
    let end = last.timestamp;

    let bucket_minutes = f64::from(config.bucket_minutes);
    let total_minutes = minutes_between(start, end).max(bucket_minutes);
    let bucket_count = ((total_minutes / bucket_minutes).ceil() as usize).max(1);

    let max_clicks = sorted
        .iter()
        .map(|event| event.clicks)
        .max()
        .filter(|&clicks| clicks > 0)
        .map_or(1.0, f64::from);
    let max_dwell = sorted
        .iter()
        .map(|event| event.dwell_seconds)
        .fold(0.0_f64, f64::max);
    let max_dwell = if max_dwell > 0.0 { max_dwell } else { 1.0 };

    // Lanes in first-seen order.
    let mut topics: Vec<&str> = Vec::new();
    let mut lanes: HashMap<&str, usize> = HashMap::new();
    for event in &sorted {
        if !lanes.contains_key(event.topic.as_str()) {
            lanes.insert(event.topic.as_str(), topics.len());
            topics.push(event.topic.as_str());
        }
    }
    let lane_of = |topic: &str| lanes.get(topic).copied().unwrap_or(0);

    // Per-query placement.
    let queries: Vec<QueryNode> = sorted
        .iter()
        .map(|event| {
            let clicks_norm = f64::from(event.clicks) / max_clicks;
            let dwell_norm = event.dwell_seconds / max_dwell;
            let engagement = CLICK_WEIGHT * clicks_norm + DWELL_WEIGHT * dwell_norm;
            let x_ratio = minutes_between(start, event.timestamp) / total_minutes;
            let lane = lane_of(event.topic.as_str());
            QueryNode {
                query: event.query.clone(),
                topic: event.topic.clone(),
                timestamp: event.timestamp,
                session_id: event.session_id.clone(),
                metrics: QueryMetrics {
                    clicks: event.clicks,
                    dwell_seconds: event.dwell_seconds,
                    results: event.result_count,
                    engagement: round3(engagement),
                },
                position: [
                    round3(x_ratio * config.length_units),
                    round3(engagement * config.max_height),
                    round3(lane as f64 * config.topic_spread),
                ],
                embedding: pseudo_embedding(&event.query),
            }
        })
        .collect();

    // Per-bucket aggregation.
    let mut heights = vec![0.0_f64; bucket_count];
    let mut bucket_topics: Vec<BTreeMap<String, TopicTally>> = vec![BTreeMap::new(); bucket_count];
    for event in &sorted {
        let index = bucket_index(event.timestamp, start, config.bucket_minutes)
            .min(bucket_count - 1);
        let contribution =
            (f64::from(event.clicks) / max_clicks + event.dwell_seconds / max_dwell) / 2.0;
        if let Some(height) = heights.get_mut(index) {
            *height += contribution;
        }
        if let Some(per_topic) = bucket_topics.get_mut(index) {
            let first_seen = per_topic.len();
            per_topic
                .entry(event.topic.clone())
                .or_insert(TopicTally {
                    first_seen,
                    contribution: 0.0,
                })
                .contribution += contribution;
        }
    }

    let smoothed = smooth(&heights, config.smoothing_window);
    let event_count = sorted.len() as f64;
    let x_denominator = bucket_count.saturating_sub(1).max(1) as f64;

    let terrain_profile: Vec<TerrainPoint> = smoothed
        .iter()
        .zip(&bucket_topics)
        .enumerate()
        .map(|(i, (height, per_topic))| TerrainPoint {
            bucket: u32::try_from(i).unwrap_or(u32::MAX),
            x: round3(i as f64 / x_denominator * config.length_units),
            height: round3((height / event_count).min(1.0) * config.max_height),
            top_topics: rank_topics(per_topic),
        })
        .collect();

    debug!(
        event_count = sorted.len(),
        bucket_count,
        topic_count = topics.len(),
        "Scene built"
    );

    Ok(Scene {
        metadata: SceneMetadata {
            start,
            end,
            bucket_minutes: config.bucket_minutes,
            topics: topics
                .iter()
                .enumerate()
                .map(|(lane, topic)| TopicLane {
                    topic: (*topic).to_owned(),
                    lane: u32::try_from(lane).unwrap_or(u32::MAX),
                    embedding: pseudo_embedding(topic),
                })
                .collect(),
        },
        terrain_profile,
        queries,
    })
}

/// Top [`TOP_TOPICS`] topics of one bucket: descending contribution, ties
/// broken by first appearance within the bucket.
fn rank_topics(per_topic: &BTreeMap<String, TopicTally>) -> Vec<String> {
    let mut ranked: Vec<(&String, &TopicTally)> = per_topic.iter().collect();
    ranked.sort_by(|a, b| {
        b.1.contribution
            .total_cmp(&a.1.contribution)
            .then_with(|| a.1.first_seen.cmp(&b.1.first_seen))
    });
    ranked
        .into_iter()
        .take(TOP_TOPICS)
        .map(|(topic, _)| topic.clone())
        .collect()
}
