//! Temporal bucketing and bucket-height smoothing.
//!
//! Events are assigned to fixed-width time buckets measured from the
//! earliest event. Bucket heights are later smoothed with a centered
//! moving average whose window shrinks at the edges.

use searchscape_types::EventTime;

const MICROS_PER_SECOND: f64 = 1_000_000.0;
const SECONDS_PER_MINUTE: f64 = 60.0;

/// Fractional minutes elapsed from `start` to `at`. Naive timestamps
/// count as UTC.
///
/// Elapsed seconds are rounded to `f64` first, then divided by 60.
/// Spans too large for microseconds fall back to millisecond precision.
#[allow(clippy::cast_precision_loss)] // sub-microsecond loss is irrelevant here
pub fn minutes_between(start: EventTime, at: EventTime) -> f64 {
    let delta = at.to_utc().signed_duration_since(start.to_utc());
    let seconds = delta.num_microseconds().map_or_else(
        || delta.num_milliseconds() as f64 / 1000.0,
        |micros| micros as f64 / MICROS_PER_SECOND,
    );
    seconds / SECONDS_PER_MINUTE
}

/// Zero-based bucket index of `at`, relative to `start`.
///
/// Computes `floor(minutes_between(start, at) / bucket_minutes)`. Callers
/// clamp the result to the bucket count to absorb floating-point drift at
/// the final boundary. A zero `bucket_minutes` or a timestamp before
/// `start` yields bucket 0.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // floored, non-negative, clamped by callers
pub fn bucket_index(at: EventTime, start: EventTime, bucket_minutes: u32) -> usize {
    if bucket_minutes == 0 {
        return 0;
    }
    let index = (minutes_between(start, at) / f64::from(bucket_minutes)).floor();
    if index.is_finite() && index > 0.0 {
        index as usize
    } else {
        0
    }
}

/// Centered moving average over `values`.
///
/// For index `i` the window is `[i - window/2, i + window/2 + 1)`, clipped
/// to the slice, with integer-floor halving. Even windows are therefore
/// asymmetric. A window of 0 or 1 returns the input unchanged.
#[allow(clippy::cast_precision_loss, clippy::arithmetic_side_effects)]
pub fn smooth(values: &[f64], window: usize) -> Vec<f64> {
    if window <= 1 {
        return values.to_vec();
    }
    let half = window / 2;
    (0..values.len())
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = i.saturating_add(half).saturating_add(1).min(values.len());
            let slice = values.get(lo..hi).unwrap_or_default();
            if slice.is_empty() {
                0.0
            } else {
                slice.iter().sum::<f64>() / slice.len() as f64
            }
        })
        .collect()
}
