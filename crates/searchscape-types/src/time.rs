//! Event timestamps as they appear in the search log.
//!
//! A log row may carry a UTC offset or not. [`EventTime`] keeps that
//! distinction so the scene echoes each timestamp back in the shape it
//! was written: `2024-05-01T08:05:00` stays naive, while
//! `2024-05-01T08:05:00Z` becomes `2024-05-01T08:05:00+00:00`.
//!
//! For ordering and arithmetic a naive timestamp is read as UTC.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeDelta, Timelike, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Seconds-resolution ISO 8601 layout without an offset.
const ISO_SECONDS: &str = "%Y-%m-%dT%H:%M:%S";
/// Microsecond-resolution ISO 8601 layout without an offset.
const ISO_MICROS: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// A log timestamp, with or without a UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTime {
    /// Wall-clock time with no offset information.
    Naive(NaiveDateTime),
    /// Time with an explicit UTC offset.
    Zoned(DateTime<FixedOffset>),
}

/// Error returned when a string is not a recognised ISO 8601 timestamp.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid ISO 8601 timestamp `{0}`")]
pub struct ParseEventTimeError(String);

impl EventTime {
    /// Parse an ISO 8601 timestamp.
    ///
    /// Accepts a date-time with an offset (`Z` or `+HH:MM`), a naive
    /// date-time (`T` or space separator, optional minutes-only or
    /// fractional seconds), or a bare date, which means midnight.
    pub fn parse(text: &str) -> Option<Self> {
        if let Ok(zoned) = DateTime::parse_from_rfc3339(text) {
            return Some(Self::Zoned(zoned));
        }
        for format in [
            "%Y-%m-%dT%H:%M:%S%.f%:z",
            "%Y-%m-%d %H:%M:%S%.f%:z",
            "%Y-%m-%dT%H:%M%:z",
            "%Y-%m-%d %H:%M%:z",
        ] {
            if let Ok(zoned) = DateTime::parse_from_str(text, format) {
                return Some(Self::Zoned(zoned));
            }
        }
        for format in [
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%dT%H:%M",
            "%Y-%m-%d %H:%M",
        ] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
                return Some(Self::Naive(naive));
            }
        }
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(Self::Naive)
    }

    /// The instant this timestamp denotes, reading naive values as UTC.
    #[must_use]
    pub fn to_utc(&self) -> DateTime<Utc> {
        match self {
            Self::Naive(naive) => naive.and_utc(),
            Self::Zoned(zoned) => zoned.to_utc(),
        }
    }

    /// Shift by `delta`, keeping the offset (or its absence).
    ///
    /// Returns `None` if the result is out of range.
    #[must_use]
    pub fn checked_add(self, delta: TimeDelta) -> Option<Self> {
        match self {
            Self::Naive(naive) => naive.checked_add_signed(delta).map(Self::Naive),
            Self::Zoned(zoned) => zoned.checked_add_signed(delta).map(Self::Zoned),
        }
    }
}

impl fmt::Display for EventTime {
    /// ISO 8601 with seconds, plus microseconds when non-zero, plus the
    /// `+HH:MM` offset for zoned values.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (naive, offset) = match self {
            Self::Naive(naive) => (*naive, None),
            Self::Zoned(zoned) => (zoned.naive_local(), Some(zoned.offset())),
        };
        let layout = if naive.nanosecond() < 1_000 {
            ISO_SECONDS
        } else {
            ISO_MICROS
        };
        write!(f, "{}", naive.format(layout))?;
        if let Some(offset) = offset {
            write!(f, "{offset}")?;
        }
        Ok(())
    }
}

impl FromStr for EventTime {
    type Err = ParseEventTimeError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text).ok_or_else(|| ParseEventTimeError(text.to_owned()))
    }
}

impl From<NaiveDateTime> for EventTime {
    fn from(naive: NaiveDateTime) -> Self {
        Self::Naive(naive)
    }
}

impl From<DateTime<FixedOffset>> for EventTime {
    fn from(zoned: DateTime<FixedOffset>) -> Self {
        Self::Zoned(zoned)
    }
}

impl Serialize for EventTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EventTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(D::Error::custom)
    }
}
