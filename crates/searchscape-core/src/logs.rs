//! Search log ingestion from CSV.
//!
//! The log is a headered CSV with one row per query:
//!
//! ```text
//! timestamp,query,intent_topic,session_id,clicks,dwell_seconds,result_count
//! 2024-05-01T09:02:00,cheap flights lisbon,travel,s-001,2,45.5,120
//! ```
//!
//! The `timestamp`, `query`, `intent_topic` and `session_id` columns must
//! be present. Any malformed row aborts the whole load. There is no
//! skip-and-continue.

use std::io::Read;
use std::path::Path;

use searchscape_types::{EventTime, QueryEvent};
use serde::Deserialize;
use tracing::debug;

/// Errors that can occur while reading a search log.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// The log file could not be opened.
    #[error("failed to open search log {path}: {source}")]
    Io {
        /// Path that failed to open.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The CSV structure itself is malformed.
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    /// The header row lacks a required column.
    #[error("missing required column `{column}`")]
    MissingColumn {
        /// Column name.
        column: &'static str,
    },

    /// A required value is empty.
    #[error("row {row}: missing required field `{field}`")]
    MissingField {
        /// 1-based data row number.
        row: usize,
        /// Column name.
        field: &'static str,
    },

    /// The timestamp could not be parsed.
    #[error("row {row}: invalid timestamp `{value}`")]
    InvalidTimestamp {
        /// 1-based data row number.
        row: usize,
        /// The raw value.
        value: String,
    },

    /// A numeric column holds a negative, non-finite or non-numeric value.
    #[error("row {row}: invalid {field} `{value}`")]
    InvalidNumber {
        /// 1-based data row number.
        row: usize,
        /// Column name.
        field: &'static str,
        /// The raw value.
        value: String,
    },
}

/// Columns that must appear in the header row.
const REQUIRED_COLUMNS: [&str; 4] = ["timestamp", "query", "intent_topic", "session_id"];

/// Raw CSV row before validation. Every column is optional here so the
/// error can name the missing one.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRow {
    timestamp: Option<String>,
    query: Option<String>,
    intent_topic: Option<String>,
    session_id: Option<String>,
    clicks: Option<String>,
    dwell_seconds: Option<String>,
    result_count: Option<String>,
}

/// Load every event from the CSV file at `path`.
///
/// # Errors
///
/// Returns [`LogError::Io`] if the file cannot be opened, or the first
/// row-level error encountered.
pub fn load_logs(path: &Path) -> Result<Vec<QueryEvent>, LogError> {
    let file = std::fs::File::open(path).map_err(|source| LogError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let events = read_logs(file)?;
    debug!(path = %path.display(), event_count = events.len(), "Search log loaded");
    Ok(events)
}

/// Read every event from a CSV stream.
///
/// # Errors
///
/// Returns [`LogError::MissingColumn`] if the header lacks a required
/// column, or the first row-level error encountered. A stream with no
/// header row at all holds no events.
pub fn read_logs<R: Read>(reader: R) -> Result<Vec<QueryEvent>, LogError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?;
    if headers.is_empty() {
        return Ok(Vec::new());
    }
    if let Some(column) = REQUIRED_COLUMNS
        .into_iter()
        .find(|column| !headers.iter().any(|header| header == *column))
    {
        return Err(LogError::MissingColumn { column });
    }

    csv_reader
        .deserialize::<RawRow>()
        .zip(1_usize..)
        .map(|(record, row)| parse_row(record?, row))
        .collect()
}

fn parse_row(raw: RawRow, row: usize) -> Result<QueryEvent, LogError> {
    let timestamp_text = required(raw.timestamp, row, "timestamp")?;
    let timestamp = EventTime::parse(&timestamp_text).ok_or(LogError::InvalidTimestamp {
        row,
        value: timestamp_text,
    })?;

    Ok(QueryEvent {
        timestamp,
        query: required(raw.query, row, "query")?,
        topic: required(raw.intent_topic, row, "intent_topic")?,
        session_id: raw.session_id.unwrap_or_default(),
        clicks: count(raw.clicks, row, "clicks")?,
        dwell_seconds: seconds(raw.dwell_seconds, row, "dwell_seconds")?,
        result_count: count(raw.result_count, row, "result_count")?,
    })
}

fn required(value: Option<String>, row: usize, field: &'static str) -> Result<String, LogError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(LogError::MissingField { row, field })
}

fn count(value: Option<String>, row: usize, field: &'static str) -> Result<u32, LogError> {
    match value.filter(|v| !v.is_empty()) {
        None => Ok(0),
        Some(text) => match text.parse::<u32>() {
            Ok(parsed) => Ok(parsed),
            Err(_) => Err(LogError::InvalidNumber { row, field, value: text }),
        },
    }
}

fn seconds(value: Option<String>, row: usize, field: &'static str) -> Result<f64, LogError> {
    match value.filter(|v| !v.is_empty()) {
        None => Ok(0.0),
        Some(text) => match text.parse::<f64>() {
            Ok(parsed) if parsed.is_finite() && parsed >= 0.0 => Ok(parsed),
            _ => Err(LogError::InvalidNumber { row, field, value: text }),
        },
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::float_cmp,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;

    const HEADER: &str =
        "timestamp,query,intent_topic,session_id,clicks,dwell_seconds,result_count\n";

    fn read(body: &str) -> Result<Vec<QueryEvent>, LogError> {
        read_logs(format!("{HEADER}{body}").as_bytes())
    }

    #[test]
    fn reads_well_formed_rows() {
        let events = read(
            "2024-05-01T09:02:00,cheap flights lisbon,travel,s-001,2,45.5,120\n\
             2024-05-01T09:10:00, hotel deals , travel , s-001 ,0,3,40\n",
        )
        .unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].query, "cheap flights lisbon");
        assert_eq!(events[0].clicks, 2);
        assert_eq!(events[0].dwell_seconds, 45.5);
        assert_eq!(events[0].result_count, 120);
        assert_eq!(events[1].query, "hotel deals");
        assert_eq!(events[1].topic, "travel");
        assert_eq!(events[1].session_id, "s-001");
    }

    #[test]
    fn empty_numeric_fields_default_to_zero() {
        let events = read("2024-05-01T09:02:00,q,t,s,,,\n").unwrap();
        assert_eq!(events[0].clicks, 0);
        assert_eq!(events[0].dwell_seconds, 0.0);
        assert_eq!(events[0].result_count, 0);
    }

    #[test]
    fn absent_numeric_columns_default_to_zero() {
        let events =
            read_logs("timestamp,query,intent_topic,session_id\n2024-05-01,q,t,s\n".as_bytes())
                .unwrap();
        assert_eq!(events[0].clicks, 0);
        assert_eq!(events[0].dwell_seconds, 0.0);
    }

    #[test]
    fn malformed_timestamp_is_fatal() {
        let result = read(
            "2024-05-01T09:02:00,q,t,s,1,1,1\n\
             yesterday,q,t,s,1,1,1\n",
        );
        match result {
            Err(LogError::InvalidTimestamp { row, value }) => {
                assert_eq!(row, 2);
                assert_eq!(value, "yesterday");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn malformed_number_is_fatal() {
        let result = read("2024-05-01T09:02:00,q,t,s,two,1,1\n");
        assert!(matches!(
            result,
            Err(LogError::InvalidNumber { field: "clicks", .. })
        ));
    }

    #[test]
    fn negative_dwell_is_rejected() {
        let result = read("2024-05-01T09:02:00,q,t,s,1,-4,1\n");
        assert!(matches!(
            result,
            Err(LogError::InvalidNumber { field: "dwell_seconds", .. })
        ));
    }

    #[test]
    fn empty_query_is_rejected() {
        let result = read("2024-05-01T09:02:00,,t,s,1,1,1\n");
        assert!(matches!(
            result,
            Err(LogError::MissingField { field: "query", .. })
        ));
    }

    #[test]
    fn header_only_log_is_empty() {
        assert!(read("").unwrap().is_empty());
    }

    #[test]
    fn naive_and_zoned_timestamps_are_kept_apart() {
        let events = read(
            "2024-05-01T08:05:00,q,t,s,1,1,1\n\
             2024-05-01T08:05:00Z,q,t,s,1,1,1\n\
             2024-05-01 08:05,q,t,s,1,1,1\n",
        )
        .unwrap();

        assert_eq!(events[0].timestamp.to_string(), "2024-05-01T08:05:00");
        assert_eq!(events[1].timestamp.to_string(), "2024-05-01T08:05:00+00:00");
        assert_eq!(events[2].timestamp, events[0].timestamp);
    }

    #[test]
    fn missing_session_column_is_rejected() {
        let result = read_logs("timestamp,query,intent_topic,clicks\n2024-05-01,q,t,1\n".as_bytes());
        assert!(matches!(
            result,
            Err(LogError::MissingColumn { column: "session_id" })
        ));
    }

    #[test]
    fn empty_session_value_is_allowed() {
        let events = read("2024-05-01T09:02:00,q,t,,1,1,1\n").unwrap();
        assert_eq!(events[0].session_id, "");
    }

    #[test]
    fn empty_stream_has_no_events() {
        assert!(read_logs("".as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = load_logs(Path::new("/nonexistent/queries.csv"));
        assert!(matches!(result, Err(LogError::Io { .. })));
    }
}
