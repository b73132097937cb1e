//! Row decoding for trace export output.
//!
//! The export tool prints one CSV row per zone or plot occurrence. Rows are
//! loosely typed: any field may be missing, empty or garbage. Decoding never
//! fails as a whole; a row that cannot be interpreted is dropped and the rest
//! of the input is still decoded.
//!
//! Classification, per row:
//! - no parsable timestamp: dropped
//! - non-empty duration: a zone if the duration parses and the name is non-empty,
//!   otherwise dropped (never retried as a plot)
//! - non-empty value and non-empty name: a plot if the value parses, otherwise dropped
//! - anything else: dropped

use std::collections::HashMap;

use crate::trace::constants::{
    COLUMN_DURATION, COLUMN_NAME, COLUMN_THREAD, COLUMN_TIMESTAMP, COLUMN_VALUE,
};
use crate::trace::{DecodedTrace, DurationEvent, SampleEvent};

/// One tabular row keyed by column name. Absent columns are simply missing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Row {
    fields: HashMap<String, String>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter, mostly useful for constructing rows in tests.
    #[must_use]
    pub fn with(mut self, column: &str, value: &str) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: &str, value: &str) {
        self.fields.insert(column.to_string(), value.to_string());
    }

    /// Trimmed field text, empty when the column is absent.
    pub fn field(&self, column: &str) -> &str {
        self.fields.get(column).map_or("", |v| v.trim())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Parse CSV text with a header row into rows.
///
/// Short rows are accepted and leave trailing columns absent. Records the CSV
/// reader rejects outright are skipped.
pub fn rows_from_csv(text: &str) -> Vec<Row> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = match reader.headers() {
        Ok(headers) => headers.iter().map(|h| h.trim().to_string()).collect(),
        Err(err) => {
            tracing::debug!("Unreadable CSV header, no rows decoded: {}", err);
            return Vec::new();
        }
    };

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                tracing::debug!("Skipping unreadable CSV record: {}", err);
                continue;
            }
        };
        rows.push(
            headers
                .iter()
                .zip(record.iter())
                .map(|(h, v)| (h.as_str(), v))
                .collect(),
        );
    }
    rows
}

/// Parse a real number, rejecting NaN and infinities.
fn parse_real(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a real number and truncate it toward zero to integer nanoseconds.
fn parse_ns(text: &str) -> Option<i64> {
    // `as` saturates for finite values outside the i64 range.
    parse_real(text).map(|v| v.trunc() as i64)
}

fn parse_thread(text: &str) -> i64 {
    text.parse::<i64>().unwrap_or(0)
}

/// Decode rows into zones and plots, preserving row order within each kind.
pub fn decode_rows<'a, I>(rows: I) -> DecodedTrace
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut trace = DecodedTrace::default();

    for row in rows {
        let Some(timestamp_ns) = parse_ns(row.field(COLUMN_TIMESTAMP)) else {
            continue;
        };

        let name = row.field(COLUMN_NAME);
        let thread_id = parse_thread(row.field(COLUMN_THREAD));
        let duration_text = row.field(COLUMN_DURATION);
        let value_text = row.field(COLUMN_VALUE);

        if !duration_text.is_empty() {
            let Some(duration_ns) = parse_ns(duration_text) else {
                continue;
            };
            if !name.is_empty() {
                trace.durations.push(DurationEvent {
                    name: name.to_string(),
                    start_time_ns: timestamp_ns,
                    duration_ns,
                    thread_id,
                });
            }
            continue;
        }

        if !value_text.is_empty() && !name.is_empty() {
            let Some(value) = parse_real(value_text) else {
                continue;
            };
            trace.samples.push(SampleEvent {
                name: name.to_string(),
                time_ns: timestamp_ns,
                value,
                thread_id,
            });
        }
    }

    trace
}
