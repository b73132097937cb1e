//! Trace data model structs produced by the row decoder.
//!
//! Both inputs of a merge are decoded into the same shapes. Timestamps are
//! nanoseconds on the originating trace's own clock.

/// Duration event record - a named interval of work on a thread.
///
/// # Fields
/// - `name`: Zone name (never empty)
/// - `start_time_ns`: Start timestamp in nanoseconds (trace clock)
/// - `duration_ns`: Duration in nanoseconds, truncated toward zero
/// - `thread_id`: Thread identifier reported by the export tool (0 if unknown)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DurationEvent {
    pub name: String,
    pub start_time_ns: i64,
    pub duration_ns: i64,
    pub thread_id: i64,
}

/// Sample event record - an instantaneous scalar measurement.
///
/// Note: Cannot derive `Eq` because `value` is `f64`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampleEvent {
    pub name: String,
    pub time_ns: i64,
    pub value: f64,
    pub thread_id: i64,
}

/// All events decoded from one trace, in export order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecodedTrace {
    pub durations: Vec<DurationEvent>,
    pub samples: Vec<SampleEvent>,
}

impl DecodedTrace {
    /// Returns true if no events were decoded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.durations.is_empty() && self.samples.is_empty()
    }
}
