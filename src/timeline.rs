//! Tool-agnostic timeline events and the merged interchange document.
//!
//! Decoded traces are converted into [`TimelineEvent`]s with microsecond
//! timestamps, the unit of the chrome trace interchange format. The viewer and
//! layer timelines are then merged into one non-negative, chronologically
//! ordered sequence and written as `{"traceEvents": [...]}`.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Serialize, Serializer};

use crate::trace::constants::NS_PER_US;
use crate::trace::DecodedTrace;

/// One event of the merged timeline.
#[derive(Clone, Debug, PartialEq)]
pub enum TimelineEvent {
    /// A complete span with known duration.
    Span {
        name: String,
        process_id: u32,
        thread_id: i64,
        start_time_us: f64,
        duration_us: f64,
    },
    /// A counter sample.
    Sample {
        name: String,
        process_id: u32,
        thread_id: i64,
        time_us: f64,
        value: f64,
    },
    /// Thread naming metadata. Carries no timestamp.
    ThreadMeta {
        process_id: u32,
        thread_id: i64,
        display_name: String,
    },
}

impl TimelineEvent {
    /// Timestamp in microseconds, `None` for metadata.
    pub fn time_us(&self) -> Option<f64> {
        match self {
            TimelineEvent::Span { start_time_us, .. } => Some(*start_time_us),
            TimelineEvent::Sample { time_us, .. } => Some(*time_us),
            TimelineEvent::ThreadMeta { .. } => None,
        }
    }

    fn shift_us(&mut self, delta_us: f64) {
        match self {
            TimelineEvent::Span { start_time_us, .. } => *start_time_us += delta_us,
            TimelineEvent::Sample { time_us, .. } => *time_us += delta_us,
            TimelineEvent::ThreadMeta { .. } => {}
        }
    }

    fn sort_key(&self) -> f64 {
        self.time_us().unwrap_or(0.0)
    }

    pub fn process_id(&self) -> u32 {
        match self {
            TimelineEvent::Span { process_id, .. }
            | TimelineEvent::Sample { process_id, .. }
            | TimelineEvent::ThreadMeta { process_id, .. } => *process_id,
        }
    }
}

#[derive(Serialize)]
enum Phase {
    #[serde(rename = "X")]
    Complete,
    #[serde(rename = "C")]
    Counter,
    #[serde(rename = "M")]
    Metadata,
}

#[derive(Serialize)]
#[serde(untagged)]
enum ChromeArgs<'a> {
    Value { value: f64 },
    Name { name: &'a str },
}

/// Borrowed chrome trace view of a [`TimelineEvent`].
#[derive(Serialize)]
struct ChromeEvent<'a> {
    name: &'a str,
    ph: Phase,
    pid: u32,
    tid: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    ts: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dur: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    args: Option<ChromeArgs<'a>>,
}

impl<'a> From<&'a TimelineEvent> for ChromeEvent<'a> {
    fn from(event: &'a TimelineEvent) -> Self {
        match event {
            TimelineEvent::Span {
                name,
                process_id,
                thread_id,
                start_time_us,
                duration_us,
            } => ChromeEvent {
                name,
                ph: Phase::Complete,
                pid: *process_id,
                tid: *thread_id,
                ts: Some(*start_time_us),
                dur: Some(*duration_us),
                args: None,
            },
            TimelineEvent::Sample {
                name,
                process_id,
                thread_id,
                time_us,
                value,
            } => ChromeEvent {
                name,
                ph: Phase::Counter,
                pid: *process_id,
                tid: *thread_id,
                ts: Some(*time_us),
                dur: None,
                args: Some(ChromeArgs::Value { value: *value }),
            },
            TimelineEvent::ThreadMeta {
                process_id,
                thread_id,
                display_name,
            } => ChromeEvent {
                name: "thread_name",
                ph: Phase::Metadata,
                pid: *process_id,
                tid: *thread_id,
                ts: None,
                dur: None,
                args: Some(ChromeArgs::Name { name: display_name }),
            },
        }
    }
}

impl Serialize for TimelineEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        ChromeEvent::from(self).serialize(serializer)
    }
}

/// Timeline of one trace plus the threads it touched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TraceTimeline {
    pub events: Vec<TimelineEvent>,
    pub thread_ids: BTreeSet<i64>,
}

fn ns_to_us(ns: i64) -> f64 {
    ns as f64 / NS_PER_US
}

/// Convert a decoded trace into timeline events.
///
/// `shift_ns` is added to every timestamp. Spans come first, then samples, then
/// one thread-name metadata event per distinct thread id in ascending order,
/// named `<role>-thread-<id>`.
pub fn build_timeline(
    trace: &DecodedTrace,
    process_id: u32,
    shift_ns: i64,
    role: &str,
) -> TraceTimeline {
    let mut timeline = TraceTimeline::default();
    timeline
        .events
        .reserve(trace.durations.len() + trace.samples.len());

    for zone in &trace.durations {
        timeline.events.push(TimelineEvent::Span {
            name: zone.name.clone(),
            process_id,
            thread_id: zone.thread_id,
            start_time_us: ns_to_us(zone.start_time_ns.saturating_add(shift_ns)),
            duration_us: ns_to_us(zone.duration_ns),
        });
        timeline.thread_ids.insert(zone.thread_id);
    }

    for plot in &trace.samples {
        timeline.events.push(TimelineEvent::Sample {
            name: plot.name.clone(),
            process_id,
            thread_id: plot.thread_id,
            time_us: ns_to_us(plot.time_ns.saturating_add(shift_ns)),
            value: plot.value,
        });
        timeline.thread_ids.insert(plot.thread_id);
    }

    for &thread_id in &timeline.thread_ids {
        timeline.events.push(TimelineEvent::ThreadMeta {
            process_id,
            thread_id,
            display_name: format!("{role}-thread-{thread_id}"),
        });
    }

    timeline
}

/// Merged, normalized and ordered timeline of both traces.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MergedTimeline {
    pub events: Vec<TimelineEvent>,
    /// Nanoseconds added to every timed event so none is negative.
    pub normalization_shift_ns: i64,
}

/// Merge the viewer and layer timelines.
///
/// If the earliest timed event is negative, every timed event is moved later
/// by the same amount so the earliest lands on zero. Events are then stably
/// sorted by time with metadata treated as time zero, so viewer events precede
/// layer events at equal timestamps.
pub fn merge_timelines(viewer: Vec<TimelineEvent>, layer: Vec<TimelineEvent>) -> MergedTimeline {
    let mut events = viewer;
    events.extend(layer);

    let min_us = events
        .iter()
        .filter_map(TimelineEvent::time_us)
        .min_by(|a, b| a.total_cmp(b));

    let mut normalization_shift_ns = 0;
    if let Some(min_us) = min_us.filter(|m| *m < 0.0) {
        normalization_shift_ns = (-min_us * NS_PER_US).round() as i64;
        let delta_us = ns_to_us(normalization_shift_ns);
        tracing::debug!(
            "Earliest event at {} us, shifting timeline by {} ns",
            min_us,
            normalization_shift_ns
        );
        for event in &mut events {
            event.shift_us(delta_us);
        }
    }

    events.sort_by(|a, b| {
        a.sort_key()
            .partial_cmp(&b.sort_key())
            .unwrap_or(Ordering::Equal)
    });

    MergedTimeline {
        events,
        normalization_shift_ns,
    }
}

/// The chrome trace interchange document.
#[derive(Serialize)]
pub struct InterchangeDocument<'a> {
    #[serde(rename = "traceEvents")]
    pub trace_events: &'a [TimelineEvent],
}

/// Write events as an indented interchange document, creating parent
/// directories as needed.
pub fn write_interchange(path: &Path, events: &[TimelineEvent]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let document = InterchangeDocument {
        trace_events: events,
    };
    let json =
        serde_json::to_string_pretty(&document).context("Failed to serialize timeline events")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write interchange document: {}", path.display()))?;
    Ok(())
}
