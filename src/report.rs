//! Run report.
//!
//! The report is threaded through every phase of a merge and written exactly
//! once at the end, whether the merge succeeded or not. Counts that were never
//! reached stay at zero.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::trace::DecodedTrace;

/// How the layer trace was placed on the viewer's clock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentMethod {
    /// A shared frame marker was found in both traces.
    FrameMarker,
    /// Raw timestamps were used without synchronization.
    #[default]
    RelativeTime,
}

/// Alignment outcome recorded in the report.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AlignmentSummary {
    pub method: AlignmentMethod,
    pub frame_number: Option<i64>,
    pub layer_shift_ns: i64,
    pub normalization_shift_ns: i64,
}

/// Event counts at the point the run ended.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TraceCounts {
    #[serde(rename = "viewer_zones")]
    pub viewer_spans: usize,
    #[serde(rename = "viewer_plots")]
    pub viewer_samples: usize,
    #[serde(rename = "layer_zones")]
    pub layer_spans: usize,
    #[serde(rename = "layer_plots")]
    pub layer_samples: usize,
    pub viewer_threads: usize,
    pub layer_threads: usize,
    pub merged_events: usize,
}

/// Machine-readable summary of one merge.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub success: bool,
    pub warnings: Vec<String>,
    pub alignment: AlignmentSummary,
    pub counts: TraceCounts,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a warning to the report.
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        let warning = warning.into();
        tracing::warn!("{}", warning);
        self.warnings.push(warning);
    }

    /// Returns true if there are any warnings.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn record_viewer_trace(&mut self, trace: &DecodedTrace) {
        self.counts.viewer_spans = trace.durations.len();
        self.counts.viewer_samples = trace.samples.len();
    }

    pub fn record_layer_trace(&mut self, trace: &DecodedTrace) {
        self.counts.layer_spans = trace.durations.len();
        self.counts.layer_samples = trace.samples.len();
    }

    /// Serialize the report as indented JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize run report")
    }

    /// Write the report to `path`, creating parent directories as needed.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        fs::write(path, self.to_json()?)
            .with_context(|| format!("Failed to write run report: {}", path.display()))?;
        Ok(())
    }
}
