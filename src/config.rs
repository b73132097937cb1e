//! Merge configuration.

use std::path::PathBuf;

use crate::align::MarkerNames;
use crate::trace::constants::{DEFAULT_LAYER_MARKER, DEFAULT_VIEWER_MARKER};

/// Configuration for one merge run.
/// This struct holds everything the pipeline needs, separated from the CLI
/// parsing concerns. Tool binaries are not part of it; they are supplied as a
/// [`TraceTools`](crate::tools::TraceTools) implementation.
#[derive(Clone, Debug)]
pub struct MergeConfig {
    /// Verbosity level (0 = warn, 1 = info, 2 = debug, 3+ = trace)
    pub verbosity: u8,
    /// Trace captured by the viewer process
    pub viewer_trace: PathBuf,
    /// Trace captured by the layer process
    pub layer_trace: PathBuf,
    /// Native merged trace produced by the import tool
    pub output_trace: PathBuf,
    /// Intermediate interchange document
    pub chrome_out: PathBuf,
    /// Run report
    pub summary_out: PathBuf,
    /// Frame marker plot in the viewer trace
    pub viewer_marker: String,
    /// Frame marker plot in the layer trace
    pub layer_marker: String,
    /// Skip marker alignment and merge on raw timestamps
    pub disable_marker_alignment: bool,
}

impl MergeConfig {
    /// Marker names to align on, or `None` when alignment is disabled.
    pub fn marker_names(&self) -> Option<MarkerNames<'_>> {
        if self.disable_marker_alignment {
            return None;
        }
        Some(MarkerNames {
            viewer: &self.viewer_marker,
            layer: &self.layer_marker,
        })
    }

    /// Tracing filter directive matching the verbosity level.
    pub fn log_level(&self) -> &'static str {
        match self.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

impl Default for MergeConfig {
    fn default() -> Self {
        MergeConfig {
            verbosity: 0,
            viewer_trace: PathBuf::from("viewer.tracy"),
            layer_trace: PathBuf::from("layer.tracy"),
            output_trace: PathBuf::from("merged.tracy"),
            chrome_out: PathBuf::from("merged.json"),
            summary_out: PathBuf::from("merge_summary.json"),
            viewer_marker: DEFAULT_VIEWER_MARKER.to_string(),
            layer_marker: DEFAULT_LAYER_MARKER.to_string(),
            disable_marker_alignment: false,
        }
    }
}
