//! Alignment of the layer trace onto the viewer trace's clock.
//!
//! Both traces are captured with independent clock origins. When both carry a
//! frame marker plot with a common frame number, the difference between the two
//! first-occurrence timestamps of that frame is the shift applied to every
//! layer timestamp. When no such frame exists the raw timestamps are used as is.

use crate::markers::MarkerIndex;
use crate::report::{AlignmentMethod, RunReport};
use crate::trace::DecodedTrace;

pub const ALIGNMENT_DISABLED_WARNING: &str =
    "Marker alignment disabled; using relative-time fallback.";
pub const NO_COMMON_FRAME_WARNING: &str =
    "No common frame marker values found across traces; using relative-time fallback.";

/// Marker plot names used to find a shared frame.
#[derive(Clone, Debug)]
pub struct MarkerNames<'a> {
    pub viewer: &'a str,
    pub layer: &'a str,
}

/// Result of alignment: how the layer is shifted onto the viewer's clock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Alignment {
    pub method: AlignmentMethod,
    pub frame: Option<i64>,
    pub layer_shift_ns: i64,
}

impl Alignment {
    /// Unsynchronized merge on raw timestamps.
    pub fn relative_time() -> Self {
        Self::default()
    }

    /// Alignment on the smallest frame number present in both indices.
    ///
    /// Returns `None` if the indices share no frame.
    pub fn from_markers(viewer: &MarkerIndex, layer: &MarkerIndex) -> Option<Self> {
        let frame = viewer.smallest_shared_frame(layer)?;
        let viewer_ts = viewer.timestamp(frame)?;
        let layer_ts = layer.timestamp(frame)?;
        Some(Self {
            method: AlignmentMethod::FrameMarker,
            frame: Some(frame),
            layer_shift_ns: viewer_ts.saturating_sub(layer_ts),
        })
    }
}

/// Resolve alignment for a pair of decoded traces and record it in the report.
///
/// `markers` is `None` when alignment was disabled by the caller; the resolver
/// then skips marker indexing entirely and falls back to relative time.
pub fn resolve_alignment(
    viewer: &DecodedTrace,
    layer: &DecodedTrace,
    markers: Option<&MarkerNames<'_>>,
    report: &mut RunReport,
) -> Alignment {
    let alignment = match markers {
        None => {
            report.add_warning(ALIGNMENT_DISABLED_WARNING);
            Alignment::relative_time()
        }
        Some(names) => {
            let viewer_index = MarkerIndex::build(&viewer.samples, names.viewer);
            let layer_index = MarkerIndex::build(&layer.samples, names.layer);
            tracing::debug!(
                "Indexed {} viewer frames ({}), {} layer frames ({})",
                viewer_index.len(),
                names.viewer,
                layer_index.len(),
                names.layer
            );

            match Alignment::from_markers(&viewer_index, &layer_index) {
                Some(alignment) => alignment,
                None => {
                    report.add_warning(NO_COMMON_FRAME_WARNING);
                    Alignment::relative_time()
                }
            }
        }
    };

    if let Some(frame) = alignment.frame {
        tracing::info!(
            "Aligned on frame {}: layer shift {} ns",
            frame,
            alignment.layer_shift_ns
        );
    }

    report.alignment.method = alignment.method;
    report.alignment.frame_number = alignment.frame;
    report.alignment.layer_shift_ns = alignment.layer_shift_ns;
    alignment
}
