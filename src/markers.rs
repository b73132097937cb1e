//! Frame marker indexing.
//!
//! An instrumented process periodically stamps its current frame counter into
//! a plot. The same frame number observed in both traces gives a shared point
//! in time, which is what alignment is built on.

use std::collections::BTreeMap;

use crate::trace::SampleEvent;

/// Map from frame number to the timestamp of its first occurrence.
///
/// Keys are ordered so that shared-frame lookups are deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MarkerIndex {
    first_seen: BTreeMap<i64, i64>,
}

/// Round a marker value to a frame number, ties to even.
///
/// Returns `None` for values that cannot name a frame.
pub fn frame_number(value: f64) -> Option<i64> {
    let rounded = value.round_ties_even();
    if !rounded.is_finite() || rounded < i64::MIN as f64 || rounded >= i64::MAX as f64 {
        return None;
    }
    Some(rounded as i64)
}

impl MarkerIndex {
    /// Index every sample named `marker_name`. The first timestamp seen for a
    /// frame number wins; later repeats are ignored.
    pub fn build(samples: &[SampleEvent], marker_name: &str) -> Self {
        let mut first_seen = BTreeMap::new();
        for sample in samples.iter().filter(|s| s.name == marker_name) {
            let Some(frame) = frame_number(sample.value) else {
                continue;
            };
            first_seen.entry(frame).or_insert(sample.time_ns);
        }
        Self { first_seen }
    }

    /// Timestamp of the first occurrence of `frame`.
    pub fn timestamp(&self, frame: i64) -> Option<i64> {
        self.first_seen.get(&frame).copied()
    }

    pub fn len(&self) -> usize {
        self.first_seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first_seen.is_empty()
    }

    /// Frame numbers in ascending order.
    pub fn frames(&self) -> impl Iterator<Item = i64> + '_ {
        self.first_seen.keys().copied()
    }

    /// Smallest frame number present in both indices.
    pub fn smallest_shared_frame(&self, other: &MarkerIndex) -> Option<i64> {
        self.frames().find(|frame| other.first_seen.contains_key(frame))
    }
}
