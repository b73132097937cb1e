//! Shared constants for trace processing.
//!
//! Column names match the CSV emitted by the trace export tool; process ids
//! and marker names are the values the merged timeline is built around.

/// Column holding the event name.
pub const COLUMN_NAME: &str = "name";

/// Column holding the event timestamp in nanoseconds since capture start.
pub const COLUMN_TIMESTAMP: &str = "ns_since_start";

/// Column holding a zone's execution time in nanoseconds. Empty for plots.
pub const COLUMN_DURATION: &str = "exec_time_ns";

/// Column holding a plot's value. Empty for zones.
pub const COLUMN_VALUE: &str = "value";

/// Column holding the thread identifier.
pub const COLUMN_THREAD: &str = "thread";

/// Process id assigned to the viewer trace in the merged timeline.
pub const VIEWER_PID: u32 = 1;

/// Process id assigned to the layer trace in the merged timeline.
pub const LAYER_PID: u32 = 2;

/// Role label used for viewer thread names.
pub const VIEWER_ROLE: &str = "viewer";

/// Role label used for layer thread names.
pub const LAYER_ROLE: &str = "layer";

/// Plot the viewer stamps its source frame counter into.
pub const DEFAULT_VIEWER_MARKER: &str = "goggles_source_frame";

/// Plot the layer stamps its frame counter into.
pub const DEFAULT_LAYER_MARKER: &str = "goggles_layer_frame";

/// Nanoseconds per microsecond, the interchange format's time unit.
pub const NS_PER_US: f64 = 1000.0;
