//! tracemerge library - merge a viewer trace and a layer trace into one timeline.
//!
//! The two traces come from independent profiling sessions with independent
//! clock origins. Frame marker plots emitted by both processes give a shared
//! reference point; the layer trace is shifted onto the viewer's clock and both
//! are written as one chrome trace interchange document, which an external
//! import tool turns back into a native trace.
//!
//! # Modules
//!
//! - [`decode`] - CSV rows from the export tool into zones and plots
//! - [`markers`] - first-occurrence index of frame marker values
//! - [`align`] - layer shift from a shared frame, or relative-time fallback
//! - [`timeline`] - timeline events, merging and the interchange document
//! - [`report`] - machine-readable run report
//! - [`tools`] - external export/import tools behind a trait
//! - [`pipeline`] - the phase-separated merge run
//!
//! # Example
//!
//! ```no_run
//! use tracemerge::{run_merge, ExternalTools, MergeConfig};
//!
//! let config = MergeConfig::default();
//! let tools = ExternalTools::new("/usr/bin/tracy-csvexport", "/usr/bin/tracy-import-chrome");
//! let report = run_merge(&config, &tools);
//! assert!(report.success);
//! ```

pub mod align;
pub mod config;
pub mod decode;
pub mod markers;
pub mod pipeline;
pub mod report;
pub mod timeline;
pub mod tools;
pub mod trace;

// Re-export for convenience
pub use config::MergeConfig;
pub use pipeline::{run_merge, MergeError};
pub use report::{AlignmentMethod, RunReport};
pub use tools::{ExternalTools, ToolError, TraceTools};
