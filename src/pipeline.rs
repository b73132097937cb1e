//! The merge pipeline.
//!
//! Phases run strictly in order, each over complete data from the previous one:
//!
//! 1. validate both input traces exist and are non-empty
//! 2. export and decode both traces
//! 3. index frame markers and resolve the layer shift
//! 4. build one timeline per trace
//! 5. merge, normalize and sort
//! 6. write the interchange document and hand it to the import tool
//!
//! Any terminal failure stops the run. The run report is written exactly once
//! afterwards on every path, with whatever was computed up to that point.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::align::resolve_alignment;
use crate::config::MergeConfig;
use crate::decode::decode_rows;
use crate::report::RunReport;
use crate::timeline::{build_timeline, merge_timelines, write_interchange};
use crate::tools::{ToolError, ToolKind, TraceTools};
use crate::trace::constants::{LAYER_PID, LAYER_ROLE, VIEWER_PID, VIEWER_ROLE};
use crate::trace::DecodedTrace;

/// Terminal failure of a merge run.
#[derive(Debug)]
pub enum MergeError {
    /// An input trace is missing or empty.
    InvalidInput { path: PathBuf },
    /// An external tool could not be run or failed.
    Tool(ToolError),
    /// The interchange document could not be written.
    Output(anyhow::Error),
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeError::InvalidInput { path } => {
                write!(f, "Missing or empty trace file: {}", path.display())
            }
            MergeError::Tool(ToolError::Failed {
                tool: ToolKind::Export,
                ..
            }) => write!(f, "Trace export tool failed while parsing trace files."),
            MergeError::Tool(ToolError::Failed {
                tool: ToolKind::Import,
                ..
            }) => write!(
                f,
                "Failed to import merged interchange trace into native output."
            ),
            MergeError::Tool(err) => write!(f, "{err}"),
            MergeError::Output(err) => write!(f, "Failed to write interchange document: {err:#}"),
        }
    }
}

impl std::error::Error for MergeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MergeError::Tool(err) => Some(err),
            MergeError::Output(err) => {
                let source: &(dyn std::error::Error + 'static) = err.as_ref();
                Some(source)
            }
            MergeError::InvalidInput { .. } => None,
        }
    }
}

impl From<ToolError> for MergeError {
    fn from(err: ToolError) -> Self {
        MergeError::Tool(err)
    }
}

fn validate_trace_file(path: &Path) -> Result<(), MergeError> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(()),
        _ => Err(MergeError::InvalidInput {
            path: path.to_path_buf(),
        }),
    }
}

fn extract_trace<T: TraceTools + ?Sized>(
    tools: &T,
    path: &Path,
) -> Result<DecodedTrace, MergeError> {
    let rows = tools.extract(path)?;
    let trace = decode_rows(&rows);
    tracing::info!(
        "Decoded {} zones and {} plots from {} ({} rows)",
        trace.durations.len(),
        trace.samples.len(),
        path.display(),
        rows.len()
    );
    Ok(trace)
}

/// Run every phase, recording progress into `report`.
fn merge<T: TraceTools + ?Sized>(
    config: &MergeConfig,
    tools: &T,
    report: &mut RunReport,
) -> Result<(), MergeError> {
    validate_trace_file(&config.viewer_trace)?;
    validate_trace_file(&config.layer_trace)?;

    let viewer = extract_trace(tools, &config.viewer_trace)?;
    report.record_viewer_trace(&viewer);
    let layer = extract_trace(tools, &config.layer_trace)?;
    report.record_layer_trace(&layer);

    let alignment = resolve_alignment(&viewer, &layer, config.marker_names().as_ref(), report);

    let viewer_timeline = build_timeline(&viewer, VIEWER_PID, 0, VIEWER_ROLE);
    let layer_timeline = build_timeline(&layer, LAYER_PID, alignment.layer_shift_ns, LAYER_ROLE);
    report.counts.viewer_threads = viewer_timeline.thread_ids.len();
    report.counts.layer_threads = layer_timeline.thread_ids.len();

    let merged = merge_timelines(viewer_timeline.events, layer_timeline.events);
    report.alignment.normalization_shift_ns = merged.normalization_shift_ns;
    report.counts.merged_events = merged.events.len();
    tracing::info!(
        "Merged {} events (normalization shift {} ns)",
        merged.events.len(),
        merged.normalization_shift_ns
    );

    write_interchange(&config.chrome_out, &merged.events).map_err(MergeError::Output)?;
    tools.reencode(&config.chrome_out, &config.output_trace)?;
    tracing::info!("Wrote merged trace to {}", config.output_trace.display());
    Ok(())
}

/// Merge the configured traces and write the run report.
///
/// Terminal failures are printed to stderr, preceded by any output captured
/// from a failing tool, and recorded as a warning. The returned report is the
/// one that was persisted; `success` is cleared if persisting it failed.
pub fn run_merge<T: TraceTools + ?Sized>(config: &MergeConfig, tools: &T) -> RunReport {
    let mut report = RunReport::new();

    match merge(config, tools, &mut report) {
        Ok(()) => report.success = true,
        Err(err) => {
            if let MergeError::Tool(ToolError::Failed { stdout, stderr, .. }) = &err {
                eprint!("{stdout}");
                eprint!("{stderr}");
            }
            let message = err.to_string();
            eprintln!("Error: {message}");
            report.warnings.push(message);
        }
    }

    if let Err(err) = report.write(&config.summary_out) {
        eprintln!("Error: {err:#}");
        report.success = false;
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_trace_file() {
        let dir = TempDir::new().unwrap();
        let empty = dir.path().join("empty.tracy");
        let full = dir.path().join("full.tracy");
        fs::write(&empty, b"").unwrap();
        fs::write(&full, b"trace").unwrap();

        assert!(validate_trace_file(&full).is_ok());
        assert!(validate_trace_file(&empty).is_err());
        assert!(validate_trace_file(&dir.path().join("missing.tracy")).is_err());
        assert!(validate_trace_file(dir.path()).is_err());
    }

    #[test]
    fn test_error_messages() {
        let err = MergeError::InvalidInput {
            path: PathBuf::from("/traces/viewer.tracy"),
        };
        assert_eq!(
            err.to_string(),
            "Missing or empty trace file: /traces/viewer.tracy"
        );

        let err = MergeError::from(ToolError::NotFound {
            tool: ToolKind::Export,
            path: PathBuf::from("/bin/csvexport"),
        });
        assert_eq!(err.to_string(), "Trace export tool not found: /bin/csvexport");

        let err = MergeError::from(ToolError::Failed {
            tool: ToolKind::Export,
            status: Some(1),
            stdout: String::new(),
            stderr: String::new(),
        });
        assert_eq!(
            err.to_string(),
            "Trace export tool failed while parsing trace files."
        );

        let err = MergeError::from(ToolError::NotFound {
            tool: ToolKind::Import,
            path: PathBuf::from("/bin/import-chrome"),
        });
        assert_eq!(
            err.to_string(),
            "Trace import tool not found: /bin/import-chrome"
        );

        let err = MergeError::from(ToolError::Failed {
            tool: ToolKind::Import,
            status: None,
            stdout: String::new(),
            stderr: String::new(),
        });
        assert_eq!(
            err.to_string(),
            "Failed to import merged interchange trace into native output."
        );
    }
}
