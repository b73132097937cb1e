//! Common test utilities for tracemerge integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracemerge::decode::{rows_from_csv, Row};
use tracemerge::tools::{ToolError, ToolKind};
use tracemerge::{MergeConfig, TraceTools};

/// Header row printed by the export tool.
pub const CSV_HEADER: &str = "name,src_file,src_line,ns_since_start,exec_time_ns,thread,value";

/// Build export CSV text from data lines.
pub fn csv(lines: &[&str]) -> String {
    let mut text = String::from(CSV_HEADER);
    text.push('\n');
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    text
}

/// A zone line for [`csv`].
pub fn zone(name: &str, ts_ns: i64, dur_ns: i64, thread: i64) -> String {
    format!("{name},main.cpp,1,{ts_ns},{dur_ns},{thread},")
}

/// A plot line for [`csv`].
pub fn plot(name: &str, ts_ns: i64, value: f64, thread: i64) -> String {
    format!("{name},,,{ts_ns},,{thread},{value}")
}

/// How the fake import tool behaves.
#[derive(Clone, Debug)]
pub enum ImportBehavior {
    /// Copy the interchange document to the output path.
    Copy,
    /// Exit with the given status and canned output.
    Fail(i32),
    /// Binary not found.
    Missing,
}

/// In-memory [`TraceTools`] double: fixed CSV per trace path.
#[derive(Clone, Debug)]
pub struct FakeTools {
    pub exports: HashMap<PathBuf, String>,
    pub export_status: Option<i32>,
    pub export_missing: bool,
    pub import: ImportBehavior,
}

impl FakeTools {
    pub fn new() -> Self {
        Self {
            exports: HashMap::new(),
            export_status: None,
            export_missing: false,
            import: ImportBehavior::Copy,
        }
    }

    pub fn with_export(mut self, trace_path: &Path, csv_text: String) -> Self {
        self.exports.insert(trace_path.to_path_buf(), csv_text);
        self
    }
}

impl TraceTools for FakeTools {
    fn extract(&self, trace_path: &Path) -> Result<Vec<Row>, ToolError> {
        if self.export_missing {
            return Err(ToolError::NotFound {
                tool: ToolKind::Export,
                path: PathBuf::from("/opt/tracy/csvexport"),
            });
        }
        if let Some(code) = self.export_status {
            return Err(ToolError::Failed {
                tool: ToolKind::Export,
                status: Some(code),
                stdout: "partial output\n".to_string(),
                stderr: "corrupt trace\n".to_string(),
            });
        }
        let text = self.exports.get(trace_path).map_or("", String::as_str);
        Ok(rows_from_csv(text))
    }

    fn reencode(&self, interchange_path: &Path, output_path: &Path) -> Result<(), ToolError> {
        match self.import {
            ImportBehavior::Copy => fs::copy(interchange_path, output_path)
                .map(|_| ())
                .map_err(|source| ToolError::Io {
                    tool: ToolKind::Import,
                    path: PathBuf::from("fake-import"),
                    source,
                }),
            ImportBehavior::Fail(code) => Err(ToolError::Failed {
                tool: ToolKind::Import,
                status: Some(code),
                stdout: String::new(),
                stderr: "import failed\n".to_string(),
            }),
            ImportBehavior::Missing => Err(ToolError::NotFound {
                tool: ToolKind::Import,
                path: PathBuf::from("/opt/tracy/import-chrome"),
            }),
        }
    }
}

/// Temp directory with two non-empty trace files and a config pointing into it.
pub struct MergeFixture {
    pub dir: TempDir,
    pub config: MergeConfig,
}

impl MergeFixture {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let config = MergeConfig {
            viewer_trace: dir.path().join("viewer.tracy"),
            layer_trace: dir.path().join("layer.tracy"),
            output_trace: dir.path().join("out/merged.tracy"),
            chrome_out: dir.path().join("out/merged.json"),
            summary_out: dir.path().join("reports/summary.json"),
            ..MergeConfig::default()
        };
        fs::write(&config.viewer_trace, b"viewer").expect("Failed to write viewer trace");
        fs::write(&config.layer_trace, b"layer").expect("Failed to write layer trace");
        Self { dir, config }
    }

    /// Fake tools exporting the given CSV for each trace.
    pub fn tools(&self, viewer_csv: String, layer_csv: String) -> FakeTools {
        FakeTools::new()
            .with_export(&self.config.viewer_trace, viewer_csv)
            .with_export(&self.config.layer_trace, layer_csv)
    }

    /// Parsed run report from disk.
    pub fn summary(&self) -> serde_json::Value {
        read_json(&self.config.summary_out)
    }

    /// Parsed interchange document from disk.
    pub fn interchange(&self) -> serde_json::Value {
        read_json(&self.config.chrome_out)
    }
}

pub fn read_json(path: &Path) -> serde_json::Value {
    let text = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.display()));
    serde_json::from_str(&text).expect("Invalid JSON")
}
