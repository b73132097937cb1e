//! External trace tools.
//!
//! Two collaborators are involved in a merge: an export tool that turns a
//! native trace into CSV rows, and an import tool that turns the merged
//! interchange document back into a native trace. Both sit behind the
//! [`TraceTools`] trait so a merge can run against in-memory doubles.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::decode::{rows_from_csv, Row};

/// Flags passed to the export tool ahead of the trace path.
pub const EXPORT_ARGS: &[&str] = &["-u", "-p"];

/// Which collaborator an error came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolKind {
    Export,
    Import,
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolKind::Export => write!(f, "export"),
            ToolKind::Import => write!(f, "import"),
        }
    }
}

/// Failure invoking an external tool.
#[derive(Debug)]
pub enum ToolError {
    /// The tool binary does not exist.
    NotFound { tool: ToolKind, path: PathBuf },
    /// The tool ran and exited unsuccessfully. Output is captured verbatim.
    Failed {
        tool: ToolKind,
        status: Option<i32>,
        stdout: String,
        stderr: String,
    },
    /// The tool could not be started for another reason.
    Io {
        tool: ToolKind,
        path: PathBuf,
        source: io::Error,
    },
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolError::NotFound { tool, path } => {
                write!(f, "Trace {tool} tool not found: {}", path.display())
            }
            ToolError::Failed { tool, status, .. } => match status {
                Some(code) => write!(f, "Trace {tool} tool exited with status {code}"),
                None => write!(f, "Trace {tool} tool terminated by signal"),
            },
            ToolError::Io { tool, path, source } => {
                write!(f, "Failed to run trace {tool} tool {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ToolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ToolError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Capability interface over the export and import tools.
pub trait TraceTools {
    /// Export a native trace into tabular rows.
    fn extract(&self, trace_path: &Path) -> Result<Vec<Row>, ToolError>;

    /// Convert an interchange document into a native trace at `output_path`.
    fn reencode(&self, interchange_path: &Path, output_path: &Path) -> Result<(), ToolError>;
}

/// [`TraceTools`] backed by external executables.
#[derive(Clone, Debug)]
pub struct ExternalTools {
    pub export_bin: PathBuf,
    pub import_bin: PathBuf,
}

impl ExternalTools {
    pub fn new(export_bin: impl Into<PathBuf>, import_bin: impl Into<PathBuf>) -> Self {
        Self {
            export_bin: export_bin.into(),
            import_bin: import_bin.into(),
        }
    }
}

/// Run a command to completion, capturing all output.
fn run_tool(tool: ToolKind, bin: &Path, command: &mut Command) -> Result<Output, ToolError> {
    tracing::debug!("Running {:?}", command);
    let output = command.output().map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => ToolError::NotFound {
            tool,
            path: bin.to_path_buf(),
        },
        _ => ToolError::Io {
            tool,
            path: bin.to_path_buf(),
            source: err,
        },
    })?;

    if !output.status.success() {
        return Err(ToolError::Failed {
            tool,
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(output)
}

impl TraceTools for ExternalTools {
    fn extract(&self, trace_path: &Path) -> Result<Vec<Row>, ToolError> {
        let output = run_tool(
            ToolKind::Export,
            &self.export_bin,
            Command::new(&self.export_bin)
                .args(EXPORT_ARGS)
                .arg(trace_path),
        )?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(rows_from_csv(&stdout))
    }

    fn reencode(&self, interchange_path: &Path, output_path: &Path) -> Result<(), ToolError> {
        run_tool(
            ToolKind::Import,
            &self.import_bin,
            Command::new(&self.import_bin)
                .arg(interchange_path)
                .arg(output_path),
        )?;
        Ok(())
    }
}
