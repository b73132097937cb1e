//! tracemerge: merge a viewer trace and a layer trace into one timeline trace.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use tracemerge::trace::constants::{DEFAULT_LAYER_MARKER, DEFAULT_VIEWER_MARKER};
use tracemerge::{run_merge, ExternalTools, MergeConfig};

#[derive(Debug, Parser)]
#[command(name = "tracemerge")]
#[command(about = "Merge two traces into one timeline trace")]
#[command(version)]
struct Command {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Trace captured by the viewer process
    #[arg(long)]
    viewer_trace: PathBuf,

    /// Trace captured by the layer process
    #[arg(long)]
    layer_trace: PathBuf,

    /// Native merged trace to produce
    #[arg(long)]
    output_trace: PathBuf,

    /// Where to write the JSON run report
    #[arg(long)]
    summary_out: PathBuf,

    /// Tool that exports a native trace as CSV
    #[arg(long)]
    csvexport_bin: PathBuf,

    /// Tool that imports a chrome trace document into a native trace
    #[arg(long)]
    import_chrome_bin: PathBuf,

    /// Where to write the intermediate chrome trace document
    #[arg(long)]
    chrome_out: PathBuf,

    /// Frame marker plot in the viewer trace
    #[arg(long, default_value = DEFAULT_VIEWER_MARKER)]
    viewer_marker: String,

    /// Frame marker plot in the layer trace
    #[arg(long, default_value = DEFAULT_LAYER_MARKER)]
    layer_marker: String,

    /// Merge on raw timestamps without marker alignment
    #[arg(long)]
    disable_marker_alignment: bool,
}

impl Command {
    fn into_parts(self) -> (MergeConfig, ExternalTools) {
        let tools = ExternalTools::new(self.csvexport_bin, self.import_chrome_bin);
        let config = MergeConfig {
            verbosity: self.verbose,
            viewer_trace: self.viewer_trace,
            layer_trace: self.layer_trace,
            output_trace: self.output_trace,
            chrome_out: self.chrome_out,
            summary_out: self.summary_out,
            viewer_marker: self.viewer_marker,
            layer_marker: self.layer_marker,
            disable_marker_alignment: self.disable_marker_alignment,
        };
        (config, tools)
    }
}

fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let (config, tools) = Command::parse().into_parts();
    init_logging(config.log_level());

    let report = run_merge(&config, &tools);
    if report.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
