//! Integration tests for the tracemerge binary.
//!
//! The export and import tools are replaced by small shell scripts so the
//! real process plumbing is exercised end to end.

mod common;

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use common::{csv, plot, read_json, zone};
use tempfile::TempDir;

struct CliFixture {
    dir: TempDir,
    viewer: PathBuf,
    layer: PathBuf,
    export_bin: PathBuf,
    import_bin: PathBuf,
}

impl CliFixture {
    fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let viewer = dir.path().join("viewer.tracy");
        let layer = dir.path().join("layer.tracy");
        fs::write(&viewer, b"viewer").unwrap();
        fs::write(&layer, b"layer").unwrap();

        fs::write(
            dir.path().join("viewer.csv"),
            csv(&[
                &zone("viewer_frame", 2000, 500, 1),
                &plot("goggles_source_frame", 3000, 4.0, 1),
            ]),
        )
        .unwrap();
        fs::write(
            dir.path().join("layer.csv"),
            csv(&[
                &zone("layer_frame", 100, 200, 5),
                &plot("goggles_layer_frame", 1000, 4.0, 5),
            ]),
        )
        .unwrap();

        // The trace path is the third argument after "-u -p".
        let export_bin = write_script(
            dir.path(),
            "csvexport",
            &format!(
                "[ \"$1\" = -u ] && [ \"$2\" = -p ] || exit 9\n\
                 case \"$3\" in\n  *viewer*) cat {dir}/viewer.csv ;;\n  *) cat {dir}/layer.csv ;;\nesac",
                dir = dir.path().display()
            ),
        );
        let import_bin = write_script(dir.path(), "import-chrome", "cp \"$1\" \"$2\"");

        Self {
            dir,
            viewer,
            layer,
            export_bin,
            import_bin,
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn run(&self, extra: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_tracemerge"))
            .arg("--viewer-trace")
            .arg(&self.viewer)
            .arg("--layer-trace")
            .arg(&self.layer)
            .arg("--output-trace")
            .arg(self.path("out/merged.tracy"))
            .arg("--summary-out")
            .arg(self.path("out/summary.json"))
            .arg("--csvexport-bin")
            .arg(&self.export_bin)
            .arg("--import-chrome-bin")
            .arg(&self.import_bin)
            .arg("--chrome-out")
            .arg(self.path("out/merged.json"))
            .args(extra)
            .output()
            .expect("Failed to run tracemerge")
    }
}

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[test]
fn test_cli_successful_merge() {
    let fixture = CliFixture::new();

    let output = fixture.run(&[]);

    assert!(
        output.status.success(),
        "tracemerge failed: {}",
        lossy(&output.stderr)
    );
    let summary = read_json(&fixture.path("out/summary.json"));
    assert_eq!(summary["success"], true);
    assert_eq!(summary["alignment"]["method"], "frame_marker");
    assert_eq!(summary["alignment"]["frame_number"], 4);
    assert_eq!(summary["alignment"]["layer_shift_ns"], 2000);
    assert_eq!(summary["counts"]["merged_events"], 6);

    // The import script copies the interchange document verbatim.
    let merged = read_json(&fixture.path("out/merged.tracy"));
    assert_eq!(merged, read_json(&fixture.path("out/merged.json")));
    assert_eq!(merged["traceEvents"].as_array().unwrap().len(), 6);
}

#[test]
fn test_cli_disable_marker_alignment() {
    let fixture = CliFixture::new();

    let output = fixture.run(&["--disable-marker-alignment"]);

    assert!(output.status.success(), "{}", lossy(&output.stderr));
    let summary = read_json(&fixture.path("out/summary.json"));
    assert_eq!(summary["alignment"]["method"], "relative_time");
    assert_eq!(summary["alignment"]["layer_shift_ns"], 0);
    assert_eq!(
        summary["warnings"][0],
        "Marker alignment disabled; using relative-time fallback."
    );
}

#[test]
fn test_cli_empty_viewer_trace() {
    let fixture = CliFixture::new();
    fs::write(&fixture.viewer, b"").unwrap();

    let output = fixture.run(&[]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = lossy(&output.stderr);
    assert!(
        stderr.contains("Error: Missing or empty trace file:"),
        "stderr: {stderr}"
    );

    let summary = read_json(&fixture.path("out/summary.json"));
    assert_eq!(summary["success"], false);
    let viewer = fixture.viewer.display().to_string();
    assert!(summary["warnings"][0].as_str().unwrap().contains(&viewer));
    assert!(!fixture.path("out/merged.json").exists());
    assert!(!fixture.path("out/merged.tracy").exists());
}

#[test]
fn test_cli_missing_export_tool() {
    let mut fixture = CliFixture::new();
    fixture.export_bin = fixture.path("no-such-csvexport");

    let output = fixture.run(&[]);

    assert_eq!(output.status.code(), Some(1));
    let summary = read_json(&fixture.path("out/summary.json"));
    assert_eq!(summary["success"], false);
    assert!(summary["warnings"][0]
        .as_str()
        .unwrap()
        .starts_with("Trace export tool not found:"));
}

#[test]
fn test_cli_import_failure_surfaces_output() {
    let mut fixture = CliFixture::new();
    fixture.import_bin = write_script(
        fixture.dir.path(),
        "broken-import",
        "echo 'importer stdout'\necho 'importer stderr' >&2\nexit 2",
    );

    let output = fixture.run(&[]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = lossy(&output.stderr);
    assert!(stderr.contains("importer stdout\n"), "stderr: {stderr}");
    assert!(stderr.contains("importer stderr\n"), "stderr: {stderr}");
    assert!(stderr.contains("Error: Failed to import merged interchange trace"));

    let summary = read_json(&fixture.path("out/summary.json"));
    assert_eq!(summary["success"], false);
    assert_eq!(summary["counts"]["merged_events"], 6);
}
