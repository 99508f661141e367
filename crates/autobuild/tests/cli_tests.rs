//! Integration tests for the autobuild CLI binary.

use rstest::{fixture, rstest};
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

mod common;
use common::{pkg, tpath, write_binary_index, write_source_tree};

#[fixture]
fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

fn run_autobuild(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_autobuild"))
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("AUTOBUILD_CONFIG")
        .env_remove("AUTOBUILD_PUBLISH_URL")
        .env_remove("AUTOBUILD_PUBLISH_TOKEN")
        .output()
        .expect("Failed to execute autobuild binary")
}

/// Old binary index with `lib` and `app`; new source tree bumps `lib`.
fn write_fixture(dir: &Path) -> (String, String) {
    let old = write_binary_index(
        dir,
        "old.jsonl",
        &[pkg("app", "1", 1, &["lib"]), pkg("lib", "1", 1, &[])],
    );
    let new = write_source_tree(
        dir,
        &[pkg("app", "1", 2, &["lib"]), pkg("lib", "2", 2, &[])],
    );
    (tpath("bin", &old), tpath("src", &new))
}

#[test]
fn test_cli_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_autobuild"))
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("autobuild"));
    assert!(stdout.contains("push"));
}

#[rstest]
fn test_push_dry_run_prints_order(temp_dir: TempDir) {
    let (old, new) = write_fixture(temp_dir.path());

    let output = run_autobuild(temp_dir.path(), &["push", &old, &new]);

    assert!(
        output.status.success(),
        "push failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("The following packages will be updated: app lib"));
    assert!(stdout.contains("[1] lib\n[2] app\n"));
}

#[rstest]
fn test_push_json_output(temp_dir: TempDir) {
    let (old, new) = write_fixture(temp_dir.path());

    let output = run_autobuild(temp_dir.path(), &["--json", "push", &old, &new]);
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["status"], "planned");
    assert_eq!(report["order"], serde_json::json!(["lib", "app"]));
    assert_eq!(report["published"], serde_json::json!([]));
}

#[rstest]
fn test_push_cycle_fails_and_writes_dot(temp_dir: TempDir) {
    let old = write_binary_index(temp_dir.path(), "old.jsonl", &[]);
    let new = write_source_tree(
        temp_dir.path(),
        &[pkg("pkgG", "1", 1, &["pkgH"]), pkg("pkgH", "1", 1, &["pkgG"])],
    );

    let output = run_autobuild(
        temp_dir.path(),
        &["push", &tpath("bin", &old), &tpath("src", &new)],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Cycle 1: pkgG pkgH"));

    let dot = std::fs::read_to_string(temp_dir.path().join("lifted.gv")).unwrap();
    assert!(dot.starts_with("digraph"));
}

#[rstest]
fn test_push_rejects_invalid_tpath(temp_dir: TempDir) {
    let output = run_autobuild(temp_dir.path(), &["push", "git:foo", "src:bar"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid tpath"));
}

#[rstest]
fn test_publish_without_endpoint_fails(temp_dir: TempDir) {
    let (old, new) = write_fixture(temp_dir.path());

    let output = run_autobuild(temp_dir.path(), &["push", &old, &new, "--dry-run=false"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("publisher endpoint is not configured"));
}

#[rstest]
fn test_push_anomaly_fails_without_force(temp_dir: TempDir) {
    let old = write_binary_index(
        temp_dir.path(),
        "old.jsonl",
        &[pkg("pkgB", "2.0", 3, &[]), pkg("zlib", "1.3", 5, &[])],
    );
    let new = write_source_tree(
        temp_dir.path(),
        &[pkg("pkgB", "2.1", 3, &[]), pkg("zlib", "1.3", 4, &[])],
    );
    let args = ["push", &tpath("bin", &old), &tpath("src", &new)];

    let output = run_autobuild(temp_dir.path(), &args);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("same release number but different version: pkgB"));
    assert!(stderr.contains("The following packages have older release numbers: zlib"));

    let forced = run_autobuild(temp_dir.path(), &[&args[..], &["--force"]].concat());
    assert!(forced.status.success());
    let stdout = String::from_utf8_lossy(&forced.stdout);
    assert!(stdout.contains("(ignored because of --force)"));
    assert!(stdout.contains("No packages to update."));
}

#[rstest]
fn test_push_unresolved_fails_without_force(temp_dir: TempDir) {
    let old = write_binary_index(temp_dir.path(), "old.jsonl", &[]);
    let new = write_source_tree(temp_dir.path(), &[pkg("pkgC", "1", 1, &["pkgD"])]);
    let args = ["push", &tpath("bin", &old), &tpath("src", &new)];

    let output = run_autobuild(temp_dir.path(), &args);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("nonexistent build dependencies"));
    assert!(stderr.contains("  pkgC: pkgD"));

    let forced = run_autobuild(temp_dir.path(), &[&args[..], &["--force"]].concat());
    assert!(forced.status.success());
    let stdout = String::from_utf8_lossy(&forced.stdout);
    assert!(stdout.contains("[1] pkgC"));
}

#[rstest]
fn test_push_nothing_to_rebuild_succeeds(temp_dir: TempDir) {
    let packages = [pkg("app", "1", 1, &["lib"]), pkg("lib", "1", 1, &[])];
    let old = write_binary_index(temp_dir.path(), "old.jsonl", &packages);
    let new = write_source_tree(temp_dir.path(), &packages);

    let output = run_autobuild(
        temp_dir.path(),
        &["push", &tpath("bin", &old), &tpath("src", &new), "--dry-run=false"],
    );

    assert!(
        output.status.success(),
        "push failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No packages to update."));
}
