//! CLI regression tests for the `waymark` binary.
//!
//! These invoke the binary as a subprocess to catch regressions in flag
//! names, exit codes and output formats.
//!
//! Run with: `cargo test -p waymark-test`
//! Requires the `waymark` binary to be built first (`cargo build -p waymark`).

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::str::contains;
use serde_json::Value;

use crate::fixtures::TempManifest;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Returns an assert_cmd Command wrapping the `waymark` binary.
fn waymark() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("waymark").expect("waymark binary not found, run `cargo build -p waymark`")
}

/// Absolute path to the shared test fixtures directory.
fn fixtures() -> PathBuf {
    // CARGO_MANIFEST_DIR = .../crates/waymark-test
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("crates/")
        .parent()
        .expect("workspace root")
        .join("tests/fixtures")
}

fn match_json(urls: &[&str]) -> Value {
    let output = waymark()
        .args(["match", "--routes"])
        .arg(fixtures().join("blog.yaml"))
        .args(urls)
        .output()
        .expect("run waymark");
    serde_json::from_slice(&output.stdout).expect("match prints JSON")
}

// ---------------------------------------------------------------------------
// waymark check
// ---------------------------------------------------------------------------

#[test]
fn check_valid_manifest_exits_zero() {
    waymark()
        .args(["check", "--routes"])
        .arg(fixtures().join("blog.yaml"))
        .assert()
        .success()
        .stderr(contains("is valid (6 routes)"));
}

#[test]
fn check_ambiguous_routes_exits_one() {
    waymark()
        .args(["check", "--routes"])
        .arg(fixtures().join("invalid-ambiguous.yaml"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("E2004"))
        .stderr(contains("users/{id}"))
        .stderr(contains("Users/{name}"));
}

#[test]
fn check_bad_template_exits_one() {
    waymark()
        .args(["check", "--routes"])
        .arg(fixtures().join("invalid-template.yaml"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("E2001"));
}

#[test]
fn check_unknown_constraint_exits_one() {
    waymark()
        .args(["check", "--routes"])
        .arg(fixtures().join("invalid-constraint.yaml"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("E2002"))
        .stderr(contains("bogus"));
}

#[test]
fn check_bad_query_type_exits_one() {
    waymark()
        .args(["check", "-r"])
        .arg(fixtures().join("invalid-query-type.yaml"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("E2012"));
}

#[test]
fn check_missing_file_exits_one() {
    waymark()
        .args(["check", "--routes", "this-file-does-not-exist.yaml"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("E2010"));
}

#[test]
fn check_unknown_manifest_key_exits_one() {
    let manifest = TempManifest::new("routes: []\nhandlers: []\n").unwrap();
    waymark()
        .args(["check", "--routes"])
        .arg(manifest.path())
        .assert()
        .failure()
        .code(1)
        .stderr(contains("E2011"));
}

// ---------------------------------------------------------------------------
// waymark table
// ---------------------------------------------------------------------------

#[test]
fn table_text_lists_entries_in_match_order() {
    let manifest = TempManifest::with_templates(&["a/{*rest}", "a/{id}", "a/b"]).unwrap();
    let output = waymark()
        .args(["table", "--routes"])
        .arg(manifest.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("a/b"));
    assert!(lines[1].contains("a/{id}"));
    assert!(lines[2].contains("a/{*rest}"));
}

#[test]
fn table_json_format() {
    let output = waymark()
        .args(["table", "--format", "json", "--routes"])
        .arg(fixtures().join("blog.yaml"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let entries: Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 6);
    let ordered = entries
        .iter()
        .find(|e| e["template"] == "b/{id:int}")
        .unwrap();
    assert_eq!(ordered["order"], 1);
    assert_eq!(ordered["handler"], "posts.show");
    assert_eq!(ordered["unused"], serde_json::json!(["slug"]));
}

#[test]
fn table_unknown_format_exits_one() {
    waymark()
        .args(["table", "--format", "xml", "--routes"])
        .arg(fixtures().join("blog.yaml"))
        .assert()
        .failure()
        .code(1)
        .stderr(contains("unknown format"));
}

// ---------------------------------------------------------------------------
// waymark match
// ---------------------------------------------------------------------------

#[test]
fn match_typed_values_and_query() {
    let results = match_json(&["/blog/42/hello-world?page=2&tag=a&tag=b"]);
    let result = &results[0];
    assert_eq!(result["matched"], true);
    assert_eq!(result["handler"], "posts.show");
    assert_eq!(result["values"]["id"], 42);
    assert_eq!(result["values"]["slug"], "hello-world");
    assert_eq!(result["query"]["page"], 2);
    assert_eq!(result["query"]["tag"], serde_json::json!(["a", "b"]));
}

#[test]
fn match_more_constrained_route_first() {
    let results = match_json(&["/blog/2024/5", "/blog/7/5"]);
    assert_eq!(results[0]["handler"], "posts.archive");
    assert_eq!(results[0]["values"]["year"], 2024);
    assert_eq!(results[1]["handler"], "posts.show");
    assert_eq!(results[1]["values"]["slug"], "5");
}

#[test]
fn match_complex_segment_and_catch_all() {
    let results = match_json(&["/files/report.final.pdf", "/static/css/site.css", "/"]);
    assert_eq!(results[0]["values"]["name"], "report.final");
    assert_eq!(results[0]["values"]["ext"], "pdf");
    assert_eq!(results[1]["values"]["path"], "css/site.css");
    assert_eq!(results[2]["handler"], "home");
}

#[test]
fn match_unmatched_url_exits_one() {
    waymark()
        .args(["match", "--routes"])
        .arg(fixtures().join("blog.yaml"))
        .args(["/blog/5", "/nowhere/at/all"])
        .assert()
        .failure()
        .code(1)
        .stdout(contains("\"matched\": false"));
}

#[test]
fn match_requires_urls() {
    waymark()
        .args(["match", "--routes"])
        .arg(fixtures().join("blog.yaml"))
        .assert()
        .failure()
        .code(2);
}

// ---------------------------------------------------------------------------
// global flags
// ---------------------------------------------------------------------------

#[test]
fn unknown_log_format_exits_two() {
    waymark()
        .args(["--log-format", "xml", "check", "--routes"])
        .arg(fixtures().join("blog.yaml"))
        .assert()
        .failure()
        .code(2);
}

#[test]
fn debug_logs_go_to_stderr() {
    waymark()
        .args(["--log-level", "debug", "--log-format", "json", "match", "--routes"])
        .arg(fixtures().join("blog.yaml"))
        .arg("/blog/5")
        .assert()
        .success()
        .stderr(contains("route_matched"))
        .stdout(contains("posts.show"));
}
