//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run with HOME pointed at a temporary
//! directory, so every test starts from a fresh default config.

use std::path::Path;
use std::process::Command;

use serde_json::{json, Value};
use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-q", "-p", "proctor-cli", "--"])
        .args(args)
        .env("HOME", home)
        .env_remove("PROCTOR_ENV")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_json(home: &Path, args: &[&str]) -> Value {
    let (stdout, stderr, code) = run_cli(home, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

fn write_json(dir: &TempDir, name: &str, value: &Value) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, serde_json::to_string(value).unwrap()).unwrap();
    path.to_string_lossy().to_string()
}

fn face() -> Value {
    json!({
        "keypoints": [
            { "name": "noseTip", "x": 100.0, "y": 60.0 },
            { "name": "leftEye", "x": 80.0, "y": 40.0 },
            { "name": "rightEye", "x": 120.0, "y": 40.0 }
        ]
    })
}

#[test]
fn test_config_get_default() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "presence.absence_threshold_ms"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "10000");
}

#[test]
fn test_config_set_persists() {
    let home = TempDir::new().unwrap();
    let (_, _, code) = run_cli(home.path(), &["config", "set", "attention.debounce_ms", "3000"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(home.path(), &["config", "get", "attention.debounce_ms"]);
    assert_eq!(stdout.trim(), "3000");
}

#[test]
fn test_config_set_rejects_invalid_value() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(
        home.path(),
        &["config", "set", "presence.absence_threshold_ms", "0"],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("error"));
}

#[test]
fn test_config_unknown_key() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["config", "get", "no.such.key"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Unknown configuration key: no.such.key"));
}

#[test]
fn test_config_set_rejects_oversized_interval() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(
        home.path(),
        &["config", "set", "presence.absence_threshold_ms", "18446744073709551615"],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("presence.absence_threshold_ms"));
    let (stdout, _, _) = run_cli(home.path(), &["config", "get", "presence.absence_threshold_ms"]);
    assert_eq!(stdout.trim(), "10000");
}

#[test]
fn test_config_validate_defaults() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "validate"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("config ok"));
}

#[test]
fn test_replay_absence_scores_ninety() {
    let home = TempDir::new().unwrap();
    let samples: Vec<Value> = (0..=6)
        .map(|i| json!({ "atMs": i * 2000, "faces": [], "objects": [] }))
        .collect();
    let file = write_json(&home, "absent.json", &Value::Array(samples));

    let output = run_json(
        home.path(),
        &["replay", &file, "--candidate", "Ada", "--start", "2024-01-01T10:00:00Z"],
    );
    let events = output["events"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["kind"], "user_absent");
    assert_eq!(events[0]["timestamp"], "2024-01-01T10:00:10Z");
    assert_eq!(output["breakdown"]["score"], 90);
    assert_eq!(output["report"]["candidateName"], "Ada");
    assert_eq!(output["report"]["interviewDuration"], 12);
}

#[test]
fn test_replay_skipped_samples_do_not_clear_absence() {
    let home = TempDir::new().unwrap();
    let samples = json!([
        { "atMs": 0, "faces": [] },
        { "atMs": 4000, "skipped": true },
        { "atMs": 8000, "skipped": true },
        { "atMs": 12000, "faces": [face()] }
    ]);
    let file = write_json(&home, "skipped.json", &samples);

    let output = run_json(home.path(), &["replay", &file]);
    assert_eq!(output["events"][0]["kind"], "user_absent");
    assert_eq!(output["breakdown"]["score"], 90);
}

#[test]
fn test_replay_phone_below_threshold_is_ignored() {
    let home = TempDir::new().unwrap();
    let samples = json!([
        { "atMs": 0, "faces": [face()], "objects": [{ "class": "cell phone", "score": 0.4 }] },
        { "atMs": 2000, "faces": [face()], "objects": [{ "class": "cell phone", "score": 0.9 }] }
    ]);
    let file = write_json(&home, "phone.json", &samples);

    let output = run_json(home.path(), &["replay", &file]);
    let events = output["events"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["kind"], "suspicious_object_detected");
    assert_eq!(events[0]["objectClass"], "cell phone");
    assert_eq!(output["breakdown"]["score"], 80);
}

#[test]
fn test_replay_rejects_out_of_range_offset() {
    let home = TempDir::new().unwrap();
    let samples = json!([
        { "atMs": 0, "faces": [] },
        { "atMs": 18446744073709551615u64, "faces": [] }
    ]);
    let file = write_json(&home, "far.json", &samples);

    let (stdout, stderr, code) = run_cli(home.path(), &["replay", &file]);
    assert_ne!(code, 0);
    assert!(stdout.is_empty());
    assert!(stderr.contains("out of range"));
}

#[test]
fn test_score_event_array() {
    let home = TempDir::new().unwrap();
    let events = json!([
        { "kind": "multiple_faces_detected", "timestamp": "2024-01-01T10:00:00Z" },
        { "kind": "user_absent", "timestamp": "2024-01-01T10:00:05Z" },
        { "kind": "something_new", "timestamp": "2024-01-01T10:00:06Z" }
    ]);
    let file = write_json(&home, "events.json", &events);

    let output = run_json(home.path(), &["score", &file]);
    assert_eq!(output["score"], 75);
    assert_eq!(output["total_deduction"], 25);
}

#[test]
fn test_score_stored_report() {
    let home = TempDir::new().unwrap();
    let report = json!({
        "id": "r-1",
        "candidateName": "Ada",
        "interviewDuration": 30,
        "events": [
            { "kind": "suspicious_object_detected", "objectClass": "book", "timestamp": "2024-01-01T10:00:00Z" }
        ],
        "createdAt": "2024-01-01T10:00:30Z"
    });
    let file = write_json(&home, "report.json", &report);

    let output = run_json(home.path(), &["score", &file]);
    assert_eq!(output["score"], 85);
}

#[test]
fn test_score_missing_file_fails() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["score", "/nonexistent/events.json"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error"));
}

#[test]
fn test_report_fetch_unreachable_store_fails() {
    let home = TempDir::new().unwrap();
    let (_, _, code) = run_cli(
        home.path(),
        &["config", "set", "transport.base_url", "http://127.0.0.1:9"],
    );
    assert_eq!(code, 0);
    let (_, stderr, code) = run_cli(home.path(), &["report", "fetch", "abc"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error"));
}
