//! Integration tests for the `unredact` binary.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_unredact"))
}

const MEMO: &str = r#"{
  "producer": "test",
  "pages": [{
    "width": 210, "height": 297,
    "spans": [
      {"text": "Name:", "bbox": {"x": 0.10, "y": 0.20, "w": 0.08, "h": 0.013}, "size_pt": 11},
      {"text": "is a resident", "bbox": {"x": 0.40, "y": 0.20, "w": 0.15, "h": 0.013}, "size_pt": 11},
      {"text": "Phone:", "bbox": {"x": 0.10, "y": 0.30, "w": 0.09, "h": 0.013}, "size_pt": 11},
      {"text": "during office hours.", "bbox": {"x": 0.42, "y": 0.30, "w": 0.28, "h": 0.013}, "size_pt": 11}
    ],
    "rects": [
      {"bbox": {"x": 0.19, "y": 0.20, "w": 0.20, "h": 0.013}, "fill": [0, 0, 0]},
      {"bbox": {"x": 0.20, "y": 0.30, "w": 0.21, "h": 0.013}, "fill": [0, 0, 0]}
    ]
  }]
}"#;

const NO_REDACTIONS: &str = r#"{
  "pages": [{
    "width": 210, "height": 297,
    "spans": [{"text": "Nothing to see", "bbox": {"x": 0.1, "y": 0.1, "w": 0.3, "h": 0.013}, "size_pt": 11}]
  }]
}"#;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn json(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap()
}

fn read_json(path: &Path) -> Value {
    json(&fs::read(path).unwrap())
}

// ============ STEPS / PARAMS ============

#[test]
fn test_steps_lists_stages_in_order() {
    let output = cli().arg("steps").assert().success().get_output().stdout.clone();
    let stdout = String::from_utf8(output).unwrap();
    let names: Vec<&str> = stdout
        .lines()
        .filter_map(|l| l.split_whitespace().next())
        .collect();
    assert_eq!(
        names,
        vec![
            "segment",
            "locate-redactions",
            "profile-typography",
            "classify",
            "match-candidates",
            "consolidate"
        ]
    );
}

#[test]
fn test_params_prints_defaults() {
    let output = cli()
        .arg("params")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"max_lookup\": 5000"))
        .get_output()
        .stdout
        .clone();
    let params = json(&output);
    assert_eq!(params["matching"]["top_n"], 5);
    assert_eq!(params["segment"]["max_horizontal_gap_mm"], 60.0);
}

#[test]
fn test_help_mentions_subcommands() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run").and(predicate::str::contains("steps")));
}

// ============ RUN ============

#[test]
fn test_run_writes_report() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "memo.json", MEMO);
    let out = dir.path().join("report.json");

    cli()
        .args(["run", "--threads", "1", "-o"])
        .arg(&out)
        .arg(&input)
        .assert()
        .code(0);

    let report = read_json(&out);
    let results = report["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["redaction_id"], "p0_r0");
    assert_eq!(results[0]["predicted_type"], "name");
    assert_eq!(results[0]["pre_context"], "Name:");
    assert_eq!(results[1]["predicted_type"], "phone");
    assert!(!results[0]["top_candidates"].as_array().unwrap().is_empty());
    assert_eq!(report["document"]["filename"], "memo.json");
}

#[test]
fn test_run_to_stdout() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "memo.json", MEMO);

    cli()
        .arg("run")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"redaction_id\": \"p0_r1\""))
        .stdout(predicate::str::contains("\"pipeline_version\""));
}

#[test]
fn test_stop_after_prints_diagnostic() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "memo.json", MEMO);

    let output = cli()
        .args(["run", "--stop-after", "classify"])
        .arg(&input)
        .assert()
        .code(0)
        .stdout(predicate::str::contains("\"status\": \"partial\""))
        .get_output()
        .stdout
        .clone();
    let diagnostic = json(&output);
    assert_eq!(diagnostic["redactions"], 2);
    assert_eq!(diagnostic["completed"].as_array().unwrap().len(), 4);
}

#[test]
fn test_save_state_then_resume() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "memo.json", MEMO);
    let snapshot = dir.path().join("state.json");
    let out = dir.path().join("report.json");

    cli()
        .args(["run", "--stop-after", "profile-typography", "--save-state"])
        .arg(&snapshot)
        .arg(&input)
        .assert()
        .success();
    assert!(snapshot.exists());

    cli()
        .args(["run", "--resume"])
        .arg(&snapshot)
        .arg("-o")
        .arg(&out)
        .assert()
        .success();
    assert_eq!(read_json(&out)["results"].as_array().unwrap().len(), 2);
}

#[test]
fn test_dictionary_words_rank_under_tight_bound() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "memo.json", MEMO);
    let dictionary = write(&dir, "words.json", r#"{"name": ["Zebulon Quixote-Featherstonehaugh"]}"#);
    let params = write(&dir, "params.json", r#"{"matching": {"max_lookup": 1}}"#);
    let out = dir.path().join("report.json");

    cli()
        .args(["run", "--dictionary"])
        .arg(&dictionary)
        .arg("--params")
        .arg(&params)
        .arg("-o")
        .arg(&out)
        .arg(&input)
        .assert()
        .success();

    let report = read_json(&out);
    assert_eq!(report["results"][0]["predicted_type"], "name");
    let top = report["results"][0]["top_candidates"].as_array().unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0]["text"], "Zebulon Quixote-Featherstonehaugh");
}

// ============ FAILURES ============

#[test]
fn test_halt_exits_with_two() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "plain.json", NO_REDACTIONS);

    let output = cli()
        .arg("run")
        .arg(&input)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("profile-typography"))
        .get_output()
        .stdout
        .clone();
    let diagnostic = json(&output);
    assert_eq!(diagnostic["status"], "halted");
    assert_eq!(diagnostic["halted"]["stage"], "profile-typography");
    assert_eq!(diagnostic["halted"]["last_completed"], "locate-redactions");
}

#[test]
fn test_unknown_stage_is_usage_error() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "memo.json", MEMO);

    cli()
        .args(["run", "--skip", "classify,telepathy"])
        .arg(&input)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("telepathy"));
}

#[test]
fn test_missing_input_fails() {
    cli().arg("run").assert().failure().code(1);

    cli()
        .args(["run", "/nonexistent/layout.json"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("failed to read layout dump"));
}
