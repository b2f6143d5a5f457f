//! Integration test: logged sweep runs
//!
//! Validates that:
//! 1. A logged sweep writes a JSONL trail that passes log validation.
//! 2. Report artifacts (markdown + JSON sibling) are written and referenced
//!    with their sha256 in the completion entry.
//! 3. Rejected parameters leave an error entry in the log.
//!
//! Run: cargo test -p bucketrisk-harness --test logged_run_test

use std::path::{Path, PathBuf};

use bucketrisk_harness::structured_log::{sha256_file_hex, validate_log_file};
use bucketrisk_harness::{ParamOverrides, RunOutputs, run_logged_comparison, run_logged_sweep};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("bucketrisk_{name}_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn read_lines(path: &Path) -> Vec<serde_json::Value> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[test]
fn logged_sweep_writes_valid_trail_and_artifacts() {
    let dir = scratch_dir("logged_sweep");
    let log_path = dir.join("run.jsonl");
    let report_path = dir.join("report.md");

    let resolved = ParamOverrides::default().resolve().unwrap();
    let outputs = RunOutputs {
        report: Some(report_path.clone()),
        log: Some(log_path.clone()),
    };
    let run = run_logged_sweep(&resolved, &outputs, "run-integ").unwrap();

    // start + one entry per depth + complete
    let (line_count, errors) = validate_log_file(&log_path).unwrap();
    assert_eq!(line_count, 1 + 31 + 1);
    assert!(errors.is_empty(), "log should validate: {errors:?}");

    let lines = read_lines(&log_path);
    assert_eq!(lines[0]["event"], "sweep.start");
    assert_eq!(lines[0]["trace_id"], "bucketrisk::run-integ::001");
    assert_eq!(lines[0]["preset"], "analysis");
    assert_eq!(lines[1]["details"]["depth"], 0);
    assert_eq!(lines[1]["details"]["regime"], "zero_load");

    let done = lines.last().unwrap();
    assert_eq!(done["event"], "sweep.complete");
    assert_eq!(done["outcome"], "pass");
    assert_eq!(done["details"]["peak_depth"], run.sweep.peak().depth);
    assert_eq!(done["details"]["fingerprint"], run.sweep.fingerprint());

    let json_path = report_path.with_extension("json");
    let md = std::fs::read_to_string(&report_path).unwrap();
    assert!(md.contains(&run.report.summary_line()));
    assert!(json_path.exists());

    let refs: Vec<&str> = done["artifact_refs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(refs.len(), 2);
    let expected = format!(
        "{}#sha256={}",
        report_path.display(),
        sha256_file_hex(&report_path).unwrap()
    );
    assert_eq!(refs[0], expected);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn rejected_sweep_logs_error_entry() {
    let dir = scratch_dir("rejected_sweep");
    let log_path = dir.join("run.jsonl");

    let mut resolved = ParamOverrides::default().resolve().unwrap();
    resolved.params.capacity = 0;
    let outputs = RunOutputs {
        report: None,
        log: Some(log_path.clone()),
    };
    let err = run_logged_sweep(&resolved, &outputs, "run-bad").unwrap_err();
    assert!(err.to_string().contains("capacity"));

    let (line_count, errors) = validate_log_file(&log_path).unwrap();
    assert_eq!(line_count, 2);
    assert!(errors.is_empty(), "{errors:?}");
    let lines = read_lines(&log_path);
    assert_eq!(lines[1]["event"], "sweep.rejected");
    assert_eq!(lines[1]["level"], "error");
    assert_eq!(lines[1]["outcome"], "error");

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn comparison_logs_one_entry_per_budget() {
    let dir = scratch_dir("compare");
    let log_path = dir.join("compare.jsonl");

    let resolved = ParamOverrides {
        preset: Some(String::from("deployment")),
        ..ParamOverrides::default()
    }
    .resolve()
    .unwrap();
    let sweeps = run_logged_comparison(&resolved, &[10, 100, 1000], Some(&log_path), "cmp")
        .unwrap();
    assert_eq!(sweeps.len(), 3);

    let (line_count, errors) = validate_log_file(&log_path).unwrap();
    // start + one entry per budget + complete
    assert_eq!(line_count, 5);
    assert!(errors.is_empty(), "{errors:?}");
    let lines = read_lines(&log_path);
    assert_eq!(lines[0]["event"], "compare.start");
    assert_eq!(lines[0]["component"], "bucketrisk");
    assert_eq!(lines[0]["trace_id"], "bucketrisk::cmp::001");
    assert_eq!(lines[3]["params"]["hop_budget"], 1000);
    assert_eq!(lines[4]["event"], "compare.complete");

    std::fs::remove_dir_all(&dir).ok();
}
