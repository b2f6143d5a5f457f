//! Logged sweep runs: one sweep, its report artifacts, and a JSONL trail.

use std::path::{Path, PathBuf};
use std::time::Instant;

use bucketrisk_model::{DepthSweep, compare_hop_budgets, run_sweep};

use crate::report::RiskReport;
use crate::resolve::ResolvedParams;
use crate::structured_log::{LogEmitter, LogEntry, LogLevel, Outcome, now_utc, sha256_file_hex};

const COMPONENT: &str = "bucketrisk";
pub const REPORT_TITLE: &str = "Bucket Overflow Risk";

/// Output locations for a run. `None` skips the artifact.
#[derive(Debug, Clone, Default)]
pub struct RunOutputs {
    /// Markdown report; a `.json` sibling is written next to it.
    pub report: Option<PathBuf>,
    /// JSONL structured log.
    pub log: Option<PathBuf>,
}

/// Result of [`run_logged_sweep`].
#[derive(Debug, Clone)]
pub struct SweepRun {
    pub sweep: DepthSweep,
    pub report: RiskReport,
    pub artifacts: Vec<String>,
}

fn emitter_for(log: Option<&Path>, run_id: &str) -> std::io::Result<LogEmitter> {
    match log {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            LogEmitter::to_file(path, COMPONENT, run_id)
        }
        None => Ok(LogEmitter::to_buffer(COMPONENT, run_id)),
    }
}

/// Run one sweep, write the requested artifacts, and log each step.
pub fn run_logged_sweep(
    resolved: &ResolvedParams,
    outputs: &RunOutputs,
    run_id: &str,
) -> Result<SweepRun, Box<dyn std::error::Error>> {
    let preset = resolved.preset.as_str();
    let mut emitter = emitter_for(outputs.log.as_deref(), run_id)?;

    emitter.emit_entry(
        LogEntry::new("", LogLevel::Info, "sweep.start")
            .with_preset(preset)
            .with_params(&resolved.params),
    )?;

    let started = Instant::now();
    let sweep = match run_sweep(&resolved.params) {
        Ok(sweep) => sweep,
        Err(err) => {
            emitter.emit_entry(
                LogEntry::new("", LogLevel::Error, "sweep.rejected")
                    .with_preset(preset)
                    .with_params(&resolved.params)
                    .with_outcome(Outcome::Error)
                    .with_details(serde_json::json!({ "error": err.to_string() })),
            )?;
            emitter.flush()?;
            return Err(err.into());
        }
    };
    let duration_ms = started.elapsed().as_millis() as u64;

    for row in sweep.rows() {
        emitter.emit_entry(
            LogEntry::new("", LogLevel::Debug, "sweep.depth").with_details(serde_json::json!({
                "depth": row.depth,
                "expected_load": row.expected_load,
                "probability": row.probability,
                "regime": row.regime.as_str(),
            })),
        )?;
    }

    let report = RiskReport::from_sweep(REPORT_TITLE, preset, now_utc(), &sweep);
    let mut artifacts = Vec::new();
    if let Some(md_path) = &outputs.report {
        if let Some(parent) = md_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(md_path, report.to_markdown())?;
        let json_path = md_path.with_extension("json");
        std::fs::write(&json_path, report.to_json())?;
        for path in [md_path.as_path(), json_path.as_path()] {
            artifacts.push(format!("{}#sha256={}", path.display(), sha256_file_hex(path)?));
        }
    }

    let peak = sweep.peak();
    let mut done = LogEntry::new("", LogLevel::Info, "sweep.complete")
        .with_preset(preset)
        .with_params(&resolved.params)
        .with_outcome(Outcome::Pass)
        .with_duration_ms(duration_ms)
        .with_details(serde_json::json!({
            "peak_depth": peak.depth,
            "peak_probability": peak.probability,
            "peak_expected_load": peak.expected_load,
            "saturated_depths": sweep.saturated_depths(),
            "fingerprint": sweep.fingerprint(),
        }));
    if !artifacts.is_empty() {
        done = done.with_artifacts(artifacts.clone());
    }
    emitter.emit_entry(done)?;
    emitter.flush()?;

    Ok(SweepRun {
        sweep,
        report,
        artifacts,
    })
}

/// Run one sweep per hop budget, logging each peak.
pub fn run_logged_comparison(
    resolved: &ResolvedParams,
    hop_budgets: &[u32],
    log: Option<&Path>,
    run_id: &str,
) -> Result<Vec<DepthSweep>, Box<dyn std::error::Error>> {
    let preset = resolved.preset.as_str();
    let mut emitter = emitter_for(log, run_id)?;
    let started = Instant::now();
    emitter.emit(LogLevel::Info, "compare.start")?;
    let sweeps = compare_hop_budgets(&resolved.params, hop_budgets)?;
    for sweep in &sweeps {
        let peak = sweep.peak();
        emitter.emit_entry(
            LogEntry::new("", LogLevel::Info, "compare.series")
                .with_preset(preset)
                .with_params(sweep.params())
                .with_outcome(Outcome::Pass)
                .with_details(serde_json::json!({
                    "peak_depth": peak.depth,
                    "peak_probability": peak.probability,
                })),
        )?;
    }
    emitter.emit_entry(
        LogEntry::new("", LogLevel::Info, "compare.complete")
            .with_outcome(Outcome::Pass)
            .with_duration_ms(started.elapsed().as_millis() as u64)
            .with_details(serde_json::json!({ "hop_budgets": hop_budgets })),
    )?;
    emitter.flush()?;
    Ok(sweeps)
}
