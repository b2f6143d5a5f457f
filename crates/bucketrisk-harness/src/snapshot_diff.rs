//! Deterministic diff rendering for depth-sweep snapshot fixtures.
//!
//! Goal: make numeric drift obvious and reviewable (side-by-side fields with
//! a relative-change threshold).

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use crate::snapshot::SweepSnapshotFixtureV1;

/// Relative change below which a numeric field counts as summation-order
/// noise rather than drift.
pub const RELATIVE_TOLERANCE: f64 = 1e-12;

const MISSING: &str = "<missing>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffStatus {
    Same,
    Changed,
    Alert,
}

#[derive(Debug, Clone)]
pub struct DiffRow {
    pub field: String,
    pub golden: String,
    pub current: String,
    pub delta: Option<f64>,
    pub status: DiffStatus,
}

#[derive(Debug, Clone)]
pub struct SnapshotDiffReport {
    pub scenario_id: String,
    pub rows: Vec<DiffRow>,
}

impl SnapshotDiffReport {
    #[must_use]
    pub fn has_alerts(&self) -> bool {
        self.rows.iter().any(|r| r.status == DiffStatus::Alert)
    }

    #[must_use]
    pub fn count(&self, status: DiffStatus) -> usize {
        self.rows.iter().filter(|r| r.status == status).count()
    }
}

const KEY_FIELDS: &[&str] = &[
    "params.capacity",
    "params.items",
    "params.paths",
    "params.max_depth",
    "params.hop_budget",
    "params.tail_policy",
    "fingerprint",
    "peak.depth",
    "peak.probability",
    "saturated_count",
];

pub fn diff_sweep_snapshots(
    golden: &SweepSnapshotFixtureV1,
    current: &SweepSnapshotFixtureV1,
    all_fields: bool,
) -> Result<SnapshotDiffReport, String> {
    if golden.version != current.version {
        return Err(format!(
            "fixture version mismatch: golden={} current={}",
            golden.version, current.version
        ));
    }

    let golden_map = flatten(golden, all_fields)?;
    let current_map = flatten(current, all_fields)?;

    let fields: Vec<String> = if all_fields {
        let mut all = BTreeSet::<String>::new();
        all.extend(golden_map.keys().cloned());
        all.extend(current_map.keys().cloned());
        // Key fields first, then per-depth fields in depth order.
        let mut ordered: Vec<String> = KEY_FIELDS.iter().map(|s| (*s).to_string()).collect();
        ordered.extend(all.into_iter().filter(|f| !KEY_FIELDS.contains(&f.as_str())));
        ordered
    } else {
        KEY_FIELDS.iter().map(|s| (*s).to_string()).collect()
    };

    let rows = fields
        .into_iter()
        .map(|field| {
            let g = golden_map
                .get(&field)
                .cloned()
                .unwrap_or_else(|| String::from(MISSING));
            let c = current_map
                .get(&field)
                .cloned()
                .unwrap_or_else(|| String::from(MISSING));
            let (delta, status) = classify_delta(&field, &g, &c);
            DiffRow {
                field,
                golden: g,
                current: c,
                delta,
                status,
            }
        })
        .collect();

    Ok(SnapshotDiffReport {
        scenario_id: golden.scenario.id.clone(),
        rows,
    })
}

/// Decode a `0x...` bit pattern written by the snapshot capture.
fn decode_bits(raw: &str) -> Result<f64, String> {
    let hex = raw
        .strip_prefix("0x")
        .ok_or_else(|| format!("bit pattern without 0x prefix: '{raw}'"))?;
    u64::from_str_radix(hex, 16)
        .map(f64::from_bits)
        .map_err(|e| format!("invalid bit pattern '{raw}': {e}"))
}

fn flatten(
    fixture: &SweepSnapshotFixtureV1,
    all_fields: bool,
) -> Result<BTreeMap<String, String>, String> {
    let p = &fixture.scenario.params;
    let mut out = BTreeMap::<String, String>::new();
    out.insert("params.capacity".into(), p.capacity.to_string());
    out.insert("params.items".into(), p.items.to_string());
    out.insert("params.paths".into(), p.paths.to_string());
    out.insert("params.max_depth".into(), p.max_depth.to_string());
    out.insert("params.hop_budget".into(), p.hop_budget.to_string());
    out.insert("params.tail_policy".into(), p.tail_policy.as_str().to_string());
    out.insert("fingerprint".into(), fixture.fingerprint.clone());
    out.insert("peak.depth".into(), fixture.peak.depth.to_string());
    out.insert(
        "peak.probability".into(),
        format!("{:e}", decode_bits(&fixture.peak.probability_bits)?),
    );
    out.insert(
        "saturated_count".into(),
        fixture.saturated_depths.len().to_string(),
    );

    if all_fields {
        for row in &fixture.rows {
            let prefix = format!("depth.{:04}", row.depth);
            out.insert(
                format!("{prefix}.expected_load"),
                format!("{:e}", decode_bits(&row.expected_load_bits)?),
            );
            out.insert(
                format!("{prefix}.probability"),
                format!("{:e}", decode_bits(&row.probability_bits)?),
            );
            out.insert(format!("{prefix}.regime"), row.regime.clone());
        }
    }
    Ok(out)
}

fn classify_delta(field: &str, golden: &str, current: &str) -> (Option<f64>, DiffStatus) {
    if golden == current {
        return (None, DiffStatus::Same);
    }
    // A different fingerprint is explained by the numeric rows.
    if field == "fingerprint" {
        return (None, DiffStatus::Changed);
    }
    // Different inputs make every other row incomparable.
    if field.starts_with("params.") {
        return (None, DiffStatus::Alert);
    }

    let Some((g, c)) = golden.parse::<f64>().ok().zip(current.parse::<f64>().ok()) else {
        return (None, DiffStatus::Alert);
    };
    let delta = c - g;
    let scale = g.abs().max(c.abs());
    if scale > 0.0 && delta.abs() / scale <= RELATIVE_TOLERANCE {
        return (Some(delta), DiffStatus::Changed);
    }
    (Some(delta), DiffStatus::Alert)
}

#[must_use]
pub fn render_plain(report: &SnapshotDiffReport) -> String {
    let mut out = String::new();

    let w_field: usize = 28;
    let w_val: usize = 24;
    let w_delta: usize = 14;
    let w_status: usize = 8;

    writeln!(out, "depth sweep snapshot diff (scenario={})", report.scenario_id).ok();

    writeln!(
        out,
        "{:<w_field$} {:<w_val$} {:<w_val$} {:<w_delta$} {:<w_status$}",
        "field", "golden", "current", "delta", "status",
    )
    .ok();

    writeln!(
        out,
        "{}",
        "-".repeat(w_field + w_val + w_val + w_delta + w_status + 4)
    )
    .ok();

    for row in &report.rows {
        let delta = row
            .delta
            .map(|d| format!("{d:+.3e}"))
            .unwrap_or_default();
        let status = match row.status {
            DiffStatus::Same => "OK",
            DiffStatus::Changed => "CHG",
            DiffStatus::Alert => "ALERT",
        };

        writeln!(
            out,
            "{:<w_field$} {:<w_val$} {:<w_val$} {:<w_delta$} {}",
            truncate(&row.field, w_field),
            truncate(&row.golden, w_val),
            truncate(&row.current, w_val),
            truncate(&delta, w_delta),
            status,
        )
        .ok();
    }

    writeln!(
        out,
        "same={} changed={} alert={}",
        report.count(DiffStatus::Same),
        report.count(DiffStatus::Changed),
        report.count(DiffStatus::Alert)
    )
    .ok();
    out
}

/// Cut `s` to `width` characters, marking the cut with `...`.
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    if width <= 3 {
        return s.chars().take(width).collect();
    }
    let head: String = s.chars().take(width - 3).collect();
    format!("{head}...")
}
