//! Deterministic snapshot capture for depth sweeps.
//!
//! Output is intended for fixture diffing and sha256 gating:
//! - no timestamps
//! - stable ordering (one row per depth, ascending)
//! - exact `f64` bit patterns next to the decimal values

use bucketrisk_model::{ModelParams, ParamError, run_sweep};
use serde::{Deserialize, Serialize};

pub const FIXTURE_VERSION: &str = "v1";
const SCENARIO_ID: &str = "depth_sweep";

/// Deterministic snapshot fixture schema (v1).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SweepSnapshotFixtureV1 {
    pub version: String,
    pub scenario: SweepScenarioV1,
    pub fingerprint: String,
    pub peak: PeakSnapshotV1,
    pub saturated_depths: Vec<u32>,
    pub rows: Vec<DepthSnapshotV1>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SweepScenarioV1 {
    pub id: String,
    pub params: ModelParams,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PeakSnapshotV1 {
    pub depth: u32,
    pub probability: f64,
    pub probability_bits: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DepthSnapshotV1 {
    pub depth: u32,
    pub expected_load: f64,
    pub expected_load_bits: String,
    pub probability: f64,
    pub probability_bits: String,
    pub regime: String,
}

fn bits(v: f64) -> String {
    format!("0x{:016x}", v.to_bits())
}

/// Run one sweep and capture it as a fixture.
pub fn build_sweep_snapshot(params: &ModelParams) -> Result<SweepSnapshotFixtureV1, ParamError> {
    let sweep = run_sweep(params)?;
    let peak = sweep.peak();
    let rows = sweep
        .rows()
        .map(|row| DepthSnapshotV1 {
            depth: row.depth,
            expected_load: row.expected_load,
            expected_load_bits: bits(row.expected_load),
            probability: row.probability,
            probability_bits: bits(row.probability),
            regime: row.regime.as_str().to_string(),
        })
        .collect();

    Ok(SweepSnapshotFixtureV1 {
        version: String::from(FIXTURE_VERSION),
        scenario: SweepScenarioV1 {
            id: String::from(SCENARIO_ID),
            params: *params,
        },
        fingerprint: sweep.fingerprint(),
        peak: PeakSnapshotV1 {
            depth: peak.depth,
            probability: peak.probability,
            probability_bits: bits(peak.probability),
        },
        saturated_depths: sweep.saturated_depths(),
        rows,
    })
}

impl SweepSnapshotFixtureV1 {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
