//! Depth sweep: expected load and overflow probability for every depth in
//! `0..=D`, plus the depth of maximum risk.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::ParamError;
use crate::load::expected_load;
use crate::overflow::{OverflowRegime, overflow_probability};
use crate::params::ModelParams;

const FINGERPRINT_DOMAIN: &[u8] = b"bucketrisk/depth-sweep/v1";

/// Depth with the highest overflow probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakRisk {
    pub depth: u32,
    pub probability: f64,
    pub expected_load: f64,
}

/// One depth of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthRow {
    pub depth: u32,
    pub expected_load: f64,
    pub probability: f64,
    pub regime: OverflowRegime,
}

/// Parallel per-depth sequences produced by one sweep.
///
/// Index `i` of every sequence is depth `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthSweep {
    params: ModelParams,
    expected_loads: Vec<f64>,
    probabilities: Vec<f64>,
    regimes: Vec<OverflowRegime>,
}

/// Validate `params`, then evaluate every depth of the grid.
pub fn run_sweep(params: &ModelParams) -> Result<DepthSweep, ParamError> {
    params.validate()?;

    let expected_loads: Vec<f64> = params
        .depths()
        .map(|depth| expected_load(params.hop_budget, depth, params.items, params.paths))
        .collect();

    let (probabilities, regimes): (Vec<f64>, Vec<OverflowRegime>) = expected_loads
        .iter()
        .map(|&load| {
            let est = overflow_probability(params.capacity, load, params.tail_policy);
            (est.probability, est.regime)
        })
        .unzip();

    Ok(DepthSweep {
        params: *params,
        expected_loads,
        probabilities,
        regimes,
    })
}

/// One sweep per hop budget, in the order given. Other parameters are
/// shared.
pub fn compare_hop_budgets(
    params: &ModelParams,
    hop_budgets: &[u32],
) -> Result<Vec<DepthSweep>, ParamError> {
    if hop_budgets.is_empty() {
        return Err(ParamError::EmptyHopBudgets);
    }
    hop_budgets
        .iter()
        .map(|&budget| run_sweep(&params.with_hop_budget(budget)))
        .collect()
}

/// Index and value of the maximum; ties go to the smallest index.
///
/// Returns `None` for an empty slice.
#[must_use]
pub fn argmax_first(values: &[f64]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, top)) if v <= top => {}
            _ => best = Some((i, v)),
        }
    }
    best
}

impl DepthSweep {
    #[must_use]
    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    #[must_use]
    pub fn expected_loads(&self) -> &[f64] {
        &self.expected_loads
    }

    #[must_use]
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    #[must_use]
    pub fn regimes(&self) -> &[OverflowRegime] {
        &self.regimes
    }

    /// Number of depths (`D + 1`).
    #[must_use]
    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    /// Depth of maximum overflow probability (first occurrence on ties).
    #[must_use]
    pub fn peak(&self) -> PeakRisk {
        // The grid always holds depth 0.
        let (index, probability) = argmax_first(&self.probabilities).unwrap_or((0, 0.0));
        PeakRisk {
            depth: index as u32,
            probability,
            expected_load: self.expected_loads.get(index).copied().unwrap_or(0.0),
        }
    }

    /// Per-depth records in depth order.
    pub fn rows(&self) -> impl Iterator<Item = DepthRow> + '_ {
        self.expected_loads
            .iter()
            .zip(&self.probabilities)
            .zip(&self.regimes)
            .enumerate()
            .map(|(depth, ((&expected_load, &probability), &regime))| DepthRow {
                depth: depth as u32,
                expected_load,
                probability,
                regime,
            })
    }

    /// Depths whose expected load reaches capacity.
    #[must_use]
    pub fn saturated_depths(&self) -> Vec<u32> {
        self.rows()
            .filter(|row| row.regime == OverflowRegime::Saturated)
            .map(|row| row.depth)
            .collect()
    }

    /// SHA-256 over the parameters and the exact bit patterns of both
    /// sequences, as lowercase hex. Equal fingerprints mean bit-identical
    /// sweeps.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let p = &self.params;
        let mut hasher = Sha256::new();
        hasher.update(FINGERPRINT_DOMAIN);
        hasher.update(p.capacity.to_le_bytes());
        hasher.update(p.items.to_le_bytes());
        hasher.update(p.paths.to_le_bytes());
        hasher.update(p.max_depth.to_le_bytes());
        hasher.update(p.hop_budget.to_le_bytes());
        hasher.update(p.tail_policy.as_str().as_bytes());
        for v in self.expected_loads.iter().chain(&self.probabilities) {
            hasher.update(v.to_bits().to_le_bytes());
        }
        hex_lower(&hasher.finalize())
    }
}

/// Lowercase hex of a digest, two characters per byte.
pub fn hex_lower(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        write!(&mut out, "{byte:02x}").ok();
    }
    out
}
