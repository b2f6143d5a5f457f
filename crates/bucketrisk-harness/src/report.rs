//! Report generation for depth sweeps.

use bucketrisk_model::{DepthSweep, ModelParams, OverflowRegime, PeakRisk};
use serde::{Deserialize, Serialize};

/// One depth of a [`RiskReport`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRow {
    pub depth: u32,
    pub expected_load: f64,
    pub probability: f64,
    /// `None` when the probability is exactly zero.
    pub log10_probability: Option<f64>,
    pub regime: OverflowRegime,
}

/// A risk report combining parameters, peak, and per-depth rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskReport {
    /// Report title.
    pub title: String,
    /// Preset the parameters started from.
    pub preset: String,
    /// Timestamp (UTC).
    pub timestamp: String,
    pub params: ModelParams,
    pub peak: PeakRisk,
    /// SHA-256 of the sweep outputs.
    pub fingerprint: String,
    pub saturated_depths: Vec<u32>,
    pub rows: Vec<ReportRow>,
}

impl RiskReport {
    #[must_use]
    pub fn from_sweep(
        title: impl Into<String>,
        preset: impl Into<String>,
        timestamp: impl Into<String>,
        sweep: &DepthSweep,
    ) -> Self {
        let rows = sweep
            .rows()
            .map(|row| ReportRow {
                depth: row.depth,
                expected_load: row.expected_load,
                probability: row.probability,
                log10_probability: (row.probability > 0.0).then(|| row.probability.log10()),
                regime: row.regime,
            })
            .collect();
        Self {
            title: title.into(),
            preset: preset.into(),
            timestamp: timestamp.into(),
            params: *sweep.params(),
            peak: sweep.peak(),
            fingerprint: sweep.fingerprint(),
            saturated_depths: sweep.saturated_depths(),
            rows,
        }
    }

    /// `Maximum Probability: {p} at Depth: {d}`.
    #[must_use]
    pub fn summary_line(&self) -> String {
        summary_line(&self.peak)
    }

    /// Render the report as markdown.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let p = &self.params;
        let mut out = String::new();
        out.push_str(&format!("# {}\n\n", self.title));
        out.push_str(&format!("- Preset: {}\n", self.preset));
        out.push_str(&format!("- Timestamp: {}\n", self.timestamp));
        out.push_str(&format!(
            "- Parameters: Z={}, x={}, y={}, D={}, ΔExp={}\n",
            p.capacity, p.items, p.paths, p.max_depth, p.hop_budget
        ));
        out.push_str(&format!("- Tail policy: {}\n", p.tail_policy.as_str()));
        out.push_str(&format!("- {}\n", self.summary_line()));
        if self.saturated_depths.is_empty() {
            out.push_str("- Saturated depths: none\n");
        } else {
            let depths: Vec<String> = self.saturated_depths.iter().map(u32::to_string).collect();
            out.push_str(&format!("- Saturated depths: {}\n", depths.join(", ")));
        }
        out.push_str(&format!("- Fingerprint: `{}`\n\n", self.fingerprint));

        out.push_str("| Depth | E[d] | P[d] | log10 P | Regime |\n");
        out.push_str("|------:|-----:|-----:|--------:|--------|\n");
        for r in &self.rows {
            let log10 = r
                .log10_probability
                .map_or_else(|| String::from("-inf"), |v| format!("{v:.3}"));
            out.push_str(&format!(
                "| {} | {:.6e} | {:.6e} | {} | {} |\n",
                r.depth,
                r.expected_load,
                r.probability,
                log10,
                r.regime.as_str()
            ));
        }
        out
    }

    /// Render the report as JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}

/// Summary line for a peak.
#[must_use]
pub fn summary_line(peak: &PeakRisk) -> String {
    format!(
        "Maximum Probability: {:e} at Depth: {}",
        peak.probability, peak.depth
    )
}
