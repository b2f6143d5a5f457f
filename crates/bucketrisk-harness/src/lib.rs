//! Reporting and regression tooling for the bucketrisk overflow model.
//!
//! This crate provides:
//! - Parameter resolution: preset, JSON file and flag overrides
//! - Report generation: summary line plus markdown and JSON risk reports
//! - Log-axis chart: plain-text plot of overflow probability per depth
//! - Snapshot capture and diff: deterministic fixtures for drift gating
//! - Logged runs: sweep plus report artifacts plus JSONL trail
//! - Structured logging: JSONL run logs and their validation

pub mod chart;
pub mod report;
pub mod resolve;
pub mod run;
pub mod snapshot;
pub mod snapshot_diff;
pub mod structured_log;

pub use chart::{ChartSeries, render_log_chart, series_for};
pub use report::{RiskReport, summary_line};
pub use resolve::{ParamOverrides, ResolveError, ResolvedParams, parse_hop_budgets};
pub use run::{RunOutputs, SweepRun, run_logged_comparison, run_logged_sweep};
pub use snapshot::{SweepSnapshotFixtureV1, build_sweep_snapshot};
pub use snapshot_diff::{DiffStatus, diff_sweep_snapshots};
