//! CLI entrypoint for the bucketrisk harness.

use std::path::{Path, PathBuf};

use bucketrisk_harness::snapshot_diff::render_plain;
use bucketrisk_harness::structured_log::validate_log_file;
use bucketrisk_harness::{
    ParamOverrides, RunOutputs, SweepSnapshotFixtureV1, build_sweep_snapshot,
    diff_sweep_snapshots, parse_hop_budgets, render_log_chart, run_logged_comparison,
    run_logged_sweep, series_for, summary_line,
};
use clap::{Args, Parser, Subcommand};

/// Overflow-risk tooling for depth-indexed bucket trees.
#[derive(Debug, Parser)]
#[command(name = "harness")]
#[command(about = "Bucket overflow probability sweeps, reports and snapshots")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Model parameters. Later sources win: preset, then file, then flags.
#[derive(Debug, Args)]
struct ParamArgs {
    /// Named parameter set (`analysis` or `deployment`).
    #[arg(long)]
    preset: Option<String>,
    /// JSON file with any subset of the parameter fields.
    #[arg(long = "params")]
    params_file: Option<PathBuf>,
    /// Bucket capacity Z.
    #[arg(long)]
    capacity: Option<u64>,
    /// Total item count x.
    #[arg(long)]
    items: Option<u64>,
    /// Sampled paths per item y.
    #[arg(long)]
    paths: Option<u64>,
    /// Deepest depth D of the grid 0..=D.
    #[arg(long)]
    max_depth: Option<u32>,
    /// Hop budget ΔExp.
    #[arg(long)]
    hop_budget: Option<u32>,
    /// `saturating` (default) or `literal`.
    #[arg(long)]
    tail_policy: Option<String>,
}

impl From<ParamArgs> for ParamOverrides {
    fn from(args: ParamArgs) -> Self {
        Self {
            preset: args.preset,
            params_file: args.params_file,
            capacity: args.capacity,
            items: args.items,
            paths: args.paths,
            max_depth: args.max_depth,
            hop_budget: args.hop_budget,
            tail_policy: args.tail_policy,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sweep every depth, print the peak and a log-axis chart.
    Sweep {
        #[command(flatten)]
        params: ParamArgs,
        /// Output report path (markdown); a JSON sibling is written too.
        #[arg(long)]
        report: Option<PathBuf>,
        /// Structured JSONL log path.
        #[arg(long)]
        log: Option<PathBuf>,
        /// Chart height in lines.
        #[arg(long, default_value_t = 16)]
        chart_rows: usize,
    },
    /// Overlay sweeps for several hop budgets.
    Compare {
        #[command(flatten)]
        params: ParamArgs,
        /// Comma-separated hop budgets.
        #[arg(long, default_value = "10,100,1000")]
        hop_budgets: String,
        /// Structured JSONL log path.
        #[arg(long)]
        log: Option<PathBuf>,
        /// Chart height in lines.
        #[arg(long, default_value_t = 16)]
        chart_rows: usize,
    },
    /// Capture a deterministic sweep snapshot as a fixture.
    Snapshot {
        #[command(flatten)]
        params: ParamArgs,
        /// Output path for fixture JSON.
        #[arg(long)]
        output: PathBuf,
    },
    /// Diff two sweep snapshot fixtures (golden vs current).
    DiffSnapshot {
        /// Golden fixture path.
        #[arg(long)]
        golden: PathBuf,
        /// Current fixture path.
        #[arg(long)]
        current: PathBuf,
        /// Include every per-depth field (not only the key set).
        #[arg(long)]
        all: bool,
    },
    /// Validate a structured JSONL log file.
    ValidateLog {
        /// Log file path.
        #[arg(long)]
        input: PathBuf,
    },
}

fn run_id() -> String {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    format!("run-{secs}-{}", std::process::id())
}

fn read_fixture(path: &Path) -> Result<SweepSnapshotFixtureV1, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    Ok(SweepSnapshotFixtureV1::from_json(&content)
        .map_err(|e| format!("failed to parse {}: {e}", path.display()))?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Sweep {
            params,
            report,
            log,
            chart_rows,
        } => {
            let resolved = ParamOverrides::from(params).resolve()?;
            let p = &resolved.params;
            eprintln!(
                "Sweeping depths 0..={} (preset={}, Z={}, x={}, y={}, ΔExp={}, tail_policy={})",
                p.max_depth,
                resolved.preset.as_str(),
                p.capacity,
                p.items,
                p.paths,
                p.hop_budget,
                p.tail_policy.as_str()
            );

            let outputs = RunOutputs { report, log };
            let run = run_logged_sweep(&resolved, &outputs, &run_id())?;

            println!("{}", run.report.summary_line());
            println!();
            print!(
                "{}",
                render_log_chart(
                    &[series_for(&run.sweep)],
                    "Overflow probability by depth",
                    chart_rows
                )
            );

            let saturated = run.sweep.saturated_depths();
            if !saturated.is_empty() {
                eprintln!(
                    "{} depth(s) have expected load >= capacity: {saturated:?}",
                    saturated.len()
                );
            }
            for artifact in &run.artifacts {
                eprintln!("Wrote {artifact}");
            }
            if let Some(log) = &outputs.log {
                eprintln!("Wrote log to {}", log.display());
            }
        }
        Command::Compare {
            params,
            hop_budgets,
            log,
            chart_rows,
        } => {
            let resolved = ParamOverrides::from(params).resolve()?;
            let budgets = parse_hop_budgets(&hop_budgets)?;
            eprintln!("Comparing hop budgets {budgets:?}");

            let sweeps = run_logged_comparison(&resolved, &budgets, log.as_deref(), &run_id())?;
            for sweep in &sweeps {
                println!(
                    "ΔExp={}: {}",
                    sweep.params().hop_budget,
                    summary_line(&sweep.peak())
                );
            }
            println!();
            let series: Vec<_> = sweeps.iter().map(series_for).collect();
            print!(
                "{}",
                render_log_chart(&series, "Overflow probability by depth", chart_rows)
            );
        }
        Command::Snapshot { params, output } => {
            let resolved = ParamOverrides::from(params).resolve()?;
            let fixture = build_sweep_snapshot(&resolved.params)?;
            if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&output, fixture.to_json()?)?;
            eprintln!(
                "Wrote snapshot to {} (fingerprint {})",
                output.display(),
                fixture.fingerprint
            );
        }
        Command::DiffSnapshot {
            golden,
            current,
            all,
        } => {
            let golden_fixture = read_fixture(&golden)?;
            let current_fixture = read_fixture(&current)?;
            let report = diff_sweep_snapshots(&golden_fixture, &current_fixture, all)?;
            print!("{}", render_plain(&report));
            if report.has_alerts() {
                return Err(format!(
                    "snapshot drift: {} vs {}",
                    golden.display(),
                    current.display()
                )
                .into());
            }
        }
        Command::ValidateLog { input } => {
            let (line_count, errors) = validate_log_file(&input)?;
            for err in &errors {
                eprintln!("{err}");
            }
            if !errors.is_empty() {
                return Err(format!(
                    "{} validation error(s) in {line_count} line(s) of {}",
                    errors.len(),
                    input.display()
                )
                .into());
            }
            eprintln!("{}: {line_count} valid line(s)", input.display());
        }
    }

    Ok(())
}
