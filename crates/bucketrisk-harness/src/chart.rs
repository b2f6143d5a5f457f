//! Plain-text chart of overflow probability against depth on a log10 axis.
//!
//! One glyph per series, one three-character column per depth. Depths with
//! probability exactly zero have no logarithm and are left off the plot.

use std::fmt::Write as _;

use bucketrisk_model::DepthSweep;

const GLYPHS: &[char] = &['*', 'o', '+', 'x', '#', '@'];
const OVERLAP: char = '&';
const LABEL_WIDTH: usize = 8;
const COLUMN_WIDTH: usize = 3;
const TICK_EVERY: usize = 5;

/// Probabilities indexed by depth, with a legend label.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub label: String,
    pub values: Vec<f64>,
}

/// Series for one sweep, labelled by its hop budget.
#[must_use]
pub fn series_for(sweep: &DepthSweep) -> ChartSeries {
    ChartSeries {
        label: format!("ΔExp={}", sweep.params().hop_budget),
        values: sweep.probabilities().to_vec(),
    }
}

fn glyph(index: usize) -> char {
    GLYPHS[index % GLYPHS.len()]
}

/// Render `series` as a log-axis scatter `rows` lines tall (at least 2).
#[must_use]
pub fn render_log_chart(series: &[ChartSeries], title: &str, rows: usize) -> String {
    let mut out = String::new();
    writeln!(out, "{title}").ok();

    let logs = series
        .iter()
        .flat_map(|s| s.values.iter())
        .filter(|v| **v > 0.0 && v.is_finite())
        .map(|v| v.log10());
    let (min, max) = logs.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() {
        writeln!(out, "(no positive probabilities to plot)").ok();
        return out;
    }

    let hi = max.ceil();
    let mut lo = min.floor();
    if lo >= hi {
        lo = hi - 1.0;
    }
    let rows = rows.max(2);
    let depths = series.iter().map(|s| s.values.len()).max().unwrap_or(0);
    let width = depths * COLUMN_WIDTH;

    let mut grid = vec![vec![' '; width]; rows];
    for (i, s) in series.iter().enumerate() {
        let mark = glyph(i);
        for (depth, &v) in s.values.iter().enumerate() {
            if !(v > 0.0 && v.is_finite()) {
                continue;
            }
            let frac = (hi - v.log10()) / (hi - lo);
            let row = ((frac * (rows - 1) as f64).round() as usize).min(rows - 1);
            let cell = &mut grid[row][depth * COLUMN_WIDTH + 1];
            *cell = match *cell {
                ' ' => mark,
                c if c == mark => mark,
                _ => OVERLAP,
            };
        }
    }

    writeln!(out, "log10 P(load > Z)").ok();
    let mid = (rows - 1) / 2;
    for (r, line) in grid.iter().enumerate() {
        let label = if r == 0 || r == mid || r == rows - 1 {
            let value = hi - (hi - lo) * r as f64 / (rows - 1) as f64;
            format!("{value:.1}")
        } else {
            String::new()
        };
        let body: String = line.iter().collect();
        writeln!(out, "{label:>LABEL_WIDTH$} |{}", body.trim_end()).ok();
    }
    writeln!(out, "{:>LABEL_WIDTH$} +{}", "", "-".repeat(width)).ok();

    let mut ticks = vec![' '; width + COLUMN_WIDTH];
    for depth in (0..depths).step_by(TICK_EVERY) {
        for (offset, ch) in depth.to_string().chars().enumerate() {
            ticks[depth * COLUMN_WIDTH + 1 + offset] = ch;
        }
    }
    let ticks: String = ticks.into_iter().collect();
    writeln!(out, "{:>LABEL_WIDTH$}  {}", "", ticks.trim_end()).ok();
    writeln!(out, "{:>LABEL_WIDTH$}  Depth (d)", "").ok();

    let legend: Vec<String> = series
        .iter()
        .enumerate()
        .map(|(i, s)| format!("{} {}", glyph(i), s.label))
        .collect();
    writeln!(out, "Legend: {}", legend.join("  ")).ok();
    if series.len() > 1 {
        writeln!(out, "        {OVERLAP} overlapping series").ok();
    }

    for s in series {
        let omitted = s.values.iter().filter(|v| !(**v > 0.0)).count();
        if omitted > 0 {
            writeln!(out, "note: {} has {omitted} depth(s) with P = 0 (not plotted)", s.label).ok();
        }
    }
    out
}
