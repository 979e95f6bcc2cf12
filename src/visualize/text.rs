//! Plain-text rendering of a [`VisualizationSpec`].

use std::fmt::Write;

use crate::present::pad_right;

use super::VisualizationSpec;

const BAR_WIDTH: usize = 40;

pub fn render_text(spec: &VisualizationSpec) -> String {
    let mut out = String::new();
    match spec {
        VisualizationSpec::Histogram { bins } => {
            let peak = bins.iter().map(|b| b.count).max().unwrap_or(0);
            for bin in bins {
                let _ = writeln!(
                    out,
                    "[{:>8.1}, {:>8.1}] {:<width$} {}",
                    bin.lower,
                    bin.upper,
                    bar(bin.count as f64, peak as f64),
                    bin.count,
                    width = BAR_WIDTH
                );
            }
        }
        VisualizationSpec::Bar { bars, artists } => {
            let peak = bars.iter().map(|b| b.duration).max().unwrap_or(0);
            let label_width = bars
                .iter()
                .map(|b| unicode_width::UnicodeWidthStr::width(b.title.as_str()))
                .max()
                .unwrap_or(0);
            for b in bars {
                let group = artists.iter().position(|a| *a == b.artist).unwrap_or(0) + 1;
                let _ = writeln!(
                    out,
                    "{} {:<width$} {:>5}s  ({group}) {}",
                    pad_right(&b.title, label_width),
                    bar(b.duration as f64, peak as f64),
                    b.duration,
                    b.artist,
                    width = BAR_WIDTH
                );
            }
        }
        VisualizationSpec::Line { points } => {
            let peak = points.iter().map(|p| p.duration).max().unwrap_or(0);
            for p in points {
                let _ = writeln!(
                    out,
                    "#{:<4} {:>5}s {}",
                    p.position,
                    p.duration,
                    marker_at(p.duration as f64, peak as f64)
                );
            }
        }
        VisualizationSpec::Scatter { points, artists } => {
            for p in points {
                let group = artists.iter().position(|a| *a == p.artist).unwrap_or(0) + 1;
                let _ = writeln!(
                    out,
                    "#{:<4} {:>5}s  size {:.2}  ({group}) {}",
                    p.position, p.duration, p.size, p.artist
                );
            }
        }
        VisualizationSpec::Heatmap { columns, matrix } => {
            let width = columns.iter().map(|c| c.len()).max().unwrap_or(0).max(6);
            let _ = write!(out, "{:width$}", "");
            for column in columns {
                let _ = write!(out, " {column:>width$}");
            }
            out.push('\n');
            for (column, row) in columns.iter().zip(matrix) {
                let _ = write!(out, "{column:<width$}");
                for cell in row {
                    match cell {
                        Some(r) => {
                            let _ = write!(out, " {r:>width$.2}");
                        }
                        None => {
                            let _ = write!(out, " {:>width$}", "NaN");
                        }
                    }
                }
                out.push('\n');
            }
        }
    }
    out
}

fn bar(value: f64, peak: f64) -> String {
    "#".repeat(scaled(value, peak))
}

fn marker_at(value: f64, peak: f64) -> String {
    format!("{}*", " ".repeat(scaled(value, peak).saturating_sub(1)))
}

fn scaled(value: f64, peak: f64) -> usize {
    if peak <= 0.0 {
        return 0;
    }
    ((value / peak) * BAR_WIDTH as f64).round() as usize
}
