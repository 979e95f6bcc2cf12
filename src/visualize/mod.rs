//! Derived charts of the track category.

use std::{fmt::Display, str::FromStr};

use serde::Serialize;
use thiserror::Error;

use crate::domain::{
    category::{ChartCategory, columns::*},
    record::{ChartTable, Record, Value},
};

mod stats;
pub mod text;

pub const HISTOGRAM_BINS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ChartVisualizationKind {
    #[value(name = "histogram")]
    DurationHistogram,
    #[value(name = "bar")]
    DurationByArtistBar,
    #[value(name = "line")]
    DurationByPositionLine,
    #[value(name = "scatter")]
    DurationPositionScatter,
    #[value(name = "heatmap")]
    CorrelationHeatmap,
}

impl ChartVisualizationKind {
    pub const ALL: [ChartVisualizationKind; 5] = [
        ChartVisualizationKind::DurationHistogram,
        ChartVisualizationKind::DurationByArtistBar,
        ChartVisualizationKind::DurationByPositionLine,
        ChartVisualizationKind::DurationPositionScatter,
        ChartVisualizationKind::CorrelationHeatmap,
    ];

    /// Identifier used on the command line and in query strings.
    pub fn key(self) -> &'static str {
        match self {
            ChartVisualizationKind::DurationHistogram => "histogram",
            ChartVisualizationKind::DurationByArtistBar => "bar",
            ChartVisualizationKind::DurationByPositionLine => "line",
            ChartVisualizationKind::DurationPositionScatter => "scatter",
            ChartVisualizationKind::CorrelationHeatmap => "heatmap",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChartVisualizationKind::DurationHistogram => "Histograma de Duración",
            ChartVisualizationKind::DurationByArtistBar => "Gráfico de Barras",
            ChartVisualizationKind::DurationByPositionLine => "Gráfico de Líneas",
            ChartVisualizationKind::DurationPositionScatter => "Dispersión",
            ChartVisualizationKind::CorrelationHeatmap => "Mapa de Calor",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ChartVisualizationKind::DurationHistogram => {
                "Distribución de la Duración de Canciones"
            }
            ChartVisualizationKind::DurationByArtistBar => "Duración de Canciones por Artista",
            ChartVisualizationKind::DurationByPositionLine => {
                "Duración por Posición en el Ranking"
            }
            ChartVisualizationKind::DurationPositionScatter => "Dispersión: Duración vs. Posición",
            ChartVisualizationKind::CorrelationHeatmap => "Mapa de Calor: Correlaciones",
        }
    }
}

impl Display for ChartVisualizationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[derive(Debug, Error)]
#[error("unknown visualization '{0}'")]
pub struct UnknownVisualization(pub String);

impl FromStr for ChartVisualizationKind {
    type Err = UnknownVisualization;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChartVisualizationKind::ALL
            .into_iter()
            .find(|kind| kind.key() == s)
            .ok_or_else(|| UnknownVisualization(s.to_string()))
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum VisualizationError {
    #[error("visualizations are only available for tracks, not {0}")]
    UnsupportedCategory(ChartCategory),

    #[error("fewer than two numeric columns, nothing to correlate")]
    InsufficientData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub title: String,
    pub artist: String,
    pub duration: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinePoint {
    pub position: i64,
    pub duration: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub position: i64,
    pub duration: i64,
    pub artist: String,
    /// marker size relative to the longest track, in `0.0..=1.0`
    pub size: f64,
}

/// Data needed to draw one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VisualizationSpec {
    Histogram {
        bins: Vec<HistogramBin>,
    },
    Bar {
        bars: Vec<Bar>,
        /// color groups, in order of first appearance
        artists: Vec<String>,
    },
    Line {
        points: Vec<LinePoint>,
    },
    Scatter {
        points: Vec<ScatterPoint>,
        artists: Vec<String>,
    },
    Heatmap {
        columns: Vec<String>,
        /// Pearson coefficients, `None` where undefined
        matrix: Vec<Vec<Option<f64>>>,
    },
}

/// Computes the chart `kind` from a normalized track table.
pub fn compute_visualization(
    kind: ChartVisualizationKind,
    table: &ChartTable,
) -> Result<VisualizationSpec, VisualizationError> {
    if table.category != ChartCategory::Track {
        return Err(VisualizationError::UnsupportedCategory(table.category));
    }
    let records = &table.records;

    Ok(match kind {
        ChartVisualizationKind::DurationHistogram => VisualizationSpec::Histogram {
            bins: stats::histogram(&durations(records), HISTOGRAM_BINS),
        },
        ChartVisualizationKind::DurationByArtistBar => VisualizationSpec::Bar {
            bars: records
                .iter()
                .map(|r| Bar {
                    title: cell_text(r, TITLE),
                    artist: cell_text(r, ARTIST),
                    duration: duration(r),
                })
                .collect(),
            artists: artist_groups(records),
        },
        ChartVisualizationKind::DurationByPositionLine => {
            let mut points: Vec<_> = records
                .iter()
                .map(|r| LinePoint {
                    position: r.position().unwrap_or_default(),
                    duration: duration(r),
                })
                .collect();
            points.sort_by_key(|p| p.position);
            VisualizationSpec::Line { points }
        }
        ChartVisualizationKind::DurationPositionScatter => {
            let longest = durations(records).into_iter().max().unwrap_or(0);
            VisualizationSpec::Scatter {
                points: records
                    .iter()
                    .map(|r| ScatterPoint {
                        position: r.position().unwrap_or_default(),
                        duration: duration(r),
                        artist: cell_text(r, ARTIST),
                        size: if longest > 0 {
                            duration(r) as f64 / longest as f64
                        } else {
                            0.0
                        },
                    })
                    .collect(),
                artists: artist_groups(records),
            }
        }
        ChartVisualizationKind::CorrelationHeatmap => correlation_heatmap(table)?,
    })
}

fn correlation_heatmap(table: &ChartTable) -> Result<VisualizationSpec, VisualizationError> {
    let numeric = numeric_columns(table);
    if numeric.len() < 2 {
        return Err(VisualizationError::InsufficientData);
    }

    let series: Vec<Vec<f64>> = numeric
        .iter()
        .map(|column| {
            table
                .column_values(column)
                .filter_map(Value::as_integer)
                .map(|n| n as f64)
                .collect()
        })
        .collect();

    let matrix = series
        .iter()
        .map(|x| series.iter().map(|y| stats::pearson(x, y)).collect())
        .collect();

    Ok(VisualizationSpec::Heatmap {
        columns: numeric.iter().map(|c| c.to_string()).collect(),
        matrix,
    })
}

/// Columns holding an integer in every record, in column order.
pub fn numeric_columns(table: &ChartTable) -> Vec<&'static str> {
    if table.is_empty() {
        return Vec::new();
    }
    table
        .columns()
        .iter()
        .copied()
        .filter(|column| {
            table
                .records
                .iter()
                .all(|r| matches!(r.get(column), Some(Value::Integer(_))))
        })
        .collect()
}

fn durations(records: &[Record]) -> Vec<i64> {
    records.iter().map(duration).collect()
}

fn duration(record: &Record) -> i64 {
    record
        .get(DURATION_SECONDS)
        .and_then(Value::as_integer)
        .unwrap_or(0)
}

fn cell_text(record: &Record, column: &str) -> String {
    record
        .get(column)
        .and_then(Value::display)
        .unwrap_or_default()
}

fn artist_groups(records: &[Record]) -> Vec<String> {
    let mut artists: Vec<String> = Vec::new();
    for record in records {
        let artist = cell_text(record, ARTIST);
        if !artists.contains(&artist) {
            artists.push(artist);
        }
    }
    artists
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::normalize::normalize_table;

    fn tracks(entries: &[(&str, &str, i64)]) -> ChartTable {
        let items: Vec<_> = entries
            .iter()
            .map(|(title, artist, duration)| {
                json!({
                    "title": title,
                    "artist": {"name": artist},
                    "album": {"title": "album"},
                    "duration": duration,
                    "preview": "http://preview"
                })
            })
            .collect();
        normalize_table(ChartCategory::Track, &items)
    }

    fn sample() -> ChartTable {
        tracks(&[
            ("One", "Alpha", 200),
            ("Two", "Beta", 150),
            ("Three", "Alpha", 240),
            ("Four", "Gamma", 100),
        ])
    }

    #[test]
    fn test_non_track_tables_are_rejected() {
        let albums = normalize_table(ChartCategory::Album, &[json!({"title": "A"})]);

        for kind in ChartVisualizationKind::ALL {
            assert_eq!(
                compute_visualization(kind, &albums),
                Err(VisualizationError::UnsupportedCategory(ChartCategory::Album))
            );
        }
    }

    #[test]
    fn test_histogram_counts_every_record() -> anyhow::Result<()> {
        let spec = compute_visualization(ChartVisualizationKind::DurationHistogram, &sample())?;

        let VisualizationSpec::Histogram { bins } = spec else {
            panic!("expected histogram, got {spec:?}");
        };
        assert_eq!(bins.len(), HISTOGRAM_BINS);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 4);
        assert_eq!(bins[0].lower, 100.0);
        assert_eq!(bins[HISTOGRAM_BINS - 1].upper, 240.0);
        assert_eq!(bins[0].count, 1);
        assert_eq!(bins[HISTOGRAM_BINS - 1].count, 1);
        Ok(())
    }

    #[test]
    fn test_bar_groups_by_artist_in_first_appearance_order() -> anyhow::Result<()> {
        let spec = compute_visualization(ChartVisualizationKind::DurationByArtistBar, &sample())?;

        let VisualizationSpec::Bar { bars, artists } = spec else {
            panic!("expected bar chart, got {spec:?}");
        };
        assert_eq!(artists, vec!["Alpha", "Beta", "Gamma"]);
        assert_eq!(bars.len(), 4);
        assert_eq!(
            bars[2],
            Bar {
                title: "Three".into(),
                artist: "Alpha".into(),
                duration: 240
            }
        );
        Ok(())
    }

    #[test]
    fn test_line_follows_position() -> anyhow::Result<()> {
        let spec = compute_visualization(ChartVisualizationKind::DurationByPositionLine, &sample())?;

        let VisualizationSpec::Line { points } = spec else {
            panic!("expected line chart, got {spec:?}");
        };
        let positions: Vec<_> = points.iter().map(|p| p.position).collect();
        let durations: Vec<_> = points.iter().map(|p| p.duration).collect();
        assert_eq!(positions, vec![1, 2, 3, 4]);
        assert_eq!(durations, vec![200, 150, 240, 100]);
        Ok(())
    }

    #[test]
    fn test_scatter_size_is_relative_to_longest() -> anyhow::Result<()> {
        let spec =
            compute_visualization(ChartVisualizationKind::DurationPositionScatter, &sample())?;

        let VisualizationSpec::Scatter { points, .. } = spec else {
            panic!("expected scatter, got {spec:?}");
        };
        assert_eq!(points[2].size, 1.0);
        assert_eq!(points[3].size, 100.0 / 240.0);
        assert_eq!(points[1].artist, "Beta");
        Ok(())
    }

    #[test]
    fn test_scatter_with_zero_durations_has_zero_size() -> anyhow::Result<()> {
        let table = tracks(&[("a", "x", 0), ("b", "y", 0)]);

        let spec = compute_visualization(ChartVisualizationKind::DurationPositionScatter, &table)?;

        let VisualizationSpec::Scatter { points, .. } = spec else {
            panic!("expected scatter, got {spec:?}");
        };
        assert!(points.iter().all(|p| p.size == 0.0));
        Ok(())
    }

    #[test]
    fn test_heatmap_correlates_position_and_duration() -> anyhow::Result<()> {
        let table = tracks(&[("a", "x", 100), ("b", "x", 200), ("c", "x", 300)]);

        let spec = compute_visualization(ChartVisualizationKind::CorrelationHeatmap, &table)?;

        let VisualizationSpec::Heatmap { columns, matrix } = spec else {
            panic!("expected heatmap, got {spec:?}");
        };
        assert_eq!(columns, vec![POSITION, DURATION_SECONDS]);
        assert_eq!(matrix.len(), 2);
        for row in &matrix {
            for cell in row {
                let r = cell.expect("defined correlation");
                assert!((r - 1.0).abs() < 1e-9, "{r}");
            }
        }
        Ok(())
    }

    #[test]
    fn test_heatmap_is_symmetric() -> anyhow::Result<()> {
        let spec = compute_visualization(ChartVisualizationKind::CorrelationHeatmap, &sample())?;

        let VisualizationSpec::Heatmap { matrix, .. } = spec else {
            panic!("expected heatmap, got {spec:?}");
        };
        assert_eq!(matrix[0][1], matrix[1][0]);
        let diagonal = matrix[0][0].expect("non-constant column");
        assert!((diagonal - 1.0).abs() < 1e-12, "{diagonal}");
        Ok(())
    }

    #[test]
    fn test_heatmap_with_single_numeric_column_is_insufficient() {
        let mut table = sample();
        for record in &mut table.records {
            let cells = record
                .cells()
                .iter()
                .map(|(name, value)| {
                    if *name == DURATION_SECONDS {
                        (*name, Value::Text("unknown".into()))
                    } else {
                        (*name, value.clone())
                    }
                })
                .collect();
            *record = Record::new(cells);
        }

        assert_eq!(numeric_columns(&table), vec![POSITION]);
        assert_eq!(
            compute_visualization(ChartVisualizationKind::CorrelationHeatmap, &table),
            Err(VisualizationError::InsufficientData)
        );
    }

    #[test]
    fn test_heatmap_on_empty_table_is_insufficient() {
        let table = ChartTable::new(ChartCategory::Track, vec![]);

        assert_eq!(
            compute_visualization(ChartVisualizationKind::CorrelationHeatmap, &table),
            Err(VisualizationError::InsufficientData)
        );
    }

    #[test]
    fn test_kind_keys_parse_back() -> anyhow::Result<()> {
        for kind in ChartVisualizationKind::ALL {
            assert_eq!(kind.key().parse::<ChartVisualizationKind>()?, kind);
        }
        assert!("pie".parse::<ChartVisualizationKind>().is_err());
        Ok(())
    }
}
