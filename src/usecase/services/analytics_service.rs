//! Read-only projections over dataset rows: numeric column statistics and
//! chart series sampling.

use std::collections::HashSet;

use crate::domain::entities::dataset::Row;
use crate::domain::entities::numeric::parse_numeric;

/// Rows inspected when guessing whether a column is numeric.
pub const NUMERIC_SAMPLE_ROWS: usize = 50;
/// A column is numeric when strictly more than this share of values parse.
pub const NUMERIC_RATIO: f64 = 0.6;
pub const MAX_CHART_POINTS: usize = 200;
pub const MAX_Y_SERIES: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub name: String,
    pub unique_count: usize,
    pub empty_count: usize,
    pub min: f64,
    pub max: f64,
    pub sum: f64,
    pub mean: f64,
    pub fill_percent: f64,
}

pub fn numeric_columns(columns: &[String], rows: &[Row]) -> Vec<String> {
    let sample = &rows[..rows.len().min(NUMERIC_SAMPLE_ROWS)];
    let denominator = sample.len().max(1) as f64;

    columns
        .iter()
        .filter(|column| {
            let numeric = sample
                .iter()
                .filter(|row| parse_numeric(row.get(column)).is_some())
                .count();
            numeric as f64 / denominator > NUMERIC_RATIO
        })
        .cloned()
        .collect()
}

/// Statistics over every row for columns whose non-empty values are mostly
/// numeric. Other columns are left out.
pub fn column_stats(columns: &[String], rows: &[Row]) -> Vec<ColumnStats> {
    columns
        .iter()
        .filter_map(|column| stats_for_column(column, rows))
        .collect()
}

fn stats_for_column(column: &str, rows: &[Row]) -> Option<ColumnStats> {
    let non_empty: Vec<&str> = rows
        .iter()
        .map(|row| row.get(column))
        .filter(|value| !value.trim().is_empty())
        .collect();
    if non_empty.is_empty() {
        return None;
    }

    let numbers: Vec<f64> = non_empty
        .iter()
        .filter_map(|value| parse_numeric(value))
        .collect();
    if numbers.len() as f64 / non_empty.len() as f64 <= NUMERIC_RATIO {
        return None;
    }

    let empty_count = rows.len() - non_empty.len();
    let unique_count = non_empty.iter().collect::<HashSet<_>>().len();
    let min = numbers.iter().copied().fold(f64::INFINITY, f64::min);
    let max = numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let sum: f64 = numbers.iter().sum();
    let mean = sum / numbers.len() as f64;
    let fill_percent = non_empty.len() as f64 / rows.len() as f64 * 100.0;

    Some(ColumnStats {
        name: column.to_string(),
        unique_count,
        empty_count,
        min,
        max,
        sum,
        mean,
        fill_percent,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartAxes {
    pub x: String,
    pub y: Vec<String>,
}

/// X is the first non-numeric column (or the first column), Y the first
/// numeric one.
pub fn default_axes(columns: &[String], numeric: &[String]) -> Option<ChartAxes> {
    let first = columns.first()?;
    let x = columns
        .iter()
        .find(|column| !numeric.contains(column))
        .unwrap_or(first)
        .clone();
    let y = numeric.first().cloned().into_iter().collect();
    Some(ChartAxes { x, y })
}

impl ChartAxes {
    /// Adds or removes a Y series, never keeping more than [`MAX_Y_SERIES`].
    pub fn toggle_y(&mut self, column: &str) {
        if let Some(pos) = self.y.iter().position(|existing| existing == column) {
            self.y.remove(pos);
        } else {
            self.y.push(column.to_string());
            self.y.truncate(MAX_Y_SERIES);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub label: String,
    /// One value per Y series; unparseable cells plot as 0.
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub x_column: String,
    pub y_columns: Vec<String>,
    pub points: Vec<ChartPoint>,
}

/// Systematic sample of at most [`MAX_CHART_POINTS`] rows: every
/// `max(1, len / MAX_CHART_POINTS)`-th row starting from the first.
pub fn chart_series(rows: &[&Row], axes: &ChartAxes) -> ChartSeries {
    let y_columns: Vec<String> = axes.y.iter().take(MAX_Y_SERIES).cloned().collect();
    if y_columns.is_empty() {
        return ChartSeries {
            x_column: axes.x.clone(),
            y_columns,
            points: Vec::new(),
        };
    }

    let stride = (rows.len() / MAX_CHART_POINTS).max(1);
    let points = rows
        .iter()
        .step_by(stride)
        .take(MAX_CHART_POINTS)
        .map(|row| ChartPoint {
            label: row.get(&axes.x).to_string(),
            values: y_columns
                .iter()
                .map(|column| parse_numeric(row.get(column)).unwrap_or(0.0))
                .collect(),
        })
        .collect();

    ChartSeries {
        x_column: axes.x.clone(),
        y_columns,
        points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(values: &[&str]) -> Vec<Row> {
        values
            .iter()
            .map(|value| [("v", *value)].into_iter().collect())
            .collect()
    }

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn stats_include_mostly_numeric_column() {
        let rows = column(&["10", "20", "", "abc"]);
        let stats = column_stats(&names(&["v"]), &rows);

        assert_eq!(stats.len(), 1);
        let stat = &stats[0];
        assert_eq!(stat.empty_count, 1);
        assert_eq!(stat.unique_count, 3);
        assert_eq!(stat.min, 10.0);
        assert_eq!(stat.max, 20.0);
        assert_eq!(stat.sum, 30.0);
        assert_eq!(stat.mean, 15.0);
        assert_eq!(stat.fill_percent, 75.0);
    }

    #[test]
    fn stats_exclude_mostly_text_and_empty_columns() {
        let rows = column(&["10", "abc", "abc"]);
        assert!(column_stats(&names(&["v"]), &rows).is_empty());

        let rows = column(&["", " "]);
        assert!(column_stats(&names(&["v"]), &rows).is_empty());
    }

    #[test]
    fn numeric_detection_samples_first_fifty_rows() {
        let mut values = vec!["1"; NUMERIC_SAMPLE_ROWS];
        values.extend(vec!["text"; 500]);
        let rows = column(&values);
        assert_eq!(numeric_columns(&names(&["v"]), &rows), names(&["v"]));

        let rows = column(&["1", "x", "y"]);
        assert!(numeric_columns(&names(&["v"]), &rows).is_empty());
    }

    #[test]
    fn default_axes_pick_text_x_and_numeric_y() {
        let columns = names(&["amount", "city", "count"]);
        let numeric = names(&["amount", "count"]);
        let axes = default_axes(&columns, &numeric).expect("should build axes");
        assert_eq!(axes.x, "city");
        assert_eq!(axes.y, names(&["amount"]));
    }

    #[test]
    fn toggle_y_caps_series_count() {
        let mut axes = ChartAxes {
            x: "x".to_string(),
            y: Vec::new(),
        };
        for name in ["a", "b", "c", "d", "e", "f"] {
            axes.toggle_y(name);
        }
        assert_eq!(axes.y, names(&["a", "b", "c", "d", "e"]));

        axes.toggle_y("b");
        assert_eq!(axes.y, names(&["a", "c", "d", "e"]));
    }

    #[test]
    fn chart_series_samples_with_fixed_stride() {
        let rows: Vec<Row> = (0..1000)
            .map(|idx| {
                [("x", format!("r{idx}")), ("y", idx.to_string())]
                    .into_iter()
                    .collect()
            })
            .collect();
        let refs: Vec<&Row> = rows.iter().collect();
        let axes = ChartAxes {
            x: "x".to_string(),
            y: names(&["y"]),
        };

        let series = chart_series(&refs, &axes);
        assert_eq!(series.points.len(), MAX_CHART_POINTS);
        assert_eq!(series.points[0].label, "r0");
        assert_eq!(series.points[1].label, "r5");
        assert_eq!(series.points[1].values, vec![5.0]);
        assert_eq!(chart_series(&refs, &axes), series);
    }

    #[test]
    fn chart_series_plots_unparseable_values_as_zero() {
        let rows: Vec<Row> = vec![[("x", "a"), ("y", "n/a")].into_iter().collect()];
        let refs: Vec<&Row> = rows.iter().collect();
        let axes = ChartAxes {
            x: "x".to_string(),
            y: names(&["y"]),
        };
        assert_eq!(chart_series(&refs, &axes).points[0].values, vec![0.0]);
    }
}
