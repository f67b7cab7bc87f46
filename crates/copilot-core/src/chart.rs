//! Renderer-agnostic chart description.
//!
//! Analyses produce a [`ChartSpec`] as plain data; turning it into pixels or
//! terminal cells is the presentation layer's job.

use serde::{Deserialize, Serialize};

/// How the series should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
}

/// One named sequence of values, aligned with [`ChartSpec::categories`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    /// Legend label, if the chart shows one.
    pub label: Option<String>,
    /// One value per category; `None` marks an undefined point.
    pub values: Vec<Option<f64>>,
}

impl ChartSeries {
    /// Build an unlabelled series from fully defined values.
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            label: None,
            values: values.into_iter().map(Some).collect(),
        }
    }

    /// Build a labelled series from fully defined values.
    pub fn labelled(label: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::new(values)
        }
    }

    /// Defined values only, in order.
    pub fn defined(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().flatten().copied()
    }
}

/// Abstract plot: kind, x categories, y series and labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_label: Option<String>,
    pub y_label: String,
    /// Bar labels or x-axis ticks.
    pub categories: Vec<String>,
    pub series: Vec<ChartSeries>,
    /// Horizontal guide line (e.g. zero burn).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_line: Option<f64>,
}

impl ChartSpec {
    /// Single-series bar chart.
    pub fn bar(
        title: impl Into<String>,
        y_label: impl Into<String>,
        categories: Vec<String>,
        values: Vec<f64>,
    ) -> Self {
        Self {
            kind: ChartKind::Bar,
            title: title.into(),
            x_label: None,
            y_label: y_label.into(),
            categories,
            series: vec![ChartSeries::new(values)],
            reference_line: None,
        }
    }

    /// Single-series line chart over `categories` (usually months).
    pub fn line(
        title: impl Into<String>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
        categories: Vec<String>,
        series: ChartSeries,
    ) -> Self {
        Self {
            kind: ChartKind::Line,
            title: title.into(),
            x_label: Some(x_label.into()),
            y_label: y_label.into(),
            categories,
            series: vec![series],
            reference_line: None,
        }
    }

    pub fn with_reference_line(mut self, y: f64) -> Self {
        self.reference_line = Some(y);
        self
    }

    /// `(min, max)` over every defined value and the reference line.
    ///
    /// Returns `None` when nothing is plottable.
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        self.series
            .iter()
            .flat_map(|s| s.defined())
            .chain(self.reference_line)
            .fold(None::<(f64, f64)>, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_constructor() {
        let spec = ChartSpec::bar(
            "Revenue vs Budget",
            "USD",
            vec!["Actual".to_string(), "Budget".to_string()],
            vec![1100.0, 900.0],
        );
        assert_eq!(spec.kind, ChartKind::Bar);
        assert_eq!(spec.series.len(), 1);
        assert_eq!(spec.series[0].values, vec![Some(1100.0), Some(900.0)]);
        assert!(spec.x_label.is_none());
    }

    #[test]
    fn test_value_bounds_skips_undefined_points() {
        let series = ChartSeries {
            label: None,
            values: vec![Some(10.0), None, Some(-5.0)],
        };
        let spec = ChartSpec::line("t", "Month", "USD", vec![], series);
        assert_eq!(spec.value_bounds(), Some((-5.0, 10.0)));
    }

    #[test]
    fn test_value_bounds_includes_reference_line() {
        let spec = ChartSpec::line(
            "t",
            "Month",
            "USD",
            vec!["2024-01".to_string()],
            ChartSeries::new(vec![50.0]),
        )
        .with_reference_line(0.0);
        assert_eq!(spec.value_bounds(), Some((0.0, 50.0)));
    }

    #[test]
    fn test_value_bounds_empty() {
        let spec = ChartSpec::bar("t", "USD", vec![], vec![]);
        assert!(spec.value_bounds().is_none());
    }

    #[test]
    fn test_serialized_kind_is_lowercase() {
        let spec = ChartSpec::bar("t", "USD", vec![], vec![]);
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["kind"], "bar");
        assert!(json.get("reference_line").is_none());
    }
}
