//! Outputs produced after all segments have been evaluated.
//!
//! Rendering plots and persisting results is left to the caller: the evaluation hands plottable
//! series to a [`PlotSink`] and serialized results to a [`ResultStore`].
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::error::ExportError;

/// A named series of points produced by a plottable metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotSeries {
    pub name: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<(f64, f64)>,
}

impl PlotSeries {
    pub fn new(name: impl Into<String>, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            points: Vec::new(),
        }
    }

    pub fn with_points(mut self, points: impl IntoIterator<Item = (f64, f64)>) -> Self {
        self.points.extend(points);
        self
    }

    /// Render the series as CSV with a header row.
    pub fn to_csv(&self) -> String {
        let header = format!("{},{}\n", self.x_label, self.y_label);

        self.points.iter().fold(header, |mut csv, (x, y)| {
            csv.push_str(&format!("{x},{y}\n"));
            csv
        })
    }
}

/// Receives the series of plottable metrics.
pub trait PlotSink {
    fn plot(&mut self, metric: &str, series: &[PlotSeries]) -> Result<(), ExportError>;

    fn write_csv(&mut self, metric: &str, series: &[PlotSeries]) -> Result<(), ExportError>;
}

/// One serialized result of a metric, identified by the metric and the source it describes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializableResult {
    pub identifier: String,
    pub source: String,
    pub value: serde_json::Value,
}

impl SerializableResult {
    pub fn new(identifier: impl Into<String>, source: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            identifier: identifier.into(),
            source: source.into(),
            value: value.into(),
        }
    }
}

/// Persists serialized results and returns those of the previous run.
pub trait ResultStore {
    fn save(&mut self, results: &[SerializableResult]) -> Result<(), ExportError>;

    fn load_previous(&self) -> Result<Option<Vec<SerializableResult>>, ExportError>;
}

/// Outcome of comparing results with a previous run.
///
/// Verdicts only ever get worse when merged: `Unknown < Pass < Fail`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonVerdict {
    #[default]
    Unknown,
    Pass,
    Fail,
}

impl ComparisonVerdict {
    pub fn merge(self, other: ComparisonVerdict) -> ComparisonVerdict {
        self.max(other)
    }
}

impl Display for ComparisonVerdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ComparisonVerdict::Unknown => write!(f, "unknown"),
            ComparisonVerdict::Pass => write!(f, "pass"),
            ComparisonVerdict::Fail => write!(f, "fail"),
        }
    }
}

/// Compare current results with the previous run.
///
/// A result passes if the previous run holds an equal value for the same identifier and source,
/// and fails if the value differs or the previous run has no such result. Without a previous run
/// the verdict is unknown.
pub fn compare_results(current: &[SerializableResult], previous: Option<&[SerializableResult]>) -> ComparisonVerdict {
    let Some(previous) = previous else {
        return ComparisonVerdict::Unknown;
    };

    let previous: HashMap<(&str, &str), &serde_json::Value> = previous
        .iter()
        .map(|result| ((result.identifier.as_str(), result.source.as_str()), &result.value))
        .collect();

    current
        .iter()
        .map(|result| match previous.get(&(result.identifier.as_str(), result.source.as_str())) {
            Some(value) if **value == result.value => ComparisonVerdict::Pass,
            _ => ComparisonVerdict::Fail,
        })
        .fold(ComparisonVerdict::Unknown, ComparisonVerdict::merge)
}
