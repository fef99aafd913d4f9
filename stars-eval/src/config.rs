//! Configuration of the post-evaluation steps.
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Invalid evaluation configuration")]
pub struct ConfigError(#[from] serde_json::Error);

/// Switches for the steps run after all segments have been consumed.
///
/// Missing keys take their default values when deserializing, so an empty JSON object is a valid
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Hand the series of plottable providers to the plot sink.
    pub write_plots: bool,

    /// Also hand the series of plottable providers to the plot sink as CSV data.
    pub write_plot_data_csv: bool,

    /// Hand the results of serializable providers to the result store.
    pub write_serialized_results: bool,

    /// Compare the results of serializable providers with the previous run in the result store.
    pub compare_to_previous_run: bool,

    /// Period of the progress log in milliseconds. No progress is logged when absent.
    pub progress_interval_ms: Option<u64>,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            write_plots: true,
            write_plot_data_csv: false,
            write_serialized_results: true,
            compare_to_previous_run: true,
            progress_interval_ms: None,
        }
    }
}

impl EvaluationConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_plots(mut self, enabled: bool) -> Self {
        self.write_plots = enabled;
        self
    }

    pub fn with_plot_data_csv(mut self, enabled: bool) -> Self {
        self.write_plot_data_csv = enabled;
        self
    }

    pub fn with_serialized_results(mut self, enabled: bool) -> Self {
        self.write_serialized_results = enabled;
        self
    }

    pub fn with_comparison(mut self, enabled: bool) -> Self {
        self.compare_to_previous_run = enabled;
        self
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval_ms = Some(interval.as_millis().try_into().unwrap_or(u64::MAX));
        self
    }

    pub fn progress_interval(&self) -> Option<Duration> {
        self.progress_interval_ms.map(Duration::from_millis)
    }

    /// A configuration running no post-evaluation output step.
    pub fn silent() -> Self {
        Self {
            write_plots: false,
            write_plot_data_csv: false,
            write_serialized_results: false,
            compare_to_previous_run: false,
            progress_interval_ms: None,
        }
    }
}
