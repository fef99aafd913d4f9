//! Evaluating scenario taxonomies over recorded segments.
//!
//! A [`TscEvaluation`] pulls segments from a lazy source, evaluates every taxonomy against each of
//! them and feeds the resulting instances to the registered metric providers. Hooks decide which
//! taxonomies and segments are evaluated, and the post-evaluation steps hand the collected metrics
//! to a [`PlotSink`] and a [`ResultStore`].
//!
//! ```rust
//! use stars_core::Segment;
//! use stars_eval::providers::SegmentCount;
//! use stars_eval::{EvaluationConfig, MetricProvider, TscEvaluation};
//! use stars_tsc::builder::{leaf, TscBuilder};
//!
//! let tsc = TscBuilder::new("trivial").root(leaf("root")).build().unwrap();
//! let mut evaluation = TscEvaluation::new([tsc], EvaluationConfig::silent());
//! evaluation.register(MetricProvider::segment(SegmentCount::default())).unwrap();
//!
//! let segments = (0..3u32).map(|index| Segment::from_ticks(format!("s{index}"), 1, vec![index]));
//! let summary = evaluation.run(segments).unwrap();
//!
//! assert_eq!(summary.segments, 3);
//! assert_eq!(summary.instances, 3);
//! ```

pub mod config;
pub mod error;
pub mod evaluation;
pub mod hooks;
pub mod metrics;
pub mod post;
pub mod progress;

pub use crate::config::{ConfigError, EvaluationConfig};
pub use crate::error::{EvaluationError, ExportError};
pub use crate::evaluation::{EvaluationSummary, TscEvaluation};
pub use crate::hooks::{EvaluationHook, EvaluationHookResult, HookResults};
pub use crate::metrics::providers;
pub use crate::metrics::{
    InstanceMetric, InstanceSegmentMetric, Metric, MetricProvider, MetricProviders, Plottable, PostEvaluationMetric,
    SegmentMetric, SegmentTsc, Serializable, Stateful, TscInstanceMetric, TscInstanceSegmentMetric, TscSegmentMetric,
};
pub use crate::post::{compare_results, ComparisonVerdict, PlotSeries, PlotSink, ResultStore, SerializableResult};
pub use crate::progress::{EvaluationProgress, ProgressReporter};
