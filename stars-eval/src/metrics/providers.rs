//! Metric providers shipped with the evaluation.
use std::collections::{BTreeMap, HashMap};

use num_bigint::BigUint;
use serde_json::json;
use stars_core::{Segment, TickData};
use stars_tsc::{MonitorValidation, TscInstance};
use tracing::warn;

use crate::metrics::{
    InstanceMetric, Metric, MetricProviders, PostEvaluationMetric, Plottable, SegmentMetric, SegmentTsc, Serializable,
    Stateful, TscInstanceMetric,
};
use crate::post::{PlotSeries, SerializableResult};

/// Number of segments accepted by the pre-segment hooks.
#[derive(Debug, Clone, Default)]
pub struct SegmentCount {
    count: usize,
}

impl SegmentCount {
    pub fn count(&self) -> usize {
        self.count
    }
}

impl Metric for SegmentCount {
    fn as_stateful(&self) -> Option<&dyn Stateful> {
        Some(self)
    }

    fn as_serializable(&self) -> Option<&dyn Serializable> {
        Some(self)
    }
}

impl<T> SegmentMetric<T> for SegmentCount {
    fn evaluate(&mut self, _: &Segment<T>) {
        self.count += 1;
    }
}

impl Stateful for SegmentCount {
    fn summary(&self) -> String {
        format!("Analyzed {} segments", self.count)
    }
}

impl Serializable for SegmentCount {
    fn serialize_results(&self) -> Vec<SerializableResult> {
        vec![SerializableResult::new(self.identifier(), "all", self.count)]
    }
}

/// Sum of the simulation time covered by all accepted segments.
#[derive(Debug, Clone, Default)]
pub struct TotalSegmentTickDifference {
    total: f64,
}

impl TotalSegmentTickDifference {
    pub fn total(&self) -> f64 {
        self.total
    }
}

impl Metric for TotalSegmentTickDifference {
    fn as_stateful(&self) -> Option<&dyn Stateful> {
        Some(self)
    }

    fn as_serializable(&self) -> Option<&dyn Serializable> {
        Some(self)
    }
}

impl<T: TickData> SegmentMetric<T> for TotalSegmentTickDifference {
    fn evaluate(&mut self, segment: &Segment<T>) {
        self.total += segment.duration();
    }
}

impl Stateful for TotalSegmentTickDifference {
    fn summary(&self) -> String {
        format!("Total tick difference of all segments: {}", self.total)
    }
}

impl Serializable for TotalSegmentTickDifference {
    fn serialize_results(&self) -> Vec<SerializableResult> {
        vec![SerializableResult::new(self.identifier(), "all", self.total)]
    }
}

/// Distinct instances of every taxonomy, with the segments each instance was observed in.
#[derive(Debug, Clone, Default)]
struct InstancesPerTsc {
    instances: BTreeMap<String, HashMap<TscInstance, Vec<String>>>,
    // Distinct instance count of every taxonomy after each evaluated instance
    history: BTreeMap<String, Vec<usize>>,
}

impl InstancesPerTsc {
    fn observe(&mut self, tsc: &str, instance: Option<&TscInstance>) {
        let instances = self.instances.entry(tsc.to_string()).or_default();

        if let Some(instance) = instance {
            instances
                .entry(instance.clone())
                .or_default()
                .push(instance.source_identifier().to_string());
        }

        self.history.entry(tsc.to_string()).or_default().push(instances.len());
    }

    fn distinct(&self, tsc: &str) -> usize {
        self.instances.get(tsc).map_or(0, HashMap::len)
    }

    fn summary(&self, adjective: &str) -> String {
        self.instances
            .iter()
            .map(|(tsc, instances)| {
                let occurrences: usize = instances.values().map(Vec::len).sum();
                format!("{tsc}: {} distinct {adjective} instances in {occurrences} segments", instances.len())
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn series(&self) -> Vec<PlotSeries> {
        self.history
            .iter()
            .map(|(tsc, counts)| {
                let points = counts
                    .iter()
                    .enumerate()
                    .map(|(index, count)| ((index + 1) as f64, *count as f64));

                PlotSeries::new(tsc.clone(), "instances evaluated", "distinct instances").with_points(points)
            })
            .collect()
    }

    fn results(&self, identifier: &str) -> Vec<SerializableResult> {
        self.instances
            .iter()
            .map(|(tsc, instances)| {
                let mut observed: Vec<serde_json::Value> = instances
                    .iter()
                    .map(|(instance, segments)| json!({ "instance": tree(instance), "segments": segments }))
                    .collect();

                observed.sort_by_key(|value| value["instance"].as_str().map(str::to_string));

                SerializableResult::new(identifier, tsc.clone(), json!({ "count": instances.len(), "instances": observed }))
            })
            .collect()
    }
}

/// Rendering of the instance tree without the header naming its source.
fn tree(instance: &TscInstance) -> String {
    instance.to_string().lines().skip(1).collect::<Vec<_>>().join("\n")
}

/// Distinct instances of every taxonomy that respect the bounds of all their nodes.
#[derive(Debug, Clone, Default)]
pub struct ValidTscInstancesPerTsc(InstancesPerTsc);

impl ValidTscInstancesPerTsc {
    /// Valid instances of a taxonomy, with the segments each was observed in.
    pub fn instances(&self, tsc: &str) -> Option<&HashMap<TscInstance, Vec<String>>> {
        self.0.instances.get(tsc)
    }

    pub fn distinct_count(&self, tsc: &str) -> usize {
        self.0.distinct(tsc)
    }
}

impl Metric for ValidTscInstancesPerTsc {
    fn as_stateful(&self) -> Option<&dyn Stateful> {
        Some(self)
    }

    fn as_plottable(&self) -> Option<&dyn Plottable> {
        Some(self)
    }

    fn as_serializable(&self) -> Option<&dyn Serializable> {
        Some(self)
    }
}

impl<T> TscInstanceMetric<T> for ValidTscInstancesPerTsc {
    fn evaluate(&mut self, tsc: &SegmentTsc<T>, instance: &TscInstance) {
        self.0.observe(tsc.identifier(), Some(instance).filter(|instance| instance.is_valid()));
    }
}

impl Stateful for ValidTscInstancesPerTsc {
    fn summary(&self) -> String {
        self.0.summary("valid")
    }
}

impl Plottable for ValidTscInstancesPerTsc {
    fn series(&self) -> Vec<PlotSeries> {
        self.0.series()
    }
}

impl Serializable for ValidTscInstancesPerTsc {
    fn serialize_results(&self) -> Vec<SerializableResult> {
        self.0.results(&self.identifier())
    }
}

/// Distinct instances of every taxonomy that violate the bounds of at least one node.
#[derive(Debug, Clone, Default)]
pub struct InvalidTscInstancesPerTsc(InstancesPerTsc);

impl InvalidTscInstancesPerTsc {
    pub fn instances(&self, tsc: &str) -> Option<&HashMap<TscInstance, Vec<String>>> {
        self.0.instances.get(tsc)
    }

    pub fn distinct_count(&self, tsc: &str) -> usize {
        self.0.distinct(tsc)
    }
}

impl Metric for InvalidTscInstancesPerTsc {
    fn as_stateful(&self) -> Option<&dyn Stateful> {
        Some(self)
    }

    fn as_serializable(&self) -> Option<&dyn Serializable> {
        Some(self)
    }
}

impl<T> TscInstanceMetric<T> for InvalidTscInstancesPerTsc {
    fn evaluate(&mut self, tsc: &SegmentTsc<T>, instance: &TscInstance) {
        self.0.observe(tsc.identifier(), Some(instance).filter(|instance| !instance.is_valid()));
    }
}

impl Stateful for InvalidTscInstancesPerTsc {
    fn summary(&self) -> String {
        self.0.summary("invalid")
    }
}

impl Serializable for InvalidTscInstancesPerTsc {
    fn serialize_results(&self) -> Vec<SerializableResult> {
        self.0.results(&self.identifier())
    }
}

/// Coverage of a taxonomy by the valid instances observed during an evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissedInstances {
    pub possible: BigUint,
    pub observed: usize,
    pub missed: BigUint,
}

/// Number of possible instances of every taxonomy that no valid observed instance covers.
///
/// Derived from [`ValidTscInstancesPerTsc`], which must be registered as well.
#[derive(Debug, Clone, Default)]
pub struct MissedTscInstancesPerTsc {
    missed: BTreeMap<String, MissedInstances>,
}

impl MissedTscInstancesPerTsc {
    pub fn missed(&self, tsc: &str) -> Option<&MissedInstances> {
        self.missed.get(tsc)
    }
}

impl Metric for MissedTscInstancesPerTsc {
    fn as_stateful(&self) -> Option<&dyn Stateful> {
        Some(self)
    }

    fn as_serializable(&self) -> Option<&dyn Serializable> {
        Some(self)
    }
}

impl<T> PostEvaluationMetric<T> for MissedTscInstancesPerTsc {
    fn post_evaluate(&mut self, tscs: &[SegmentTsc<T>], providers: &MetricProviders<T>) {
        let Some(valid) = providers.find::<ValidTscInstancesPerTsc>() else {
            warn!("MissedTscInstancesPerTsc requires a registered ValidTscInstancesPerTsc provider");
            return;
        };

        for tsc in tscs {
            let possible = tsc.instance_count();
            let observed = valid.distinct_count(tsc.identifier());
            let covered = BigUint::from(observed);
            let missed = if covered > possible {
                BigUint::default()
            } else {
                &possible - &covered
            };

            self.missed.insert(
                tsc.identifier().to_string(),
                MissedInstances {
                    possible,
                    observed,
                    missed,
                },
            );
        }
    }
}

impl Stateful for MissedTscInstancesPerTsc {
    fn summary(&self) -> String {
        self.missed
            .iter()
            .map(|(tsc, coverage)| {
                format!(
                    "{tsc}: missed {} of {} possible instances",
                    coverage.missed, coverage.possible
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Serializable for MissedTscInstancesPerTsc {
    fn serialize_results(&self) -> Vec<SerializableResult> {
        self.missed
            .iter()
            .map(|(tsc, coverage)| {
                let value = json!({
                    "possible": coverage.possible.to_string(),
                    "observed": coverage.observed,
                    "missed": coverage.missed.to_string(),
                });

                SerializableResult::new(self.identifier(), tsc.clone(), value)
            })
            .collect()
    }
}

/// Monitors that did not hold, grouped by taxonomy.
#[derive(Debug, Clone, Default)]
pub struct FailedMonitors {
    failed: BTreeMap<String, Vec<MonitorValidation>>,
}

impl FailedMonitors {
    pub fn failed(&self, tsc: &str) -> &[MonitorValidation] {
        self.failed.get(tsc).map(Vec::as_slice).unwrap_or_default()
    }
}

impl Metric for FailedMonitors {
    fn as_stateful(&self) -> Option<&dyn Stateful> {
        Some(self)
    }

    fn as_serializable(&self) -> Option<&dyn Serializable> {
        Some(self)
    }
}

impl InstanceMetric for FailedMonitors {
    fn evaluate(&mut self, instance: &TscInstance) {
        let validation = instance.validate_monitors(instance.source_identifier());
        let failed = self.failed.entry(instance.tsc_identifier().to_string()).or_default();

        if !validation.valid {
            failed.push(validation);
        }
    }
}

impl Stateful for FailedMonitors {
    fn summary(&self) -> String {
        self.failed
            .iter()
            .map(|(tsc, validations)| {
                let monitors: usize = validations.iter().map(|validation| validation.failed.len()).sum();
                format!("{tsc}: {monitors} failed monitors in {} segments", validations.len())
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Serializable for FailedMonitors {
    fn serialize_results(&self) -> Vec<SerializableResult> {
        self.failed
            .iter()
            .map(|(tsc, validations)| {
                let value: Vec<serde_json::Value> = validations
                    .iter()
                    .map(|validation| {
                        let monitors: Vec<serde_json::Value> = validation
                            .failed
                            .iter()
                            .map(|monitor| {
                                json!({
                                    "path": monitor.path,
                                    "node": monitor.node_label,
                                    "monitor": monitor.monitor_label,
                                })
                            })
                            .collect();

                        json!({ "segment": validation.segment_identifier, "failed": monitors })
                    })
                    .collect();

                SerializableResult::new(self.identifier(), tsc.clone(), value)
            })
            .collect()
    }
}
