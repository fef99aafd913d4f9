//! Instances produced by evaluating a taxonomy.
//!
//! A [`TscInstance`] is the tree of nodes reached while evaluating a [`Tsc`](crate::Tsc) against a
//! single context. Instances compare structurally: two instances are equal when their root nodes
//! are equal, regardless of the segment they were observed in, and two edges are equal when their
//! destinations are equal, regardless of the taxonomy edge they were reached through. This allows
//! collecting the distinct scenario shapes observed across many segments in a set.
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::node::{NodeKind, NodeValue};

/// A node of an instance.
#[derive(Debug, Clone)]
pub struct TscInstanceNode {
    pub(crate) label: String,
    pub(crate) kind: NodeKind,
    pub(crate) bounds: (usize, usize),
    pub(crate) value: Option<NodeValue>,
    pub(crate) monitor_results: BTreeMap<String, bool>,
    pub(crate) edges: Vec<TscInstanceEdge>,
    pub(crate) node: NodeIndex,
}

impl TscInstanceNode {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Bounds of the taxonomy node this node was created from.
    pub fn bounds(&self) -> (usize, usize) {
        self.bounds
    }

    pub fn value(&self) -> Option<&NodeValue> {
        self.value.as_ref()
    }

    pub fn monitor_results(&self) -> &BTreeMap<String, bool> {
        &self.monitor_results
    }

    /// The taken edges, in the order of the taxonomy.
    pub fn edges(&self) -> &[TscInstanceEdge] {
        &self.edges
    }

    /// Index of the taxonomy node this node was created from.
    pub fn tsc_node(&self) -> NodeIndex {
        self.node
    }

    fn collect_violations(&self, path: &mut Vec<String>, violations: &mut Vec<BoundsViolation>) {
        path.push(self.label.clone());

        let taken = self.edges.len();
        let (lower, upper) = self.bounds;

        if taken < lower || taken > upper {
            violations.push(BoundsViolation {
                path: path.clone(),
                message: format!(
                    "Node {} ({}) took {} edges, expected between {} and {}",
                    self.label, self.kind, taken, lower, upper
                ),
            });
        }

        for edge in &self.edges {
            edge.destination.collect_violations(path, violations);
        }

        path.pop();
    }

    fn collect_failed_monitors(&self, path: &mut Vec<String>, failed: &mut Vec<FailedMonitor>) {
        for (label, _) in self.monitor_results.iter().filter(|(_, result)| !**result) {
            failed.push(FailedMonitor {
                path: path.clone(),
                node_label: self.label.clone(),
                monitor_label: label.clone(),
            });
        }

        for edge in &self.edges {
            path.push(edge.label.clone());
            edge.destination.collect_failed_monitors(path, failed);
            path.pop();
        }
    }

    fn fmt_node(&self, f: &mut Formatter<'_>, depth: usize) -> std::fmt::Result {
        write!(f, "{:indent$}{}", "", self.label, indent = depth * 2)?;

        if let Some(value) = &self.value {
            write!(f, " = {value}")?;
        }

        for (label, result) in &self.monitor_results {
            write!(f, " [{label}: {}]", if *result { "ok" } else { "failed" })?;
        }

        writeln!(f)?;

        for edge in &self.edges {
            edge.destination.fmt_node(f, depth + 1)?;
        }

        Ok(())
    }
}

impl PartialEq for TscInstanceNode {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label
            && self.kind == other.kind
            && self.value == other.value
            && self.monitor_results == other.monitor_results
            && self.edges == other.edges
    }
}

impl Eq for TscInstanceNode {}

impl Hash for TscInstanceNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.label.hash(state);
        self.kind.hash(state);
        self.value.hash(state);
        self.monitor_results.hash(state);
        self.edges.hash(state);
    }
}

/// A taken edge of an instance.
///
/// Equality and hashing only consider the destination node.
#[derive(Debug, Clone)]
pub struct TscInstanceEdge {
    pub(crate) label: String,
    pub(crate) edge: EdgeIndex,
    pub(crate) destination: TscInstanceNode,
}

impl TscInstanceEdge {
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Index of the taxonomy edge that was taken.
    pub fn tsc_edge(&self) -> EdgeIndex {
        self.edge
    }

    pub fn destination(&self) -> &TscInstanceNode {
        &self.destination
    }
}

impl PartialEq for TscInstanceEdge {
    fn eq(&self, other: &Self) -> bool {
        self.destination == other.destination
    }
}

impl Eq for TscInstanceEdge {}

impl Hash for TscInstanceEdge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.destination.hash(state);
    }
}

/// A node whose number of taken edges is outside of the bounds of its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundsViolation {
    /// Labels of the nodes from the root down to the offending node
    pub path: Vec<String>,
    pub message: String,
}

impl Display for BoundsViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.join("/"), self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedMonitor {
    /// Labels of the edges leading from the root to the node of the monitor
    pub path: Vec<String>,
    pub node_label: String,
    pub monitor_label: String,
}

/// Result of checking every monitor of an instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorValidation {
    pub segment_identifier: String,
    pub valid: bool,
    pub failed: Vec<FailedMonitor>,
}

/// The result of evaluating a taxonomy against a single context.
#[derive(Debug, Clone)]
pub struct TscInstance {
    tsc_identifier: String,
    source_identifier: String,
    root: TscInstanceNode,
}

impl TscInstance {
    pub(crate) fn new(tsc_identifier: String, source_identifier: String, root: TscInstanceNode) -> Self {
        Self {
            tsc_identifier,
            source_identifier,
            root,
        }
    }

    /// Identifier of the taxonomy the instance was created from.
    pub fn tsc_identifier(&self) -> &str {
        &self.tsc_identifier
    }

    /// Identifier of the data the instance was created from, usually a segment identifier.
    pub fn source_identifier(&self) -> &str {
        &self.source_identifier
    }

    pub fn root(&self) -> &TscInstanceNode {
        &self.root
    }

    /// Iterate over the nodes of the instance in pre-order.
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![&self.root] }
    }

    /// Labels of the leaf nodes of the instance, in pre-order.
    pub fn leaf_labels(&self) -> Vec<&str> {
        self.iter()
            .filter(|node| node.kind == NodeKind::Leaf)
            .map(TscInstanceNode::label)
            .collect()
    }

    /// Check the number of taken edges of every node against the bounds of its kind.
    pub fn validate(&self) -> Vec<BoundsViolation> {
        let mut violations = Vec::new();
        self.root.collect_violations(&mut Vec::new(), &mut violations);
        violations
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Collect every monitor of the instance that did not hold.
    pub fn validate_monitors(&self, segment_identifier: impl Into<String>) -> MonitorValidation {
        let mut failed = Vec::new();
        self.root.collect_failed_monitors(&mut Vec::new(), &mut failed);

        MonitorValidation {
            segment_identifier: segment_identifier.into(),
            valid: failed.is_empty(),
            failed,
        }
    }
}

impl PartialEq for TscInstance {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
    }
}

impl Eq for TscInstance {}

impl Hash for TscInstance {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.root.hash(state);
    }
}

impl Display for TscInstance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} @ {}", self.tsc_identifier, self.source_identifier)?;
        self.root.fmt_node(f, 1)
    }
}

impl<'a> IntoIterator for &'a TscInstance {
    type Item = &'a TscInstanceNode;
    type IntoIter = PreOrder<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Pre-order iterator over the nodes of an instance, created by [`TscInstance::iter`].
pub struct PreOrder<'a> {
    stack: Vec<&'a TscInstanceNode>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a TscInstanceNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.edges.iter().rev().map(|edge| &edge.destination));
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::builder::{all, bounded, exclusive, leaf, TscBuilder, TscError};
    use crate::Tsc;

    /// Leaves are taken when their label is contained in the context
    fn tsc() -> Result<Tsc<Vec<&'static str>>, TscError> {
        let when = |label: &'static str| move |context: &Vec<&'static str>| context.contains(&label);

        TscBuilder::new("t")
            .root(
                all("root")
                    .child(
                        exclusive("x")
                            .child(leaf("a").condition(when("a")))
                            .child(leaf("b").condition(when("b"))),
                    )
                    .child(
                        bounded("y", 1, 1)
                            .monitor("has c", when("c"))
                            .child(leaf("c").condition(when("c")))
                            .child(leaf("d").condition(when("d")).monitor("never", |_| false)),
                    ),
            )
            .build()
    }

    #[test]
    fn pre_order_iteration() -> Result<(), TscError> {
        let instance = tsc()?.evaluate(&vec!["a", "c"], "s");
        let labels: Vec<&str> = instance.iter().map(|node| node.label()).collect();

        assert_eq!(labels, vec!["root", "x", "a", "y", "c"]);
        assert_eq!(instance.leaf_labels(), vec!["a", "c"]);
        Ok(())
    }

    #[test]
    fn validate_bounds() -> Result<(), TscError> {
        let tsc = tsc()?;

        assert!(tsc.evaluate(&vec!["a", "c"], "s").is_valid());

        let violations = tsc.evaluate(&vec!["a", "b", "c", "d"], "s").validate();
        let paths: Vec<String> = violations.iter().map(|violation| violation.path.join("/")).collect();
        assert_eq!(paths, vec!["root/x", "root/y"]);

        let violations = tsc.evaluate(&vec!["c"], "s").validate();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, vec!["root".to_string(), "x".to_string()]);
        Ok(())
    }

    #[test]
    fn validate_monitors() -> Result<(), TscError> {
        let tsc = tsc()?;

        let passing = tsc.evaluate(&vec!["a", "c"], "s").validate_monitors("s");
        assert!(passing.valid);
        assert!(passing.failed.is_empty());

        let failing = tsc.evaluate(&vec!["a", "d"], "s").validate_monitors("s");
        let failed: Vec<(String, &str)> = failing
            .failed
            .iter()
            .map(|monitor| (monitor.path.join("/"), monitor.monitor_label.as_str()))
            .collect();

        assert!(!failing.valid);
        assert_eq!(failing.segment_identifier, "s");
        assert_eq!(failed, vec![("y".to_string(), "has c"), ("y/d".to_string(), "never")]);
        Ok(())
    }

    #[test]
    fn equality_ignores_source() -> Result<(), TscError> {
        let tsc = tsc()?;
        let first = tsc.evaluate(&vec!["a", "c"], "segment-1");
        let second = tsc.evaluate(&vec!["a", "c"], "segment-2");
        let third = tsc.evaluate(&vec!["b", "c"], "segment-1");

        assert_eq!(first, second);
        assert_ne!(first, third);

        let distinct: HashSet<_> = [first, second, third].into_iter().collect();
        assert_eq!(distinct.len(), 2);
        Ok(())
    }

    #[test]
    fn edge_equality_ignores_taxonomy_edge() -> Result<(), TscError> {
        // Both "a" leaves are identical but reached through different taxonomy edges
        let tsc = TscBuilder::<()>::new("t")
            .root(all("root").child(all("x").child(leaf("a"))).child(all("y").child(leaf("a"))))
            .build()?;

        let instance = tsc.evaluate(&(), "s");
        let x = &instance.root().edges()[0];
        let y = &instance.root().edges()[1];
        let under_x = &x.destination().edges()[0];
        let under_y = &y.destination().edges()[0];

        assert_ne!(under_x.tsc_edge(), under_y.tsc_edge());
        assert_eq!(under_x, under_y);
        assert_ne!(x, y);
        Ok(())
    }
}
