use std::collections::BTreeMap;
use std::fmt::{Debug, Display, Formatter};

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::debug;

use crate::instance::{TscInstance, TscInstanceEdge, TscInstanceNode};
use crate::node::{NodeKind, TscEdge, TscNode};

/// A finalized taxonomy, created by [`TscBuilder::build`](crate::builder::TscBuilder::build).
///
/// The taxonomy is a tree stored as a directed graph. Children are always reported in the order
/// they were added to their parent.
pub struct Tsc<C> {
    identifier: String,
    graph: DiGraph<TscNode<C>, TscEdge<C>>,
    root: NodeIndex,
}

impl<C> Clone for Tsc<C> {
    fn clone(&self) -> Self {
        Self {
            identifier: self.identifier.clone(),
            graph: self.graph.clone(),
            root: self.root,
        }
    }
}

impl<C> Debug for Tsc<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tsc")
            .field("identifier", &self.identifier)
            .field("nodes", &self.graph.node_count())
            .finish()
    }
}

impl<C> Tsc<C> {
    pub(crate) fn new(identifier: String, graph: DiGraph<TscNode<C>, TscEdge<C>>, root: NodeIndex) -> Self {
        Self { identifier, graph, root }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// # Panics
    ///
    /// If the index does not belong to this taxonomy.
    pub fn node(&self, index: NodeIndex) -> &TscNode<C> {
        &self.graph[index]
    }

    /// # Panics
    ///
    /// If the index does not belong to this taxonomy.
    pub fn edge(&self, index: EdgeIndex) -> &TscEdge<C> {
        &self.graph[index]
    }

    /// Outgoing edges of a node paired with their destination, in insertion order.
    pub fn children(&self, index: NodeIndex) -> Vec<(EdgeIndex, NodeIndex)> {
        let mut children: Vec<_> = self
            .graph
            .edges(index)
            .map(|edge| (edge.id(), edge.target()))
            .collect();

        children.sort_by_key(|(edge, _)| *edge);
        children
    }

    /// Inclusive range of the number of edges a valid instance takes at the given node.
    pub fn bounds(&self, index: NodeIndex) -> (usize, usize) {
        let children = self.graph.edges(index).count();
        self.graph[index].kind.bounds(children)
    }

    /// Node indices in pre-order, starting from the root.
    pub fn pre_order(&self) -> Vec<NodeIndex> {
        let mut order = Vec::with_capacity(self.graph.node_count());
        let mut stack = vec![self.root];

        while let Some(index) = stack.pop() {
            order.push(index);
            stack.extend(self.children(index).into_iter().rev().map(|(_, child)| child));
        }

        order
    }

    /// Labels of every leaf node, in pre-order.
    pub fn leaf_labels(&self) -> Vec<&str> {
        self.pre_order()
            .into_iter()
            .map(|index| &self.graph[index])
            .filter(|node| node.kind == NodeKind::Leaf)
            .map(TscNode::label)
            .collect()
    }

    /// Evaluate the taxonomy against a context, producing the instance induced by the edges whose
    /// conditions hold.
    ///
    /// Every edge whose condition holds is taken regardless of the node kind, so an instance may
    /// violate the bounds of its nodes. Use [`TscInstance::validate`] to check them. Values and
    /// monitors are computed for every visited node.
    pub fn evaluate(&self, context: &C, source_identifier: impl Into<String>) -> TscInstance {
        let root = self.instantiate(self.root, context);
        let instance = TscInstance::new(self.identifier.clone(), source_identifier.into(), root);

        debug!(
            tsc = %self.identifier,
            source = instance.source_identifier(),
            nodes = instance.iter().count(),
            "Evaluated taxonomy"
        );

        instance
    }

    fn instantiate(&self, index: NodeIndex, context: &C) -> TscInstanceNode {
        let node = &self.graph[index];
        let monitor_results: BTreeMap<String, bool> = node
            .monitors
            .iter()
            .map(|monitor| (monitor.label().to_string(), monitor.check(context)))
            .collect();

        let edges = self
            .children(index)
            .into_iter()
            .filter(|(edge, _)| self.graph[*edge].holds(context))
            .map(|(edge, child)| TscInstanceEdge {
                label: self.graph[edge].label.clone(),
                edge,
                destination: self.instantiate(child, context),
            })
            .collect();

        TscInstanceNode {
            label: node.label.clone(),
            kind: node.kind,
            bounds: self.bounds(index),
            value: node.value(context),
            monitor_results,
            edges,
            node: index,
        }
    }

    fn fmt_node(&self, f: &mut Formatter<'_>, index: NodeIndex, depth: usize) -> std::fmt::Result {
        let node = &self.graph[index];
        writeln!(f, "{:indent$}{} ({})", "", node.label, node.kind, indent = depth * 2)?;

        for (_, child) in self.children(index) {
            self.fmt_node(f, child, depth + 1)?;
        }

        Ok(())
    }
}

impl<C> Display for Tsc<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.identifier)?;
        self.fmt_node(f, self.root, 1)
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::{all, any, exclusive, leaf, optional, TscBuilder, TscError};
    use crate::NodeValue;

    struct Road {
        lanes: i64,
        wet: bool,
    }

    fn tsc() -> Result<crate::Tsc<Road>, TscError> {
        TscBuilder::new("road")
            .root(
                all("root")
                    .child(
                        exclusive("lanes")
                            .value(|road: &Road| road.lanes)
                            .child(leaf("single").condition(|road: &Road| road.lanes == 1))
                            .child(leaf("multi").condition(|road: &Road| road.lanes > 1)),
                    )
                    .child(
                        optional("surface")
                            .monitor("known", |road: &Road| road.lanes > 0)
                            .child(leaf("wet").condition(|road: &Road| road.wet)),
                    ),
            )
            .build()
    }

    #[test]
    fn children_keep_insertion_order() -> Result<(), TscError> {
        let tsc = tsc()?;
        let labels: Vec<&str> = tsc
            .children(tsc.root())
            .into_iter()
            .map(|(edge, _)| tsc.edge(edge).label())
            .collect();

        assert_eq!(labels, vec!["lanes", "surface"]);
        assert_eq!(tsc.leaf_labels(), vec!["single", "multi", "wet"]);
        assert_eq!(tsc.bounds(tsc.root()), (2, 2));

        Ok(())
    }

    #[test]
    fn evaluate_takes_edges_whose_conditions_hold() -> Result<(), TscError> {
        let tsc = tsc()?;
        let instance = tsc.evaluate(&Road { lanes: 2, wet: false }, "segment-1");

        assert_eq!(instance.source_identifier(), "segment-1");
        assert_eq!(instance.root().edges().len(), 2);
        assert_eq!(instance.leaf_labels(), vec!["multi"]);

        let lanes = instance.root().edges()[0].destination();
        assert_eq!(lanes.value(), Some(&NodeValue::Int(2)));

        let surface = instance.root().edges()[1].destination();
        assert_eq!(surface.monitor_results().get("known"), Some(&true));
        assert!(surface.edges().is_empty());

        Ok(())
    }

    #[test]
    fn render_tree() -> Result<(), TscError> {
        let tsc = TscBuilder::<()>::new("t")
            .root(any("root").child(leaf("a")).child(leaf("b")))
            .build()?;

        assert_eq!(tsc.to_string(), "t\n  root (any)\n    a (leaf)\n    b (leaf)\n");
        Ok(())
    }
}
