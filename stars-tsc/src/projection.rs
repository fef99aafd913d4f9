//! Splitting a taxonomy into projections.
//!
//! A projection is a sub-taxonomy classifying along a single concern, such as the weather or the
//! road layout. Nodes are placed in a projection by tagging them with
//! [`NodeBuilder::projection`](crate::builder::NodeBuilder::projection), or together with all of
//! their descendants with
//! [`NodeBuilder::projection_recursive`](crate::builder::NodeBuilder::projection_recursive).
//!
//! The root is part of every projection. Any other node is part of a projection if it is tagged
//! (directly or through a recursive tag of an ancestor) and its parent is part of the projection.
//! Node kinds are preserved, so `All`, `Any` and `Optional` nodes apply to the children that remain
//! in the projection, while `Exclusive` and `Bounded` nodes keep their bounds.
use std::collections::HashSet;

use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use crate::node::{TscEdge, TscNode};
use crate::tsc::Tsc;

/// A sub-taxonomy holding the nodes tagged with a single projection label.
#[derive(Debug, Clone)]
pub struct TscProjection<C> {
    pub identifier: String,
    pub tsc: Tsc<C>,
}

impl<C> Tsc<C> {
    /// Distinct projection labels in pre-order of first appearance.
    pub fn projection_labels(&self) -> Vec<&str> {
        let mut seen = HashSet::new();

        self.pre_order()
            .into_iter()
            .flat_map(|index| self.node(index).projections())
            .map(|tag| tag.label.as_str())
            .filter(|label| seen.insert(*label))
            .collect()
    }

    /// Build one projection for every projection label except the ignored ones.
    pub fn build_projections(&self, ignore: &[&str]) -> Vec<TscProjection<C>> {
        self.projection_labels()
            .into_iter()
            .filter(|label| !ignore.contains(label))
            .map(|label| self.project(label))
            .collect()
    }

    fn project(&self, label: &str) -> TscProjection<C> {
        let mut graph = DiGraph::new();
        let root = graph.add_node(self.node(self.root()).projected());
        let inherited = self.is_tagged(self.root(), label).1;

        self.copy_children(&mut graph, self.root(), root, label, inherited);

        let identifier = format!("{}/{}", self.identifier(), label);
        debug!(projection = %identifier, nodes = graph.node_count(), "Built projection");

        TscProjection {
            identifier: label.to_string(),
            tsc: Tsc::new(identifier, graph, root),
        }
    }

    /// Whether the node carries the tag, and whether the tag is recursive.
    fn is_tagged(&self, index: NodeIndex, label: &str) -> (bool, bool) {
        self.node(index)
            .projections()
            .iter()
            .find(|tag| tag.label == label)
            .map_or((false, false), |tag| (true, tag.recursive))
    }

    fn copy_children(
        &self,
        graph: &mut DiGraph<TscNode<C>, TscEdge<C>>,
        source: NodeIndex,
        target: NodeIndex,
        label: &str,
        inherited: bool,
    ) {
        for (edge, child) in self.children(source) {
            let (tagged, recursive) = self.is_tagged(child, label);

            if !(tagged || inherited) {
                continue;
            }

            let copy = graph.add_node(self.node(child).projected());
            graph.add_edge(target, copy, self.edge(edge).clone());

            self.copy_children(graph, child, copy, label, inherited || recursive);
        }
    }
}
