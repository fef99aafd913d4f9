//! Fluent construction of taxonomies.
//!
//! Nodes are created with the [`leaf`], [`all`], [`any`], [`exclusive`], [`optional`] and
//! [`bounded`] functions and nested using [`NodeBuilder::child`]. The tree is checked once, when
//! [`TscBuilder::build`] finalizes it into an immutable [`Tsc`].
//!
//! ```rust
//! use stars_tsc::builder::{all, exclusive, leaf, TscBuilder};
//!
//! struct Weather {
//!     raining: bool,
//! }
//!
//! let tsc = TscBuilder::new("weather")
//!     .root(all("root").child(
//!         exclusive("precipitation")
//!             .child(leaf("rain").condition(|w: &Weather| w.raining))
//!             .child(leaf("dry").condition(|w: &Weather| !w.raining)),
//!     ))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(tsc.leaf_labels(), vec!["rain", "dry"]);
//! ```
use std::collections::HashSet;
use std::rc::Rc;

use petgraph::graph::{DiGraph, NodeIndex};
use thiserror::Error;
use tracing::debug;

use crate::node::{Condition, Monitor, NodeKind, NodeValue, ProjectionTag, TscEdge, TscNode, ValueFunction};
use crate::tsc::Tsc;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TscError {
    #[error("Taxonomy {0} has no root node")]
    MissingRoot(String),

    #[error("Taxonomy {identifier} has {count} root nodes, expected exactly one")]
    MultipleRoots { identifier: String, count: usize },

    #[error("Node {parent} has more than one child labeled {label}")]
    DuplicateChildLabel { parent: String, label: String },

    #[error("Node {node} has more than one monitor labeled {label}")]
    DuplicateMonitorLabel { node: String, label: String },

    #[error("Node {node} has more than one projection labeled {label}")]
    DuplicateProjectionLabel { node: String, label: String },

    #[error("Bounded node {label} has lower bound {lower} greater than upper bound {upper}")]
    InvalidBounds { label: String, lower: usize, upper: usize },

    #[error("Leaf node {0} cannot have children")]
    LeafWithChildren(String),
}

/// A taxonomy node under construction.
pub struct NodeBuilder<C> {
    label: String,
    kind: NodeKind,
    condition: Option<Condition<C>>,
    value: Option<ValueFunction<C>>,
    monitors: Vec<Monitor<C>>,
    projections: Vec<ProjectionTag>,
    children: Vec<NodeBuilder<C>>,
}

fn node<C>(label: impl Into<String>, kind: NodeKind) -> NodeBuilder<C> {
    NodeBuilder {
        label: label.into(),
        kind,
        condition: None,
        value: None,
        monitors: Vec::new(),
        projections: Vec::new(),
        children: Vec::new(),
    }
}

pub fn leaf<C>(label: impl Into<String>) -> NodeBuilder<C> {
    node(label, NodeKind::Leaf)
}

pub fn all<C>(label: impl Into<String>) -> NodeBuilder<C> {
    node(label, NodeKind::All)
}

pub fn any<C>(label: impl Into<String>) -> NodeBuilder<C> {
    node(label, NodeKind::Any)
}

pub fn exclusive<C>(label: impl Into<String>) -> NodeBuilder<C> {
    node(label, NodeKind::Exclusive)
}

pub fn optional<C>(label: impl Into<String>) -> NodeBuilder<C> {
    node(label, NodeKind::Optional)
}

/// A node taking between `lower` and `upper` of its edges, both inclusive.
pub fn bounded<C>(label: impl Into<String>, lower: usize, upper: usize) -> NodeBuilder<C> {
    node(label, NodeKind::Bounded { lower, upper })
}

impl<C> NodeBuilder<C> {
    /// Gate the edge leading to this node. The condition of a root node is never evaluated.
    pub fn condition<F>(mut self, condition: F) -> Self
    where
        F: Fn(&C) -> bool + 'static,
    {
        self.condition = Some(Rc::new(condition));
        self
    }

    /// Compute a value for the node every time it is visited.
    pub fn value<F, V>(mut self, value: F) -> Self
    where
        F: Fn(&C) -> V + 'static,
        V: Into<NodeValue>,
    {
        self.value = Some(Rc::new(move |context: &C| value(context).into()));
        self
    }

    pub fn monitor<F>(mut self, label: impl Into<String>, check: F) -> Self
    where
        F: Fn(&C) -> bool + 'static,
    {
        self.monitors.push(Monitor::new(label.into(), Rc::new(check)));
        self
    }

    /// Place this node in the projection `label`.
    pub fn projection(mut self, label: impl Into<String>) -> Self {
        self.projections.push(ProjectionTag {
            label: label.into(),
            recursive: false,
        });
        self
    }

    /// Place this node and all of its descendants in the projection `label`.
    pub fn projection_recursive(mut self, label: impl Into<String>) -> Self {
        self.projections.push(ProjectionTag {
            label: label.into(),
            recursive: true,
        });
        self
    }

    pub fn child(mut self, child: NodeBuilder<C>) -> Self {
        self.children.push(child);
        self
    }

    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = NodeBuilder<C>>,
    {
        self.children.extend(children);
        self
    }

    fn check(&self) -> Result<(), TscError> {
        fn first_duplicate<'a, I>(labels: I) -> Option<&'a str>
        where
            I: IntoIterator<Item = &'a str>,
        {
            let mut seen = HashSet::new();
            labels.into_iter().find(|label| !seen.insert(*label))
        }

        if let NodeKind::Bounded { lower, upper } = self.kind {
            if lower > upper {
                return Err(TscError::InvalidBounds {
                    label: self.label.clone(),
                    lower,
                    upper,
                });
            }
        }

        if self.kind == NodeKind::Leaf && !self.children.is_empty() {
            return Err(TscError::LeafWithChildren(self.label.clone()));
        }

        if let Some(label) = first_duplicate(self.children.iter().map(|child| child.label.as_str())) {
            return Err(TscError::DuplicateChildLabel {
                parent: self.label.clone(),
                label: label.to_string(),
            });
        }

        if let Some(label) = first_duplicate(self.monitors.iter().map(Monitor::label)) {
            return Err(TscError::DuplicateMonitorLabel {
                node: self.label.clone(),
                label: label.to_string(),
            });
        }

        if let Some(label) = first_duplicate(self.projections.iter().map(|tag| tag.label.as_str())) {
            return Err(TscError::DuplicateProjectionLabel {
                node: self.label.clone(),
                label: label.to_string(),
            });
        }

        Ok(())
    }

    /// Add this node and its descendants to the graph, returning the index of this node and the
    /// condition for the edge leading to it.
    fn insert(self, graph: &mut DiGraph<TscNode<C>, TscEdge<C>>) -> Result<(NodeIndex, Option<Condition<C>>), TscError> {
        self.check()?;

        let index = graph.add_node(TscNode {
            label: self.label,
            kind: self.kind,
            value: self.value,
            monitors: self.monitors,
            projections: self.projections,
        });

        for child in self.children {
            let label = child.label.clone();
            let (child_index, condition) = child.insert(graph)?;

            graph.add_edge(index, child_index, TscEdge { label, condition });
        }

        Ok((index, self.condition))
    }
}

/// Collects the root node of a taxonomy and finalizes it.
pub struct TscBuilder<C> {
    identifier: String,
    roots: Vec<NodeBuilder<C>>,
}

impl<C> TscBuilder<C> {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            roots: Vec::new(),
        }
    }

    pub fn root(mut self, root: NodeBuilder<C>) -> Self {
        self.roots.push(root);
        self
    }

    /// Check the tree and build the taxonomy.
    ///
    /// Fails if there is not exactly one root, if siblings share a label, if a node has two
    /// monitors or two projection tags with the same label, if a bounded node has a lower bound
    /// greater than its upper bound, or if a leaf has children.
    pub fn build(mut self) -> Result<Tsc<C>, TscError> {
        let root = match self.roots.len() {
            0 => return Err(TscError::MissingRoot(self.identifier)),
            1 => self.roots.remove(0),
            count => {
                return Err(TscError::MultipleRoots {
                    identifier: self.identifier,
                    count,
                })
            }
        };

        let mut graph = DiGraph::new();
        let (root, condition) = root.insert(&mut graph)?;

        if condition.is_some() {
            debug!(tsc = %self.identifier, "Ignoring condition of root node");
        }

        debug!(
            tsc = %self.identifier,
            nodes = graph.node_count(),
            "Built taxonomy"
        );

        Ok(Tsc::new(self.identifier, graph, root))
    }
}

#[cfg(test)]
mod tests {
    use super::{all, any, bounded, exclusive, leaf, optional, TscBuilder, TscError};

    type Builder = TscBuilder<()>;

    #[test]
    fn exactly_one_root() {
        assert_eq!(Builder::new("t").build().err(), Some(TscError::MissingRoot("t".into())));

        let two = Builder::new("t").root(leaf("a")).root(leaf("b")).build();
        assert_eq!(
            two.err(),
            Some(TscError::MultipleRoots {
                identifier: "t".into(),
                count: 2
            })
        );
    }

    #[test]
    fn duplicate_sibling_labels() {
        let tsc = Builder::new("t")
            .root(all("root").child(any("x").child(leaf("a")).child(leaf("a"))))
            .build();

        assert_eq!(
            tsc.err(),
            Some(TscError::DuplicateChildLabel {
                parent: "x".into(),
                label: "a".into()
            })
        );

        // The same label under different parents is fine
        let tsc = Builder::new("t")
            .root(all("root").child(optional("x").child(leaf("a"))).child(optional("y").child(leaf("a"))))
            .build();

        assert!(tsc.is_ok());
    }

    #[test]
    fn duplicate_monitor_and_projection_labels() {
        let monitors = Builder::new("t")
            .root(leaf("a").monitor("m", |_| true).monitor("m", |_| false))
            .build();

        assert!(matches!(monitors, Err(TscError::DuplicateMonitorLabel { .. })));

        let projections = Builder::new("t")
            .root(all("root").child(leaf("a").projection("p").projection_recursive("p")))
            .build();

        assert!(matches!(projections, Err(TscError::DuplicateProjectionLabel { .. })));
    }

    #[test]
    fn invalid_nodes() {
        let inverted = Builder::new("t").root(bounded("root", 3, 1).child(leaf("a"))).build();
        assert!(matches!(inverted, Err(TscError::InvalidBounds { lower: 3, upper: 1, .. })));

        let leaf_parent = Builder::new("t").root(leaf("root").child(leaf("a"))).build();
        assert_eq!(leaf_parent.err(), Some(TscError::LeafWithChildren("root".into())));

        let empty_exclusive = Builder::new("t").root(exclusive("root")).build();
        assert!(empty_exclusive.is_ok());
    }
}
