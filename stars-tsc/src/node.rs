use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;

use ordered_float::OrderedFloat;

/// Successor semantics of a taxonomy node.
///
/// The kind determines how many outgoing edges of a node may be taken in a valid instance. Only
/// [`NodeKind::Bounded`] states its bounds explicitly, the other kinds derive them from the number
/// of children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// No children
    Leaf,

    /// Every edge is taken
    All,

    /// At least one edge is taken
    Any,

    /// Exactly one edge is taken
    Exclusive,

    /// Any subset of the edges is taken, including none
    Optional,

    /// Between `lower` and `upper` edges are taken, both inclusive
    Bounded { lower: usize, upper: usize },
}

impl NodeKind {
    /// Inclusive range of the number of edges that may be taken for a node with `children`
    /// children.
    pub fn bounds(&self, children: usize) -> (usize, usize) {
        match *self {
            Self::Leaf => (0, 0),
            Self::All => (children, children),
            Self::Any => (1, children),
            Self::Exclusive => (1, 1),
            Self::Optional => (0, children),
            Self::Bounded { lower, upper } => (lower, upper),
        }
    }
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Leaf => write!(f, "leaf"),
            Self::All => write!(f, "all"),
            Self::Any => write!(f, "any"),
            Self::Exclusive => write!(f, "exclusive"),
            Self::Optional => write!(f, "optional"),
            Self::Bounded { lower, upper } => write!(f, "bounded({lower}, {upper})"),
        }
    }
}

/// Value computed for a node from the evaluation context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeValue {
    Bool(bool),
    Int(i64),
    Real(OrderedFloat<f64>),
    Text(String),
}

impl Display for NodeValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Real(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value}"),
        }
    }
}

impl From<bool> for NodeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for NodeValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for NodeValue {
    fn from(value: f64) -> Self {
        Self::Real(OrderedFloat(value))
    }
}

impl From<String> for NodeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for NodeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

pub(crate) type Condition<C> = Rc<dyn Fn(&C) -> bool>;
pub(crate) type ValueFunction<C> = Rc<dyn Fn(&C) -> NodeValue>;

/// A named diagnostic check recorded at a node without affecting which edges are taken.
pub struct Monitor<C> {
    label: String,
    check: Condition<C>,
}

impl<C> Monitor<C> {
    pub(crate) fn new(label: String, check: Condition<C>) -> Self {
        Self { label, check }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn check(&self, context: &C) -> bool {
        (self.check)(context)
    }
}

impl<C> Clone for Monitor<C> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            check: Rc::clone(&self.check),
        }
    }
}

impl<C> Debug for Monitor<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Monitor").field(&self.label).finish()
    }
}

/// Membership of a node in a projection.
///
/// A recursive tag also places every descendant of the node in the projection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectionTag {
    pub label: String,
    pub recursive: bool,
}

/// A node of a taxonomy.
pub struct TscNode<C> {
    pub(crate) label: String,
    pub(crate) kind: NodeKind,
    pub(crate) value: Option<ValueFunction<C>>,
    pub(crate) monitors: Vec<Monitor<C>>,
    pub(crate) projections: Vec<ProjectionTag>,
}

impl<C> TscNode<C> {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn monitors(&self) -> &[Monitor<C>] {
        &self.monitors
    }

    pub fn projections(&self) -> &[ProjectionTag] {
        &self.projections
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    pub(crate) fn value(&self, context: &C) -> Option<NodeValue> {
        self.value.as_ref().map(|value| value(context))
    }

    /// Copy of the node for a projection, the copy is not tagged itself.
    pub(crate) fn projected(&self) -> Self {
        Self {
            projections: Vec::new(),
            ..self.clone()
        }
    }
}

impl<C> Clone for TscNode<C> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            kind: self.kind,
            value: self.value.clone(),
            monitors: self.monitors.clone(),
            projections: self.projections.clone(),
        }
    }
}

impl<C> Debug for TscNode<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TscNode")
            .field("label", &self.label)
            .field("kind", &self.kind)
            .field("value", &self.value.is_some())
            .field("monitors", &self.monitors)
            .field("projections", &self.projections)
            .finish()
    }
}

/// A link from a parent node to one of its children.
///
/// The edge carries the condition gating the child. Edges without a condition are always taken.
pub struct TscEdge<C> {
    pub(crate) label: String,
    pub(crate) condition: Option<Condition<C>>,
}

impl<C> TscEdge<C> {
    /// The label of the edge, which is the label of its destination node.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_conditional(&self) -> bool {
        self.condition.is_some()
    }

    pub fn holds(&self, context: &C) -> bool {
        self.condition.as_ref().map_or(true, |condition| condition(context))
    }
}

impl<C> Clone for TscEdge<C> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            condition: self.condition.clone(),
        }
    }
}

impl<C> Debug for TscEdge<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TscEdge")
            .field("label", &self.label)
            .field("conditional", &self.condition.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{NodeKind, NodeValue};

    #[test]
    fn bounds_by_kind() {
        assert_eq!(NodeKind::Leaf.bounds(0), (0, 0));
        assert_eq!(NodeKind::All.bounds(3), (3, 3));
        assert_eq!(NodeKind::Any.bounds(3), (1, 3));
        assert_eq!(NodeKind::Exclusive.bounds(3), (1, 1));
        assert_eq!(NodeKind::Optional.bounds(3), (0, 3));
        assert_eq!(NodeKind::Bounded { lower: 1, upper: 2 }.bounds(3), (1, 2));
    }

    #[test]
    fn display() {
        assert_eq!(NodeKind::Bounded { lower: 0, upper: 2 }.to_string(), "bounded(0, 2)");
        assert_eq!(NodeValue::from(2.5).to_string(), "2.5");
        assert_eq!(NodeValue::from("dry").to_string(), "dry");
    }
}
