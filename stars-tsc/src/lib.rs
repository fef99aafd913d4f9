//! Tree-based scenario classification.
//!
//! A taxonomy ([`Tsc`]) describes the space of scenarios a system under test may encounter as a
//! tree of labeled nodes. Each node has a [`NodeKind`] deciding how many of its children a
//! scenario may exhibit at once, and each child is gated by a condition evaluated against a
//! context, usually the [`PredicateContext`](https://docs.rs/stars-core) of a recorded segment.
//!
//! Evaluating a taxonomy against a context yields a [`TscInstance`], the subtree of the scenario
//! space that was observed. Instances can be validated against the node bounds, compared
//! structurally across segments, and counted against the total number of possible instances
//! returned by [`Tsc::instance_count`].
//!
//! ```rust
//! use stars_tsc::builder::{all, leaf, optional, TscBuilder};
//!
//! let tsc = TscBuilder::new("example")
//!     .root(
//!         all("root")
//!             .child(leaf("fast").condition(|speed: &f64| *speed > 20.0))
//!             .child(optional("extras").child(leaf("slow").condition(|speed: &f64| *speed < 5.0))),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let instance = tsc.evaluate(&25.0, "segment-1");
//!
//! assert!(instance.is_valid());
//! assert_eq!(instance.leaf_labels(), vec!["fast"]);
//! assert_eq!(tsc.instance_count(), stars_tsc::BigUint::from(2u32));
//! ```

pub mod builder;
mod count;
pub mod instance;
pub mod node;
pub mod projection;
pub mod tsc;

pub use crate::builder::{TscBuilder, TscError};
pub use crate::instance::{BoundsViolation, FailedMonitor, MonitorValidation, TscInstance, TscInstanceEdge, TscInstanceNode};
pub use crate::node::{Monitor, NodeKind, NodeValue, ProjectionTag, TscEdge, TscNode};
pub use crate::projection::TscProjection;
pub use crate::tsc::Tsc;

pub use num_bigint::BigUint;
pub use petgraph::graph::{EdgeIndex, NodeIndex};
