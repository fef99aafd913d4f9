//! Runtime monitoring and scenario classification for recorded driving simulations.
//!
//! A simulation run is recorded as a sequence of timestamped ticks, each a snapshot of the
//! entities (vehicles, pedestrians, ...) in the simulation. `stars` evaluates such recordings in
//! three layers:
//!
//!   - [temporal operators](operators) such as `eventually`, `until` or `since` evaluate
//!     properties against a tick and its neighbours, bounded by tick-count [`Interval`]s,
//!   - a scenario taxonomy ([`Tsc`]) classifies a segment of a recording into the subtree of
//!     scenario features it exhibits, a [`TscInstance`],
//!   - a [`TscEvaluation`] consumes segments lazily and collects metrics such as the distinct
//!     valid instances of every taxonomy, or the instances that were never observed.
//!
//! # Examples
//!
//! Temporal operators are evaluated against the anchor of a [`Frame`], usually produced by a
//! [`TickWindow`] sliding over a tick source:
//!
//! ```rust
//! use stars::{Interval, IterationMode, IterationOrder, TickWindow};
//! use stars::operators::{globally, until};
//!
//! let speeds = vec![3.0, 5.0, 8.0, 12.0, 12.5];
//! let mut window: TickWindow<f64, _> =
//!     TickWindow::new(5, IterationOrder::Forward, IterationMode::StartFilled, speeds).unwrap();
//!
//! let frame = window.frames().unwrap().next().unwrap();
//! let start = frame.anchor();
//!
//! assert!(globally(start, None, |tick| *tick > 0.0));
//! assert!(until(start, Some(Interval::new(0, 4).unwrap()), |tick| *tick < 10.0, |tick| *tick > 10.0));
//! ```
//!
//! Taxonomies are built from labeled nodes, each gating its children with conditions on a context:
//!
//! ```rust
//! use stars::tsc::builder::{all, exclusive, leaf, TscBuilder};
//! use stars::BigUint;
//!
//! let tsc = TscBuilder::new("speed")
//!     .root(
//!         all("root").child(
//!             exclusive("speed")
//!                 .child(leaf("fast").condition(|speed: &f64| *speed >= 30.0))
//!                 .child(leaf("slow").condition(|speed: &f64| *speed < 30.0)),
//!         ),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let instance = tsc.evaluate(&42.0, "segment-1");
//!
//! assert!(instance.is_valid());
//! assert_eq!(instance.leaf_labels(), vec!["fast"]);
//! assert_eq!(tsc.instance_count(), BigUint::from(2u32));
//! ```

#[doc(inline)]
pub use stars_core::{
    EntityData, EntityId, Frame, Interval, IntervalError, IterationMode, IterationOrder, PredicateContext, Segment,
    TickData, TickRef, TickWindow, Trace, WindowError,
};

#[doc(inline)]
pub use stars_core::trace::TraceError;

#[doc(inline)]
pub use stars_core::operators;

#[doc(inline)]
pub use stars_core::predicate;

#[doc(inline)]
pub use stars_core::predicate::{BinaryPredicate, UnaryPredicate};

/// Scenario taxonomies and their instances.
pub mod tsc {
    #[doc(inline)]
    pub use stars_tsc::*;
}

#[doc(inline)]
pub use stars_tsc::{BigUint, NodeKind, Tsc, TscBuilder, TscInstance};

/// Evaluation of taxonomies over segment sequences.
pub mod eval {
    #[doc(inline)]
    pub use stars_eval::*;
}

#[doc(inline)]
pub use stars_eval::{providers, EvaluationConfig, EvaluationError, MetricProvider, TscEvaluation};
