//! Tick windows and temporal operators for monitoring simulation traces.
//!
//! A simulation run is recorded as a sequence of [`TickData`] values, each a timestamped snapshot
//! of the entities in the simulation. This crate provides the machinery for evaluating temporal
//! properties against such sequences:
//!
//!   - [`Trace`] stores ticks ordered by their time,
//!   - [`TickWindow`] turns a pull-based tick source into a lazy sequence of bounded [`Frame`]s,
//!   - [`operators`] contains the temporal operators (`next`, `eventually`, `until`, `since`, ...)
//!     evaluated against the anchor tick of a frame,
//!   - [`predicate`] provides entity predicates dispatched on an entity kind tag,
//!   - [`Segment`] groups the ticks of one slice of a simulation run for evaluation.
//!
//! # Examples
//!
//! ```rust
//! use stars_core::{IterationMode, IterationOrder, Interval, TickWindow};
//! use stars_core::operators::eventually;
//!
//! let speeds: Vec<f64> = vec![10.0, 12.0, 17.0, 21.0];
//! let mut window: TickWindow<f64, _> =
//!     TickWindow::new(3, IterationOrder::Forward, IterationMode::StartFilled, speeds).unwrap();
//!
//! let interval = Interval::new(0, 2).unwrap();
//! let accelerating: Vec<bool> = window
//!     .frames()
//!     .unwrap()
//!     .map(|frame| eventually(frame.anchor(), Some(interval), |tick| *tick > 15.0))
//!     .collect();
//!
//! assert_eq!(accelerating, vec![false, true, true, true]);
//! ```

pub mod interval;
pub mod operators;
pub mod predicate;
pub mod segment;
pub mod tick;
pub mod trace;
pub mod window;

pub use crate::interval::{Interval, IntervalError};
pub use crate::segment::{PredicateContext, Segment};
pub use crate::tick::{EntityData, EntityId, TickData};
pub use crate::trace::Trace;
pub use crate::window::{Frame, IterationMode, IterationOrder, TickRef, TickWindow, WindowError};
