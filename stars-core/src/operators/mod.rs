//! Temporal operators for constructing formulas over the ticks of a frame.
//!
//! Every operator in this module is a pure function evaluated at a [`TickRef`], which is usually
//! the anchor of a [`Frame`](crate::Frame) yielded by a [`TickWindow`](crate::TickWindow) or the
//! first tick of a [`PredicateContext`](crate::PredicateContext). Sub-formulas are closures taking
//! a `TickRef` and returning `bool`, so formulas are composed by nesting operator calls inside of
//! closures:
//!
//! ```rust
//! use stars_core::{Frame, Interval};
//! use stars_core::operators::{eventually, globally};
//! use std::rc::Rc;
//!
//! let speeds: Vec<Rc<f64>> = [3.0, 5.0, 9.0, 12.0, 11.0].into_iter().map(Rc::new).collect();
//! let frame = Frame::anchored(speeds, 0).unwrap();
//!
//! // Within the next 3 ticks the speed exceeds 8 and stays above it afterwards
//! let phi = eventually(frame.anchor(), Some(Interval::new(0, 3).unwrap()), |tick| {
//!     globally(tick, None, |inner| *inner > 8.0)
//! });
//!
//! assert!(phi);
//! ```
//!
//! # Ticks in scope
//!
//! Operators only consider the ticks reachable from the evaluated tick inside its frame. Each tick
//! has an offset relative to the evaluated tick, which is `0` for the tick itself and grows by one
//! for each step towards the future (forward operators) or the past (backward operators). An
//! optional [`Interval`](crate::Interval) restricts the offsets in scope; without an interval every
//! reachable offset is in scope.
//!
//! When no tick is in scope, existential operators ([`next`], [`previous`], [`eventually`],
//! [`once`], [`until`], [`since`]) evaluate to `false`, universal operators ([`globally`],
//! [`historically`]) evaluate to `true`, and prevalence operators evaluate to `true`.
//!
//! # Forward Operators
//!
//!   - [`next`]
//!   - [`eventually`]
//!   - [`globally`]
//!   - [`until`]
//!   - [`min_prevalence`], [`max_prevalence`], [`prevalence`]
//!
//! # Backward Operators
//!
//!   - [`previous`]
//!   - [`once`]
//!   - [`historically`]
//!   - [`since`]
//!   - [`backto`]
//!   - [`past_min_prevalence`], [`past_max_prevalence`], [`past_prevalence`]
//!
//! # First Order Helpers
//!
//!   - [`exists`]
//!   - [`forall`]
//!   - [`bind`]

mod backward;
mod first_order;
mod forward;
mod prevalence;

pub use backward::{backto, historically, once, previous, since};
pub use first_order::{bind, exists, forall};
pub use forward::{eventually, globally, next, until};
pub use prevalence::{
    max_prevalence, min_prevalence, past_max_prevalence, past_min_prevalence, past_prevalence,
    prevalence, OperatorError, Percentage,
};

use crate::interval::Interval;
use crate::window::TickRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// Reachable ticks paired with their offset, starting with the evaluated tick at offset 0.
fn walk<'a, T>(tick: TickRef<'a, T>, direction: Direction) -> impl Iterator<Item = (usize, TickRef<'a, T>)> {
    std::iter::successors(Some(tick), move |current| match direction {
        Direction::Forward => current.next(),
        Direction::Backward => current.previous(),
    })
    .enumerate()
}

fn in_scope(interval: Option<&Interval>, offset: usize) -> bool {
    interval.map_or(true, |interval| interval.contains(offset))
}

fn out_of_scope(interval: Option<&Interval>, offset: usize) -> bool {
    interval.is_some_and(|interval| interval.is_exceeded_by(offset))
}

/// Search for a tick in scope where `trigger` holds, requiring `hold` at every tick before it.
///
/// This is the shared core of `until`/`since`, and with `hold` fixed to `true` of
/// `eventually`/`once`. Ticks before the start of the interval are not candidates for `trigger`
/// but still have to satisfy `hold`.
fn search<'a, T, H, G>(
    tick: TickRef<'a, T>,
    direction: Direction,
    interval: Option<&Interval>,
    hold: H,
    trigger: G,
) -> bool
where
    H: Fn(TickRef<'a, T>) -> bool,
    G: Fn(TickRef<'a, T>) -> bool,
{
    for (offset, current) in walk(tick, direction) {
        if out_of_scope(interval, offset) {
            break;
        }

        if in_scope(interval, offset) && trigger(current) {
            return true;
        }

        if !hold(current) {
            return false;
        }
    }

    false
}

/// Evaluate `phi` at the neighbour of `tick` in the given direction, which has offset 1.
fn step<'a, T, F>(tick: TickRef<'a, T>, direction: Direction, interval: Option<&Interval>, phi: F) -> bool
where
    F: Fn(TickRef<'a, T>) -> bool,
{
    let neighbour = match direction {
        Direction::Forward => tick.next(),
        Direction::Backward => tick.previous(),
    };

    neighbour.is_some_and(|neighbour| in_scope(interval, 1) && phi(neighbour))
}
