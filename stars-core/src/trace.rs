//! A set of ticks where each tick is associated with a simulation time.
//!
//! A [`Trace`] is an associative map that represents the recorded ticks of a simulation run,
//! where the key for each tick is the time when it was recorded. Iteration always proceeds in
//! chronological order regardless of the order of insertion, which makes a `Trace` the natural
//! input for building a [`Segment`](crate::Segment) or feeding a
//! [`TickWindow`](crate::TickWindow).
//!
//! `f64` values do not support `Ord` due to the presence of NaN values, so the times are stored
//! as [`NotNan`] values. Inserting a NaN time is reported as a [`TraceError`] instead of panicking.
//!
//! # Examples
//!
//! ```rust
//! use stars_core::Trace;
//!
//! let mut trace = Trace::new();
//! trace.insert(1.0, "b").unwrap();
//! trace.insert(0.0, "a").unwrap();
//! trace.insert(2.0, "c").unwrap();
//!
//! let states: Vec<&str> = trace.states().copied().collect();
//! assert_eq!(states, vec!["a", "b", "c"]);
//! ```
//!
//! A `Trace` can also be collected from tick values directly, using [`TickData::tick_time`] as
//! the key for each tick:
//!
//! ```rust
//! # use stars_core::{EntityData, EntityId, TickData, Trace};
//! # struct Nothing;
//! # impl EntityData for Nothing {
//! #     type Kind = ();
//! #     fn id(&self) -> EntityId { 0 }
//! #     fn kind(&self) {}
//! # }
//! struct Tick(f64);
//!
//! impl TickData for Tick {
//!     type Entity = Nothing;
//!
//!     fn tick_time(&self) -> f64 {
//!         self.0
//!     }
//!
//!     fn entities(&self) -> &[Nothing] {
//!         &[]
//!     }
//! }
//!
//! let trace = Trace::from_ticks([Tick(0.5), Tick(0.0)]).unwrap();
//! assert_eq!(trace.times().collect::<Vec<_>>(), vec![0.0, 0.5]);
//! ```
use std::collections::BTreeMap;

use ordered_float::NotNan;
use thiserror::Error;

use crate::tick::TickData;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum TraceError {
    #[error("Tick time must not be NaN")]
    NanTime,
}

fn key(time: f64) -> Result<NotNan<f64>, TraceError> {
    NotNan::new(time).map_err(|_| TraceError::NanTime)
}

/// A set of values where each value is associated with a time.
///
/// See the [`trace`](crate::trace) module for more information about the semantics of this type.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Trace<T>(BTreeMap<NotNan<f64>, T>);

impl<T> Default for Trace<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<(NotNan<f64>, T)> for Trace<T> {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (NotNan<f64>, T)>,
    {
        Self(iter.into_iter().collect())
    }
}

impl<T> Trace<T> {
    /// Create a new empty trace. Equivalent to [`Trace::default()`]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Create a trace from `(time, state)` pairs, failing if any time is NaN.
    pub fn try_from_iter<I>(iter: I) -> Result<Self, TraceError>
    where
        I: IntoIterator<Item = (f64, T)>,
    {
        iter.into_iter()
            .map(|(time, state)| key(time).map(|time| (time, state)))
            .collect()
    }

    /// Number of elements in the trace
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Determine if the trace contains any elements
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the state for a given time. Returns None if the time is not present in the trace.
    pub fn at_time(&self, time: f64) -> Option<&T> {
        key(time).ok().and_then(|key| self.0.get(&key))
    }

    /// Insert a state for a given time into the trace. Returns the prior state if it exists.
    pub fn insert(&mut self, time: f64, state: T) -> Result<Option<T>, TraceError> {
        Ok(self.0.insert(key(time)?, state))
    }

    /// Create an iterator yielding (time, &state) values in chronological order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (f64, &T)> + ExactSizeIterator {
        self.0.iter().map(|(time, state)| (time.into_inner(), state))
    }

    /// Create an iterator yielding time values in chronological order.
    pub fn times(&self) -> impl DoubleEndedIterator<Item = f64> + ExactSizeIterator + '_ {
        self.0.keys().map(|time| time.into_inner())
    }

    /// Create an iterator yielding &state values in chronological order.
    pub fn states(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.0.values()
    }

    /// Consume the trace, yielding the states in chronological order.
    pub fn into_states(self) -> impl DoubleEndedIterator<Item = T> + ExactSizeIterator {
        self.0.into_values()
    }

    /// The earliest time in the trace, if any.
    pub fn first_time(&self) -> Option<f64> {
        self.0.keys().next().map(|time| time.into_inner())
    }

    /// The latest time in the trace, if any.
    pub fn last_time(&self) -> Option<f64> {
        self.0.keys().next_back().map(|time| time.into_inner())
    }
}

impl<T> Trace<T>
where
    T: TickData,
{
    /// Create a trace from tick values keyed by their own tick time.
    ///
    /// Ticks sharing the same time replace one another, keeping the one that comes last.
    pub fn from_ticks<I>(ticks: I) -> Result<Self, TraceError>
    where
        I: IntoIterator<Item = T>,
    {
        Self::try_from_iter(ticks.into_iter().map(|tick| (tick.tick_time(), tick)))
    }
}

impl<T> IntoIterator for Trace<T> {
    type Item = (f64, T);
    type IntoIter = std::iter::Map<
        std::collections::btree_map::IntoIter<NotNan<f64>, T>,
        fn((NotNan<f64>, T)) -> (f64, T),
    >;

    fn into_iter(self) -> Self::IntoIter {
        fn unwrap_time<T>((time, state): (NotNan<f64>, T)) -> (f64, T) {
            (time.into_inner(), state)
        }

        self.0.into_iter().map(unwrap_time as fn((NotNan<f64>, T)) -> (f64, T))
    }
}

#[cfg(test)]
mod tests {
    use super::{Trace, TraceError};

    #[test]
    fn get_element() -> Result<(), TraceError> {
        let times = (0..10).map(f64::from);
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        let trace = Trace::try_from_iter(times.zip(values))?;

        assert_eq!(trace.at_time(3.0), Some(&4.0));
        assert_eq!(trace.at_time(f64::NAN), None);

        Ok(())
    }

    #[test]
    fn chronological_order() -> Result<(), TraceError> {
        let mut trace = Trace::new();
        trace.insert(4.0, 'd')?;
        trace.insert(1.0, 'a')?;
        trace.insert(3.0, 'c')?;
        trace.insert(2.0, 'b')?;

        assert_eq!(trace.times().collect::<Vec<_>>(), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(trace.states().copied().collect::<String>(), "abcd");
        assert_eq!(trace.first_time(), Some(1.0));
        assert_eq!(trace.last_time(), Some(4.0));
        assert_eq!(trace.into_states().rev().collect::<String>(), "dcba");

        Ok(())
    }

    #[test]
    fn nan_times_are_rejected() {
        let mut trace = Trace::new();

        assert_eq!(trace.insert(f64::NAN, ()), Err(TraceError::NanTime));
        assert!(Trace::try_from_iter([(0.0, ()), (f64::NAN, ())]).is_err());
        assert!(trace.is_empty());
    }
}
