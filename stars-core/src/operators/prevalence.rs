use std::fmt::{Display, Formatter};

use ordered_float::NotNan;
use thiserror::Error;

use crate::interval::Interval;
use crate::window::TickRef;
use super::{in_scope, out_of_scope, walk, Direction};

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum OperatorError {
    #[error("Percentage must be a value in [0, 1], got {0}")]
    InvalidPercentage(f64),
}

/// A fraction in the closed range `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Percentage(NotNan<f64>);

impl Percentage {
    /// Create a new percentage, failing if the value is NaN or outside of `[0, 1]`.
    pub fn new(value: f64) -> Result<Self, OperatorError> {
        match NotNan::new(value) {
            Ok(value) if (0.0..=1.0).contains(&value.into_inner()) => Ok(Self(value)),
            _ => Err(OperatorError::InvalidPercentage(value)),
        }
    }

    pub fn value(&self) -> f64 {
        self.0.into_inner()
    }
}

impl TryFrom<f64> for Percentage {
    type Error = OperatorError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl Display for Percentage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.value() * 100.0)
    }
}

fn fraction<'a, T, F>(tick: TickRef<'a, T>, direction: Direction, interval: Option<&Interval>, phi: F) -> Option<f64>
where
    F: Fn(TickRef<'a, T>) -> bool,
{
    let (satisfied, total) = walk(tick, direction)
        .take_while(|&(offset, _)| !out_of_scope(interval, offset))
        .filter(|&(offset, _)| in_scope(interval, offset))
        .fold((0usize, 0usize), |(satisfied, total), (_, current)| {
            (satisfied + usize::from(phi(current)), total + 1)
        });

    (total > 0).then(|| satisfied as f64 / total as f64)
}

/// The fraction of ticks in scope from `tick` onwards where `phi` holds.
///
/// Returns `None` if no tick is in scope.
pub fn prevalence<'a, T, F>(tick: TickRef<'a, T>, interval: Option<Interval>, phi: F) -> Option<f64>
where
    F: Fn(TickRef<'a, T>) -> bool,
{
    fraction(tick, Direction::Forward, interval.as_ref(), phi)
}

/// Requires `phi` to hold in at least `percentage` of the ticks in scope from `tick` onwards.
///
/// Holds vacuously if no tick is in scope. A percentage of 0 always holds, and a percentage of 1
/// requires `phi` at every tick in scope.
pub fn min_prevalence<'a, T, F>(tick: TickRef<'a, T>, percentage: Percentage, interval: Option<Interval>, phi: F) -> bool
where
    F: Fn(TickRef<'a, T>) -> bool,
{
    prevalence(tick, interval, phi).map_or(true, |value| value >= percentage.value())
}

/// Requires `phi` to hold in at most `percentage` of the ticks in scope from `tick` onwards.
///
/// Holds vacuously if no tick is in scope.
pub fn max_prevalence<'a, T, F>(tick: TickRef<'a, T>, percentage: Percentage, interval: Option<Interval>, phi: F) -> bool
where
    F: Fn(TickRef<'a, T>) -> bool,
{
    prevalence(tick, interval, phi).map_or(true, |value| value <= percentage.value())
}

/// The fraction of ticks in scope up to and including `tick` where `phi` holds.
pub fn past_prevalence<'a, T, F>(tick: TickRef<'a, T>, interval: Option<Interval>, phi: F) -> Option<f64>
where
    F: Fn(TickRef<'a, T>) -> bool,
{
    fraction(tick, Direction::Backward, interval.as_ref(), phi)
}

/// Backward counterpart of [`min_prevalence`].
pub fn past_min_prevalence<'a, T, F>(
    tick: TickRef<'a, T>,
    percentage: Percentage,
    interval: Option<Interval>,
    phi: F,
) -> bool
where
    F: Fn(TickRef<'a, T>) -> bool,
{
    past_prevalence(tick, interval, phi).map_or(true, |value| value >= percentage.value())
}

/// Backward counterpart of [`max_prevalence`].
pub fn past_max_prevalence<'a, T, F>(
    tick: TickRef<'a, T>,
    percentage: Percentage,
    interval: Option<Interval>,
    phi: F,
) -> bool
where
    F: Fn(TickRef<'a, T>) -> bool,
{
    past_prevalence(tick, interval, phi).map_or(true, |value| value <= percentage.value())
}
