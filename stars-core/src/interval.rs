use std::fmt::{Display, Formatter};
use std::ops::{Range, RangeFrom};

use thiserror::Error;

/// Errors produced when constructing an [`Interval`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IntervalError {
    #[error("Interval lower bound must not be negative, got {0}")]
    NegativeLowerBound(i64),

    #[error("Interval [{0},{1}) is empty")]
    EmptyInterval(i64, i64),
}

/// A half-open range of tick offsets `[lo, hi)` used to bound temporal operators.
///
/// Offsets are measured in ticks relative to the tick an operator is evaluated at, which itself
/// has offset `0`. For a forward operator the tick at offset `2` is two successors ahead, for a
/// backward operator it is two predecessors behind. An interval can also be unbounded on the
/// right, in which case it contains every offset greater than or equal to its lower bound.
///
/// ```rust
/// use stars_core::Interval;
///
/// let bounded = Interval::new(1, 3).unwrap();
/// assert!(!bounded.contains(0));
/// assert!(bounded.contains(2));
/// assert!(!bounded.contains(3));
///
/// let unbounded = Interval::starting_at(2).unwrap();
/// assert!(unbounded.contains(1_000));
///
/// assert!(Interval::new(3, 3).is_err());
/// assert!(Interval::new(-1, 3).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    lo: usize,
    hi: Option<usize>,
}

fn lower_bound(lo: i64) -> Result<usize, IntervalError> {
    usize::try_from(lo).map_err(|_| IntervalError::NegativeLowerBound(lo))
}

impl Interval {
    /// Create the bounded interval `[lo, hi)`.
    ///
    /// Fails if `lo` is negative or if `lo >= hi`.
    pub fn new(lo: i64, hi: i64) -> Result<Self, IntervalError> {
        let start = lower_bound(lo)?;

        if lo >= hi {
            return Err(IntervalError::EmptyInterval(lo, hi));
        }

        let end = usize::try_from(hi).map_err(|_| IntervalError::EmptyInterval(lo, hi))?;

        Ok(Self { lo: start, hi: Some(end) })
    }

    /// Create the right-unbounded interval `[lo, ∞)`.
    pub fn starting_at(lo: i64) -> Result<Self, IntervalError> {
        Ok(Self { lo: lower_bound(lo)?, hi: None })
    }

    pub fn lower(&self) -> usize {
        self.lo
    }

    pub fn upper(&self) -> Option<usize> {
        self.hi
    }

    /// Determine if the given tick offset lies within the interval.
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.lo && self.hi.map_or(true, |hi| offset < hi)
    }

    /// Determine if the given offset and every offset after it lie outside of the interval.
    pub fn is_exceeded_by(&self, offset: usize) -> bool {
        self.hi.is_some_and(|hi| offset >= hi)
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.hi {
            Some(hi) => write!(f, "[{},{})", self.lo, hi),
            None => write!(f, "[{},∞)", self.lo),
        }
    }
}

impl TryFrom<Range<i64>> for Interval {
    type Error = IntervalError;

    fn try_from(Range { start, end }: Range<i64>) -> Result<Self, Self::Error> {
        Self::new(start, end)
    }
}

impl TryFrom<RangeFrom<i64>> for Interval {
    type Error = IntervalError;

    fn try_from(RangeFrom { start }: RangeFrom<i64>) -> Result<Self, Self::Error> {
        Self::starting_at(start)
    }
}
