use crate::interval::Interval;
use crate::window::TickRef;
use super::{search, step, Direction};

/// Requires `phi` to hold at the successor of `tick`.
///
/// The successor has offset 1, so a bounded `next` only holds if the interval contains 1. Without
/// an interval the successor must exist and satisfy `phi`.
///
/// | tick    | 0     | 1     | 2     | 3     |
/// | ------- | ----- | ----- | ----- | ----- |
/// | phi     | false | true  | true  | false |
/// | next    | true  | true  | false | false |
pub fn next<'a, T, F>(tick: TickRef<'a, T>, interval: Option<Interval>, phi: F) -> bool
where
    F: Fn(TickRef<'a, T>) -> bool,
{
    step(tick, Direction::Forward, interval.as_ref(), phi)
}

/// Requires `phi` to hold at `tick` or at some later tick in scope.
///
/// | tick       | 0     | 1     | 2     | 3     |
/// | ---------- | ----- | ----- | ----- | ----- |
/// | phi        | false | false | true  | false |
/// | eventually | true  | true  | true  | false |
pub fn eventually<'a, T, F>(tick: TickRef<'a, T>, interval: Option<Interval>, phi: F) -> bool
where
    F: Fn(TickRef<'a, T>) -> bool,
{
    search(tick, Direction::Forward, interval.as_ref(), |_| true, phi)
}

/// Requires `phi` to hold at every tick in scope from `tick` onwards.
///
/// Equivalent to `!eventually(!phi)`, so it holds vacuously when no tick is in scope.
///
/// | tick     | 0     | 1     | 2     | 3     |
/// | -------- | ----- | ----- | ----- | ----- |
/// | phi      | false | true  | true  | true  |
/// | globally | false | true  | true  | true  |
pub fn globally<'a, T, F>(tick: TickRef<'a, T>, interval: Option<Interval>, phi: F) -> bool
where
    F: Fn(TickRef<'a, T>) -> bool,
{
    !eventually(tick, interval, |current| !phi(current))
}

/// Requires `rhs` to hold at some tick in scope, and `lhs` to hold at every tick from `tick` up
/// to, but excluding, that tick.
///
/// | tick  | 0     | 1     | 2     | 3     |
/// | ----- | ----- | ----- | ----- | ----- |
/// | lhs   | true  | true  | false | false |
/// | rhs   | false | false | true  | false |
/// | until | true  | true  | true  | false |
pub fn until<'a, T, L, R>(tick: TickRef<'a, T>, interval: Option<Interval>, lhs: L, rhs: R) -> bool
where
    L: Fn(TickRef<'a, T>) -> bool,
    R: Fn(TickRef<'a, T>) -> bool,
{
    search(tick, Direction::Forward, interval.as_ref(), lhs, rhs)
}
