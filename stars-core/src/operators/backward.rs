use crate::interval::Interval;
use crate::window::TickRef;
use super::{search, step, Direction};

/// Requires `phi` to hold at the predecessor of `tick`.
///
/// The predecessor has offset 1, so a bounded `previous` only holds if the interval contains 1.
///
/// | tick     | 0     | 1     | 2     | 3     |
/// | -------- | ----- | ----- | ----- | ----- |
/// | phi      | true  | false | true  | true  |
/// | previous | false | true  | false | true  |
pub fn previous<'a, T, F>(tick: TickRef<'a, T>, interval: Option<Interval>, phi: F) -> bool
where
    F: Fn(TickRef<'a, T>) -> bool,
{
    step(tick, Direction::Backward, interval.as_ref(), phi)
}

/// Requires `phi` to hold at `tick` or at some earlier tick in scope.
///
/// | tick | 0     | 1     | 2     | 3     |
/// | ---- | ----- | ----- | ----- | ----- |
/// | phi  | false | true  | false | false |
/// | once | false | true  | true  | true  |
pub fn once<'a, T, F>(tick: TickRef<'a, T>, interval: Option<Interval>, phi: F) -> bool
where
    F: Fn(TickRef<'a, T>) -> bool,
{
    search(tick, Direction::Backward, interval.as_ref(), |_| true, phi)
}

/// Requires `phi` to hold at every tick in scope up to and including `tick`.
///
/// Equivalent to `!once(!phi)`, so it holds vacuously when no tick is in scope.
pub fn historically<'a, T, F>(tick: TickRef<'a, T>, interval: Option<Interval>, phi: F) -> bool
where
    F: Fn(TickRef<'a, T>) -> bool,
{
    !once(tick, interval, |current| !phi(current))
}

/// Requires `rhs` to hold at some earlier tick in scope (or at `tick` itself), and `lhs` to hold
/// at every tick after it up to and including `tick`.
///
/// | tick  | 0     | 1     | 2     | 3     |
/// | ----- | ----- | ----- | ----- | ----- |
/// | lhs   | false | true  | true  | false |
/// | rhs   | true  | false | false | false |
/// | since | true  | true  | true  | false |
pub fn since<'a, T, L, R>(tick: TickRef<'a, T>, interval: Option<Interval>, lhs: L, rhs: R) -> bool
where
    L: Fn(TickRef<'a, T>) -> bool,
    R: Fn(TickRef<'a, T>) -> bool,
{
    search(tick, Direction::Backward, interval.as_ref(), lhs, rhs)
}

/// Requires either formula to have held since the other one last held.
///
/// `backto(lhs, rhs)` holds if `since(lhs, rhs)` or `since(rhs, lhs)` holds. When both formulas
/// are false at `tick` it is false, and when either is true at a tick in scope it is true.
pub fn backto<'a, T, L, R>(tick: TickRef<'a, T>, interval: Option<Interval>, lhs: L, rhs: R) -> bool
where
    L: Fn(TickRef<'a, T>) -> bool,
    R: Fn(TickRef<'a, T>) -> bool,
{
    since(tick, interval, &lhs, &rhs) || since(tick, interval, &rhs, &lhs)
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use crate::interval::{Interval, IntervalError};
    use crate::operators::test::{frame, holds};
    use crate::window::Frame;
    use super::{backto, historically, once, previous, since};

    fn evaluate_all<F>(values: &[bool], f: F) -> Vec<bool>
    where
        F: Fn(&Frame<bool>) -> bool,
    {
        (0..values.len()).map(|anchor| f(&frame(values, anchor))).collect()
    }

    fn pairs(values: &[(bool, bool)]) -> Vec<Rc<(bool, bool)>> {
        values.iter().copied().map(Rc::new).collect()
    }

    #[test]
    fn previous_table() -> Result<(), IntervalError> {
        let values = [true, false, true, true];

        let unbounded = evaluate_all(&values, |f| previous(f.anchor(), None, holds));
        assert_eq!(unbounded, vec![false, true, false, true]);

        let interval = Interval::new(0, 2)?;
        let bounded = evaluate_all(&values, |f| previous(f.anchor(), Some(interval), holds));
        assert_eq!(bounded, unbounded);

        Ok(())
    }

    #[test]
    fn once_table() -> Result<(), IntervalError> {
        let values = [false, true, false, false];

        let unbounded = evaluate_all(&values, |f| once(f.anchor(), None, holds));
        assert_eq!(unbounded, vec![false, true, true, true]);

        let interval = Interval::new(0, 2)?;
        let bounded = evaluate_all(&values, |f| once(f.anchor(), Some(interval), holds));
        assert_eq!(bounded, vec![false, true, true, false]);

        Ok(())
    }

    #[test]
    fn historically_table() -> Result<(), IntervalError> {
        let values = [false, true, true, true];

        let unbounded = evaluate_all(&values, |f| historically(f.anchor(), None, holds));
        assert_eq!(unbounded, vec![false, false, false, false]);

        let interval = Interval::new(0, 3)?;
        let bounded = evaluate_all(&values, |f| historically(f.anchor(), Some(interval), holds));
        assert_eq!(bounded, vec![false, false, false, true]);

        let empty = Interval::starting_at(4)?;
        let vacuous = evaluate_all(&values, |f| historically(f.anchor(), Some(empty), holds));
        assert_eq!(vacuous, vec![true, true, true, true]);

        Ok(())
    }

    #[test]
    fn since_table() {
        let ticks = pairs(&[(false, true), (true, false), (true, false), (false, false)]);

        let result: Vec<bool> = (0..ticks.len())
            .map(|anchor| {
                let frame = Frame::anchored(ticks.clone(), anchor).unwrap();
                since(frame.anchor(), None, |t| t.0, |t| t.1)
            })
            .collect();

        assert_eq!(result, vec![true, true, true, false]);
    }

    #[test]
    fn backto_table() {
        let ticks = pairs(&[(true, false), (false, false), (false, true), (true, true), (false, false)]);

        let result: Vec<bool> = (0..ticks.len())
            .map(|anchor| {
                let frame = Frame::anchored(ticks.clone(), anchor).unwrap();
                backto(frame.anchor(), None, |t| t.0, |t| t.1)
            })
            .collect();

        assert_eq!(result, vec![true, false, true, true, false]);
    }
}
