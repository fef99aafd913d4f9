use std::rc::Rc;

use stars::operators::{
    backto, eventually, globally, historically, next, once, past_prevalence, prevalence, previous, since, until,
};
use stars::{Frame, Interval, IntervalError, TickRef};

/// Every boolean trace of length 1 to 5.
fn traces() -> impl Iterator<Item = Vec<bool>> {
    (1..=5usize).flat_map(|length| (0..1u32 << length).map(move |bits| (0..length).map(|i| bits & (1 << i) != 0).collect()))
}

/// No interval, every bounded interval inside [0, 7), and every right-unbounded interval.
fn intervals() -> Result<Vec<Option<Interval>>, IntervalError> {
    let mut intervals = vec![None];

    for lo in 0..6 {
        intervals.push(Some(Interval::starting_at(lo)?));

        for hi in lo + 1..=7 {
            intervals.push(Some(Interval::new(lo, hi)?));
        }
    }

    Ok(intervals)
}

/// Check an identity at every tick of every trace under every interval.
fn check<F>(name: &str, identity: F) -> Result<(), IntervalError>
where
    F: Fn(TickRef<'_, bool>, Option<Interval>) -> bool,
{
    let intervals = intervals()?;

    for trace in traces() {
        let ticks: Vec<Rc<bool>> = trace.iter().copied().map(Rc::new).collect();

        for anchor in 0..ticks.len() {
            let Some(frame) = Frame::anchored(ticks.clone(), anchor) else {
                panic!("anchor {anchor} out of bounds");
            };

            for interval in &intervals {
                assert!(
                    identity(frame.anchor(), *interval),
                    "{name} does not hold for {trace:?} at {anchor} with {interval:?}"
                );
            }
        }
    }

    Ok(())
}

fn phi(tick: TickRef<'_, bool>) -> bool {
    *tick
}

fn not_phi(tick: TickRef<'_, bool>) -> bool {
    !*tick
}

fn always(_: TickRef<'_, bool>) -> bool {
    true
}

#[test]
fn globally_is_not_eventually_not() -> Result<(), IntervalError> {
    check("globally", |tick, interval| {
        globally(tick, interval, phi) == !eventually(tick, interval, not_phi)
    })
}

#[test]
fn historically_is_not_once_not() -> Result<(), IntervalError> {
    check("historically", |tick, interval| {
        historically(tick, interval, phi) == !once(tick, interval, not_phi)
    })
}

#[test]
fn once_is_since_true() -> Result<(), IntervalError> {
    check("once", |tick, interval| once(tick, interval, phi) == since(tick, interval, always, phi))
}

#[test]
fn eventually_is_until_true() -> Result<(), IntervalError> {
    check("eventually", |tick, interval| {
        eventually(tick, interval, phi) == until(tick, interval, always, phi)
    })
}

#[test]
fn backto_is_symmetric() -> Result<(), IntervalError> {
    check("backto", |tick, interval| {
        backto(tick, interval, phi, not_phi) == backto(tick, interval, not_phi, phi)
    })
}

#[test]
fn next_and_previous_are_neighbours() -> Result<(), IntervalError> {
    check("next", |tick, _| next(tick, None, phi) == tick.next().map_or(false, phi))?;
    check("previous", |tick, _| previous(tick, None, phi) == tick.previous().map_or(false, phi))
}

#[test]
fn prevalence_bounds_the_temporal_operators() -> Result<(), IntervalError> {
    check("prevalence", |tick, interval| match prevalence(tick, interval, phi) {
        Some(fraction) => {
            (fraction >= 1.0) == globally(tick, interval, phi) && (fraction > 0.0) == eventually(tick, interval, phi)
        }
        None => globally(tick, interval, phi) && !eventually(tick, interval, phi),
    })?;

    check("past prevalence", |tick, interval| match past_prevalence(tick, interval, phi) {
        Some(fraction) => {
            (fraction >= 1.0) == historically(tick, interval, phi) && (fraction > 0.0) == once(tick, interval, phi)
        }
        None => historically(tick, interval, phi) && !once(tick, interval, phi),
    })
}

#[test]
fn interval_construction() {
    assert_eq!(Interval::new(-1, 3), Err(IntervalError::NegativeLowerBound(-1)));
    assert_eq!(Interval::new(3, 3), Err(IntervalError::EmptyInterval(3, 3)));
    assert_eq!(Interval::new(4, 2), Err(IntervalError::EmptyInterval(4, 2)));
    assert_eq!(Interval::starting_at(-2), Err(IntervalError::NegativeLowerBound(-2)));

    assert!(Interval::new(0, 1).is_ok());
    assert!(Interval::starting_at(0).is_ok());
}
