//! Predicates over the entities of a tick.
//!
//! A predicate applies to entities of a specific kind. Evaluating a predicate against an entity
//! that is missing from the tick, or whose [`EntityData::kind`] tag does not match, is `false`
//! rather than an error, so predicates can be combined freely inside temporal formulas:
//!
//! ```rust
//! # use std::rc::Rc;
//! # use stars_core::{EntityData, EntityId, Frame, TickData};
//! use stars_core::predicate::UnaryPredicate;
//! # #[derive(Clone, Copy, PartialEq)]
//! # enum Kind { Vehicle, Pedestrian }
//! # struct Actor { id: EntityId, kind: Kind, speed: f64 }
//! # impl EntityData for Actor {
//! #     type Kind = Kind;
//! #     fn id(&self) -> EntityId { self.id }
//! #     fn kind(&self) -> Kind { self.kind }
//! # }
//! # struct Snapshot(Vec<Actor>);
//! # impl TickData for Snapshot {
//! #     type Entity = Actor;
//! #     fn tick_time(&self) -> f64 { 0.0 }
//! #     fn entities(&self) -> &[Actor] { &self.0 }
//! # }
//!
//! let speeding = UnaryPredicate::<Snapshot, _>::new(Kind::Vehicle, |_, vehicle: &Actor| vehicle.speed > 13.9);
//!
//! let tick = Snapshot(vec![
//!     Actor { id: 1, kind: Kind::Vehicle, speed: 20.0 },
//!     Actor { id: 2, kind: Kind::Pedestrian, speed: 20.0 },
//! ]);
//! let frame = Frame::anchored(vec![Rc::new(tick)], 0).unwrap();
//!
//! assert!(speeding.holds(frame.anchor(), 1));
//! assert!(!speeding.holds(frame.anchor(), 2));
//! assert!(!speeding.holds(frame.anchor(), 3));
//! ```
use thiserror::Error;

use crate::tick::{EntityData, EntityId, TickData};
use crate::window::TickRef;

type Kind<T> = <<T as TickData>::Entity as EntityData>::Kind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PredicateError {
    #[error("Entities must be looked up in the same tick, got ticks at positions {0} and {1}")]
    MismatchedTicks(usize, usize),
}

fn entity_of_kind<'a, T>(tick: TickRef<'a, T>, id: EntityId, kind: &Kind<T>) -> Option<&'a T::Entity>
where
    T: TickData,
{
    tick.entity(id).filter(|entity| entity.kind() == *kind)
}

/// A predicate over a single entity of a given kind.
pub struct UnaryPredicate<T, F>
where
    T: TickData,
{
    kind: Kind<T>,
    body: F,
}

impl<T, F> UnaryPredicate<T, F>
where
    T: TickData,
    F: Fn(TickRef<'_, T>, &T::Entity) -> bool,
{
    pub fn new(kind: Kind<T>, body: F) -> Self {
        Self { kind, body }
    }

    /// Evaluate the predicate for the entity `id` at `tick`.
    pub fn holds(&self, tick: TickRef<'_, T>, id: EntityId) -> bool {
        entity_of_kind(tick, id, &self.kind).is_some_and(|entity| (self.body)(tick, entity))
    }
}

/// A predicate relating two entities observed at the same tick.
pub struct BinaryPredicate<T, F>
where
    T: TickData,
{
    kinds: (Kind<T>, Kind<T>),
    body: F,
}

impl<T, F> BinaryPredicate<T, F>
where
    T: TickData,
    F: Fn(TickRef<'_, T>, &T::Entity, &T::Entity) -> bool,
{
    pub fn new(first: Kind<T>, second: Kind<T>, body: F) -> Self {
        Self {
            kinds: (first, second),
            body,
        }
    }

    /// Evaluate the predicate for the entities `first` and `second` at `tick`.
    pub fn holds(&self, tick: TickRef<'_, T>, first: EntityId, second: EntityId) -> bool {
        let lhs = entity_of_kind(tick, first, &self.kinds.0);
        let rhs = entity_of_kind(tick, second, &self.kinds.1);

        match (lhs, rhs) {
            (Some(lhs), Some(rhs)) => (self.body)(tick, lhs, rhs),
            _ => false,
        }
    }

    /// Evaluate the predicate with each entity looked up through its own tick reference.
    ///
    /// Both references must point at the same tick, otherwise a
    /// [`PredicateError::MismatchedTicks`] error is returned.
    pub fn holds_at(
        &self,
        first_tick: TickRef<'_, T>,
        second_tick: TickRef<'_, T>,
        first: EntityId,
        second: EntityId,
    ) -> Result<bool, PredicateError> {
        if !first_tick.is_same_tick(&second_tick) {
            return Err(PredicateError::MismatchedTicks(first_tick.index(), second_tick.index()));
        }

        Ok(self.holds(first_tick, first, second))
    }
}
