//! Interfaces for the tick and entity data produced by a simulation.
//!
//! The monitor does not own the data model of the simulator. Instead, tick and entity types from
//! a trace importer implement [`TickData`] and [`EntityData`], which expose only what the temporal
//! operators and predicates need. Entities carry a kind tag rather than relying on their concrete
//! type, so predicates can select the entities they apply to by comparing tags:
//!
//! ```rust
//! use stars_core::{EntityData, EntityId, TickData};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! enum Kind {
//!     Vehicle,
//!     Pedestrian,
//! }
//!
//! struct Actor {
//!     id: EntityId,
//!     kind: Kind,
//! }
//!
//! impl EntityData for Actor {
//!     type Kind = Kind;
//!
//!     fn id(&self) -> EntityId {
//!         self.id
//!     }
//!
//!     fn kind(&self) -> Kind {
//!         self.kind
//!     }
//! }
//!
//! struct Snapshot {
//!     time: f64,
//!     actors: Vec<Actor>,
//! }
//!
//! impl TickData for Snapshot {
//!     type Entity = Actor;
//!
//!     fn tick_time(&self) -> f64 {
//!         self.time
//!     }
//!
//!     fn entities(&self) -> &[Actor] {
//!         &self.actors
//!     }
//! }
//! ```

/// Identifier of an entity, stable across all ticks of a simulation run.
pub type EntityId = u64;

/// An entity (vehicle, pedestrian, traffic light, ...) observed at a single tick.
pub trait EntityData {
    /// Closed tag distinguishing the different kinds of entities.
    type Kind: PartialEq;

    fn id(&self) -> EntityId;

    fn kind(&self) -> Self::Kind;
}

/// A timestamped snapshot of the state of every entity in the simulation.
pub trait TickData {
    type Entity: EntityData;

    /// Simulation time of the snapshot. Must not be NaN.
    fn tick_time(&self) -> f64;

    fn entities(&self) -> &[Self::Entity];

    /// Find the entity with the given identifier.
    fn entity(&self, id: EntityId) -> Option<&Self::Entity> {
        self.entities().iter().find(|entity| entity.id() == id)
    }
}
