//! Slices of a simulation run submitted for evaluation.
//!
//! A [`Segment`] holds the ordered ticks of one slice of a simulation run together with the
//! entity the slice is centered on. Taxonomies are not evaluated against a segment directly but
//! against its [`PredicateContext`], which anchors the ticks of the segment at its first tick so
//! the temporal operators can reach every tick of the segment.
use std::rc::Rc;
use std::vec;

use crate::tick::{EntityId, TickData};
use crate::trace::Trace;
use crate::window::{Frame, IterationMode, IterationOrder, TickRef, TickWindow, WindowError};

/// A bounded slice of a simulation run.
pub struct Segment<T> {
    identifier: String,
    primary_entity_id: EntityId,
    ticks: Vec<Rc<T>>,
}

impl<T> Clone for Segment<T> {
    fn clone(&self) -> Self {
        Self {
            identifier: self.identifier.clone(),
            primary_entity_id: self.primary_entity_id,
            ticks: self.ticks.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Segment<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Segment")
            .field("identifier", &self.identifier)
            .field("primary_entity_id", &self.primary_entity_id)
            .field("ticks", &self.ticks.len())
            .finish()
    }
}

impl<T> Segment<T> {
    /// Create a segment from the ticks of a trace, in chronological order.
    pub fn new(identifier: impl Into<String>, primary_entity_id: EntityId, trace: Trace<T>) -> Self {
        Self::from_ticks(identifier, primary_entity_id, trace.into_states())
    }

    /// Create a segment from ticks that are already in chronological order.
    pub fn from_ticks<I>(identifier: impl Into<String>, primary_entity_id: EntityId, ticks: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Rc<T>>,
    {
        Self {
            identifier: identifier.into(),
            primary_entity_id,
            ticks: ticks.into_iter().map(Into::into).collect(),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn primary_entity_id(&self) -> EntityId {
        self.primary_entity_id
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    /// Iterate over the ticks of the segment in chronological order.
    pub fn ticks(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.ticks.iter().map(|tick| &**tick)
    }

    /// A frame over every tick of the segment anchored at the first tick.
    ///
    /// Returns `None` if the segment contains no ticks.
    pub fn frame(&self) -> Option<Frame<T>> {
        Frame::anchored(self.ticks.clone(), 0)
    }

    /// The context taxonomies are evaluated against, or `None` if the segment contains no ticks.
    pub fn context(&self) -> Option<PredicateContext<T>> {
        self.frame().map(|frame| PredicateContext {
            segment_identifier: self.identifier.clone(),
            primary_entity_id: self.primary_entity_id,
            frame,
        })
    }

    /// Slide a window over the ticks of the segment.
    pub fn window(
        &self,
        buffer_size: usize,
        order: IterationOrder,
        mode: IterationMode,
    ) -> Result<TickWindow<T, vec::IntoIter<Rc<T>>>, WindowError> {
        TickWindow::new(buffer_size, order, mode, self.ticks.clone())
    }
}

impl<T> Segment<T>
where
    T: TickData,
{
    pub fn first_tick_time(&self) -> Option<f64> {
        self.ticks.first().map(|tick| tick.tick_time())
    }

    pub fn last_tick_time(&self) -> Option<f64> {
        self.ticks.last().map(|tick| tick.tick_time())
    }

    /// Simulation time covered by the segment, zero for segments with fewer than two ticks.
    pub fn duration(&self) -> f64 {
        match (self.first_tick_time(), self.last_tick_time()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }
}

/// The data a taxonomy is evaluated against: every tick of a segment, anchored at its first tick.
pub struct PredicateContext<T> {
    segment_identifier: String,
    primary_entity_id: EntityId,
    frame: Frame<T>,
}

impl<T> PredicateContext<T> {
    pub fn segment_identifier(&self) -> &str {
        &self.segment_identifier
    }

    pub fn primary_entity_id(&self) -> EntityId {
        self.primary_entity_id
    }

    /// The first tick of the segment, from which formulas are usually evaluated.
    pub fn first_tick(&self) -> TickRef<'_, T> {
        self.frame.anchor()
    }

    pub fn frame(&self) -> &Frame<T> {
        &self.frame
    }
}

impl<T> PredicateContext<T>
where
    T: TickData,
{
    /// The primary entity as observed at the first tick of the segment.
    pub fn primary_entity(&self) -> Option<&T::Entity> {
        self.first_tick().entity(self.primary_entity_id)
    }
}

#[cfg(test)]
mod tests {
    use crate::operators::eventually;
    use crate::trace::{Trace, TraceError};
    use crate::window::{IterationMode, IterationOrder, WindowError};
    use super::Segment;

    fn segment() -> Result<Segment<u32>, TraceError> {
        let trace = Trace::try_from_iter([(2.0, 30), (0.0, 10), (1.0, 20)])?;
        Ok(Segment::new("run-1/junction-4", 7, trace))
    }

    #[test]
    fn ticks_are_chronological() -> Result<(), TraceError> {
        let segment = segment()?;

        assert_eq!(segment.len(), 3);
        assert_eq!(segment.identifier(), "run-1/junction-4");
        assert_eq!(segment.ticks().copied().collect::<Vec<_>>(), vec![10, 20, 30]);

        Ok(())
    }

    #[test]
    fn context_reaches_every_tick() -> Result<(), TraceError> {
        let segment = segment()?;
        let context = segment.context().unwrap();

        assert_eq!(*context.first_tick(), 10);
        assert_eq!(context.primary_entity_id(), 7);
        assert_eq!(context.segment_identifier(), "run-1/junction-4");
        assert!(eventually(context.first_tick(), None, |tick| *tick == 30));

        Ok(())
    }

    #[test]
    fn empty_segment_has_no_context() {
        let segment: Segment<u32> = Segment::from_ticks("empty", 0, Vec::<u32>::new());

        assert!(segment.is_empty());
        assert!(segment.context().is_none());
    }

    #[test]
    fn window_over_segment() -> Result<(), Box<dyn std::error::Error>> {
        let segment = segment()?;
        let mut window = segment.window(2, IterationOrder::Forward, IterationMode::FullFrame)?;

        assert_eq!(window.frames()?.count(), 2);
        assert_eq!(window.frames().err(), Some(WindowError::AlreadyConsumed));

        Ok(())
    }
}
