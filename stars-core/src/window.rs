//! Bounded sliding windows over a pull-based tick source.
//!
//! A [`TickWindow`] pulls ticks from a source one at a time into a ring buffer holding at most
//! `buffer_size` ticks. Each time the window advances it yields a [`Frame`], which is a snapshot
//! of the buffered ticks together with an anchor tick. Temporal operators are evaluated against
//! the anchor and can only reach the ticks inside the frame: the tick evicted when the buffer
//! overflows is never linked to the new oldest tick, and the first and last ticks of a frame have
//! no predecessor and successor respectively.
//!
//! Frames are arenas of ticks addressed by index. A [`TickRef`] is a position in that arena, and
//! its predecessor and successor are resolved by index arithmetic.
//!
//! The [`IterationOrder`] selects the anchor of each frame: [`IterationOrder::Forward`] anchors
//! at the oldest buffered tick, while [`IterationOrder::Backward`] anchors at the newest. The
//! [`IterationMode`] selects which partially filled frames are yielded while the window is
//! warming up and cooling down. For an input of `N` ticks and a buffer size of `B`, the frame
//! lengths produced by each mode are:
//!
//! | mode          | frame lengths                               | frames         |
//! | ------------- | ------------------------------------------- | -------------- |
//! | `FullFrame`   | `B, B, ..., B`                              | `max(0,N-B+1)` |
//! | `StartFilled` | `B, B, ..., B, B-1, ..., 1` (nothing if N<B) | `N` if `N>=B`  |
//! | `EndFilled`   | `1, 2, ..., B, B, ..., B`                   | `N`            |
//! | `Full`        | `1, 2, ..., B, ..., B, B-1, ..., 1`         | `N+min(N,B)-1` |
//!
//! A window can only be iterated once, a second call to [`TickWindow::frames`] fails.
//!
//! ```rust
//! use stars_core::{IterationMode, IterationOrder, TickWindow, WindowError};
//!
//! let mut window: TickWindow<u32, _> =
//!     TickWindow::new(3, IterationOrder::Backward, IterationMode::EndFilled, 1..=5u32)?;
//!
//! let lengths: Vec<usize> = window.frames()?.map(|frame| frame.len()).collect();
//! assert_eq!(lengths, vec![1, 2, 3, 3, 3]);
//!
//! assert_eq!(window.frames().err(), Some(WindowError::AlreadyConsumed));
//! # Ok::<(), WindowError>(())
//! ```
use std::collections::VecDeque;
use std::fmt::{Debug, Formatter};
use std::iter::FusedIterator;
use std::ops::Deref;
use std::rc::Rc;

use thiserror::Error;
use tracing::trace;

use crate::tick::{EntityId, TickData};

/// Selects which buffered tick anchors each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IterationOrder {
    /// Anchor every frame at the oldest buffered tick.
    #[default]
    Forward,

    /// Anchor every frame at the newest buffered tick.
    Backward,
}

/// Selects which partially filled frames a [`TickWindow`] yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IterationMode {
    /// Only yield frames holding exactly `buffer_size` ticks.
    #[default]
    FullFrame,

    /// Wait for the buffer to fill, then keep yielding while it drains after the source ends.
    StartFilled,

    /// Yield as soon as the first tick arrives, growing up to `buffer_size`.
    EndFilled,

    /// Yield while growing, while full, and while draining.
    Full,
}

impl IterationMode {
    fn yields_growing(self) -> bool {
        matches!(self, Self::EndFilled | Self::Full)
    }

    fn yields_shrinking(self) -> bool {
        matches!(self, Self::StartFilled | Self::Full)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("Tick window buffer size must be positive, got {0}")]
    InvalidBufferSize(usize),

    #[error("Tick window has already been consumed")]
    AlreadyConsumed,
}

/// A snapshot of the ticks buffered by a window, anchored at one of them.
pub struct Frame<T> {
    ticks: Vec<Rc<T>>,
    anchor: usize,
}

impl<T> Clone for Frame<T> {
    fn clone(&self) -> Self {
        Self {
            ticks: self.ticks.clone(),
            anchor: self.anchor,
        }
    }
}

impl<T> Debug for Frame<T>
where
    T: Debug,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("ticks", &self.ticks)
            .field("anchor", &self.anchor)
            .finish()
    }
}

impl<T> Frame<T> {
    /// Create a frame over the given ticks, which must be in chronological order.
    ///
    /// Returns `None` if `anchor` is not the index of one of the ticks.
    pub fn anchored(ticks: Vec<Rc<T>>, anchor: usize) -> Option<Self> {
        (anchor < ticks.len()).then_some(Self { ticks, anchor })
    }

    /// Number of ticks in the frame.
    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    /// A frame yielded by a window always holds at least one tick.
    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    /// The tick operators are evaluated at.
    pub fn anchor(&self) -> TickRef<'_, T> {
        TickRef::new(&self.ticks, self.anchor)
    }

    /// The tick at the given position, counted from the oldest tick of the frame.
    pub fn get(&self, index: usize) -> Option<TickRef<'_, T>> {
        (index < self.ticks.len()).then(|| TickRef::new(&self.ticks, index))
    }

    /// Iterate over the ticks of the frame in chronological order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = TickRef<'_, T>> + ExactSizeIterator {
        (0..self.ticks.len()).map(|index| TickRef::new(&self.ticks, index))
    }
}

/// A position within a [`Frame`].
///
/// A `TickRef` dereferences to the tick it points at and knows its neighbours inside the frame.
pub struct TickRef<'a, T> {
    ticks: &'a [Rc<T>],
    index: usize,
}

impl<'a, T> Clone for TickRef<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for TickRef<'a, T> {}

impl<'a, T> Debug for TickRef<'a, T>
where
    T: Debug,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickRef")
            .field("index", &self.index)
            .field("tick", self.get())
            .finish()
    }
}

impl<'a, T> Deref for TickRef<'a, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.get()
    }
}

impl<'a, T> TickRef<'a, T> {
    fn new(ticks: &'a [Rc<T>], index: usize) -> Self {
        Self { ticks, index }
    }

    /// The tick this reference points at, borrowed for the lifetime of the frame.
    pub fn get(&self) -> &'a T {
        &self.ticks[self.index]
    }

    /// Position of the tick within its frame.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The preceding tick, if it is part of the frame.
    pub fn previous(&self) -> Option<Self> {
        self.index.checked_sub(1).map(|index| Self::new(self.ticks, index))
    }

    /// The following tick, if it is part of the frame.
    pub fn next(&self) -> Option<Self> {
        let index = self.index + 1;
        (index < self.ticks.len()).then(|| Self::new(self.ticks, index))
    }

    /// Number of predecessors reachable from this tick.
    pub fn predecessors(&self) -> usize {
        self.index
    }

    /// Number of successors reachable from this tick.
    pub fn successors(&self) -> usize {
        self.ticks.len() - self.index - 1
    }

    /// Determine if both references point at the same tick instance.
    pub fn is_same_tick(&self, other: &TickRef<'_, T>) -> bool {
        Rc::ptr_eq(&self.ticks[self.index], &other.ticks[other.index])
    }
}

impl<'a, T> TickRef<'a, T>
where
    T: TickData,
{
    pub fn tick_time(&self) -> f64 {
        self.get().tick_time()
    }

    /// Find an entity of the referenced tick by its identifier.
    pub fn entity(&self, id: EntityId) -> Option<&'a T::Entity> {
        self.get().entity(id)
    }
}

/// A lazy, single-pass, bounded sliding window over a pull-based tick source.
///
/// See the [`window`](crate::window) module for the semantics of the iteration orders and modes.
pub struct TickWindow<T, I> {
    source: I,
    buffer: VecDeque<Rc<T>>,
    buffer_size: usize,
    order: IterationOrder,
    mode: IterationMode,
    consumed: bool,
}

impl<T, I> TickWindow<T, I>
where
    I: Iterator,
    I::Item: Into<Rc<T>>,
{
    /// Create a window over `source` holding at most `buffer_size` ticks.
    ///
    /// The source can yield either ticks or `Rc`-wrapped ticks. Fails if `buffer_size` is zero.
    pub fn new<S>(
        buffer_size: usize,
        order: IterationOrder,
        mode: IterationMode,
        source: S,
    ) -> Result<Self, WindowError>
    where
        S: IntoIterator<IntoIter = I>,
    {
        if buffer_size == 0 {
            return Err(WindowError::InvalidBufferSize(buffer_size));
        }

        Ok(Self {
            source: source.into_iter(),
            buffer: VecDeque::with_capacity(buffer_size),
            buffer_size,
            order,
            mode,
            consumed: false,
        })
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    pub fn order(&self) -> IterationOrder {
        self.order
    }

    pub fn mode(&self) -> IterationMode {
        self.mode
    }

    /// Start iterating over the frames of the window.
    ///
    /// The window can only be iterated once, every call after the first fails with
    /// [`WindowError::AlreadyConsumed`].
    pub fn frames(&mut self) -> Result<Frames<'_, T, I>, WindowError> {
        if self.consumed {
            return Err(WindowError::AlreadyConsumed);
        }

        self.consumed = true;

        Ok(Frames {
            window: self,
            phase: Phase::Filling,
            filled: false,
        })
    }

    fn snapshot(&self) -> Frame<T> {
        let ticks: Vec<Rc<T>> = self.buffer.iter().cloned().collect();
        let anchor = match self.order {
            IterationOrder::Forward => 0,
            IterationOrder::Backward => ticks.len() - 1,
        };

        trace!(len = ticks.len(), anchor, "Yielding tick window frame");

        Frame { ticks, anchor }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Filling,
    Draining,
    Exhausted,
}

/// Iterator over the frames of a [`TickWindow`], created by [`TickWindow::frames`].
pub struct Frames<'w, T, I> {
    window: &'w mut TickWindow<T, I>,
    phase: Phase,
    filled: bool,
}

impl<'w, T, I> Frames<'w, T, I>
where
    I: Iterator,
    I::Item: Into<Rc<T>>,
{
    fn exhaust(&mut self) -> Option<Frame<T>> {
        self.phase = Phase::Exhausted;
        self.window.buffer.clear();
        None
    }
}

impl<'w, T, I> Iterator for Frames<'w, T, I>
where
    I: Iterator,
    I::Item: Into<Rc<T>>,
{
    type Item = Frame<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.phase {
                Phase::Exhausted => return None,
                Phase::Draining => {
                    self.window.buffer.pop_front();

                    if self.window.buffer.is_empty() {
                        return self.exhaust();
                    }

                    return Some(self.window.snapshot());
                }
                Phase::Filling => match self.window.source.next() {
                    Some(tick) => {
                        let window = &mut *self.window;

                        if window.buffer.len() == window.buffer_size {
                            window.buffer.pop_front();
                        }

                        window.buffer.push_back(tick.into());

                        let full = window.buffer.len() == window.buffer_size;
                        self.filled |= full;

                        if full || window.mode.yields_growing() {
                            return Some(window.snapshot());
                        }
                    }
                    None => {
                        let mode = self.window.mode;
                        trace!(filled = self.filled, ?mode, "Tick source exhausted");

                        // A start-filled window that never filled up yields nothing at all
                        if mode.yields_shrinking() && (self.filled || mode.yields_growing()) {
                            self.phase = Phase::Draining;
                        } else {
                            return self.exhaust();
                        }
                    }
                },
            }
        }
    }
}

impl<'w, T, I> FusedIterator for Frames<'w, T, I>
where
    I: Iterator,
    I::Item: Into<Rc<T>>,
{
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::{Frame, IterationMode, IterationOrder, TickWindow, WindowError};

    fn window(size: usize, order: IterationOrder, mode: IterationMode, n: u32) -> TickWindow<u32, std::ops::Range<u32>> {
        TickWindow::new(size, order, mode, 0..n).unwrap()
    }

    fn values(frame: &Frame<u32>) -> Vec<u32> {
        frame.iter().map(|tick| *tick).collect()
    }

    #[test]
    fn zero_buffer_size() {
        let result: Result<TickWindow<u32, _>, _> =
            TickWindow::new(0, IterationOrder::Forward, IterationMode::Full, 0..3u32);

        assert_eq!(result.err(), Some(WindowError::InvalidBufferSize(0)));
    }

    #[test]
    fn second_iteration_fails() -> Result<(), WindowError> {
        let mut window = window(2, IterationOrder::Forward, IterationMode::FullFrame, 4);

        assert_eq!(window.frames()?.count(), 3);
        assert_eq!(window.frames().err(), Some(WindowError::AlreadyConsumed));

        let mut untouched = self::window(2, IterationOrder::Forward, IterationMode::FullFrame, 4);
        let _ = untouched.frames()?;

        assert!(untouched.frames().is_err());
        Ok(())
    }

    #[test]
    fn forward_anchors_oldest_tick() -> Result<(), WindowError> {
        let mut window = window(3, IterationOrder::Forward, IterationMode::StartFilled, 5);
        let frames: Vec<_> = window.frames()?.collect();
        let anchors: Vec<u32> = frames.iter().map(|frame| *frame.anchor()).collect();

        assert_eq!(anchors, vec![0, 1, 2, 3, 4]);
        assert_eq!(values(&frames[0]), vec![0, 1, 2]);
        assert_eq!(values(&frames[3]), vec![3, 4]);
        assert_eq!(values(&frames[4]), vec![4]);
        Ok(())
    }

    #[test]
    fn backward_anchors_newest_tick() -> Result<(), WindowError> {
        let mut window = window(3, IterationOrder::Backward, IterationMode::EndFilled, 5);
        let frames: Vec<_> = window.frames()?.collect();
        let anchors: Vec<u32> = frames.iter().map(|frame| *frame.anchor()).collect();

        assert_eq!(anchors, vec![0, 1, 2, 3, 4]);
        assert_eq!(values(&frames[1]), vec![0, 1]);
        assert_eq!(values(&frames[4]), vec![2, 3, 4]);
        Ok(())
    }

    #[test]
    fn links_stop_at_frame_boundaries() -> Result<(), WindowError> {
        let mut window = window(3, IterationOrder::Forward, IterationMode::FullFrame, 6);

        for frame in window.frames()? {
            let first = frame.get(0).unwrap();
            let last = frame.get(frame.len() - 1).unwrap();

            assert!(frame.len() <= 3);
            assert!(first.previous().is_none());
            assert!(last.next().is_none());
            assert_eq!(last.predecessors(), frame.len() - 1);
            assert_eq!(first.successors(), frame.len() - 1);
        }

        Ok(())
    }

    #[test]
    fn evicted_ticks_are_released() -> Result<(), WindowError> {
        let ticks: Vec<Rc<u32>> = (0..4).map(Rc::new).collect();
        let observed = Rc::clone(&ticks[0]);
        let mut window: TickWindow<u32, _> =
            TickWindow::new(2, IterationOrder::Forward, IterationMode::FullFrame, ticks)?;

        let mut frames = window.frames()?;
        let first = frames.next().unwrap();

        assert_eq!(Rc::strong_count(&observed), 3);
        drop(first);

        let second = frames.next().unwrap();

        assert_eq!(values(&second), vec![1, 2]);
        assert_eq!(Rc::strong_count(&observed), 1);
        Ok(())
    }

    #[test]
    fn same_tick_identity() -> Result<(), WindowError> {
        let mut window = window(3, IterationOrder::Forward, IterationMode::FullFrame, 3);
        let frame = window.frames()?.next().unwrap();
        let anchor = frame.anchor();
        let next = anchor.next().unwrap();

        assert!(anchor.is_same_tick(&frame.get(0).unwrap()));
        assert!(!anchor.is_same_tick(&next));
        assert!(next.previous().unwrap().is_same_tick(&anchor));
        Ok(())
    }
}
