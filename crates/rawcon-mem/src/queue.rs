//! FIFO queue on a circular buffer over [`RawStorage`].
//!
//! Logical element `i` lives in physical slot `(start + i) % capacity`, so
//! dequeuing only advances `start` and never shifts elements. The occupied
//! slots always form one contiguous run modulo the capacity.
//!
//! Growth re-linearizes: elements are relocated in logical order into slots
//! `0..len` of the new region and `start` resets to 0. Copies are normalized
//! the same way, so a copy never depends on the source's rotation.
//!
//! # Example
//!
//! ```
//! use rawcon_mem::RingQueue;
//!
//! let mut queue = RingQueue::new();
//! for value in [10, 20, 30, 40, 50] {
//!     queue.enqueue(value)?;
//! }
//! queue.dequeue();
//! queue.dequeue();
//! queue.enqueue(60)?;
//! queue.enqueue(70)?;
//!
//! assert_eq!(queue.front(), Ok(&30));
//! assert_eq!(queue.back(), Ok(&70));
//! assert!(queue.iter().copied().eq([30, 40, 50, 60, 70]));
//! # Ok::<(), rawcon_mem::Error>(())
//! ```

use std::any::type_name;
use std::fmt;
use std::iter::Chain;
use std::slice;

use rawcon_log::trace;

use crate::cursor::{Cursor, Iter, RingIter};
use crate::error::{Error, Result, acquisition_failed};
use crate::raw::{RawStorage, grown_capacity};
use crate::stats::StorageStats;

/// A growable first-in, first-out queue on a ring of slots.
pub struct RingQueue<T> {
    storage: RawStorage<T>,
    len: usize,
    /// Physical slot of the front element. Always 0 while capacity is 0.
    start: usize,
    stats: StorageStats,
}

impl<T> RingQueue<T> {
    /// Creates an empty queue. No storage is acquired until the first
    /// enqueue.
    #[must_use]
    pub const fn new() -> Self {
        RingQueue {
            storage: RawStorage::new(),
            len: 0,
            start: 0,
            stats: StorageStats {
                acquisitions: 0,
                growths: 0,
                relocations: 0,
            },
        }
    }

    /// Number of queued elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if nothing is queued.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots in the current region.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    /// Storage activity of this queue so far.
    #[must_use]
    pub const fn stats(&self) -> StorageStats {
        self.stats
    }

    /// Returns `true` if the front element sits in slot 0, so physical and
    /// logical order coincide and [`begin`](Self::begin)/[`end`](Self::end)
    /// cover exactly the queued elements.
    #[inline]
    #[must_use]
    pub const fn is_linear(&self) -> bool {
        self.start == 0
    }

    /// Physical slot of logical position `logical`.
    #[inline]
    fn physical(&self, logical: usize) -> usize {
        debug_assert!(self.capacity() > 0);
        (self.start + logical) % self.capacity()
    }

    /// Appends `value` at the back, growing the storage first if it is full.
    ///
    /// # Errors
    ///
    /// Propagates [`Error::OutOfMemory`] or [`Error::CapacityOverflow`] from
    /// growth. The queue is left exactly as it was and `value` is dropped.
    pub fn enqueue(&mut self, value: T) -> Result<()> {
        if self.len == self.capacity() {
            self.grow()?;
        }

        let slot = self.physical(self.len);
        // SAFETY: `len < capacity`, so the slot just past the run is vacant.
        unsafe { self.storage.construct(slot, value) };
        self.len += 1;
        Ok(())
    }

    /// Removes the front element and returns it.
    ///
    /// An empty queue is left untouched and `None` is returned.
    pub fn dequeue(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }

        let slot = self.start;
        self.start = (self.start + 1) % self.capacity();
        self.len -= 1;
        // SAFETY: `slot` held the front element and is now outside the run.
        Some(unsafe { self.storage.take(slot) })
    }

    /// Returns the front element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyQueue`] if the queue is empty.
    pub fn front(&self) -> Result<&T> {
        if self.len == 0 {
            return Err(Error::EmptyQueue);
        }
        // SAFETY: the queue is non-empty, so `start` is live.
        Ok(unsafe { self.storage.get(self.start) })
    }

    /// Returns the front element mutably.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyQueue`] if the queue is empty.
    pub fn front_mut(&mut self) -> Result<&mut T> {
        if self.len == 0 {
            return Err(Error::EmptyQueue);
        }
        // SAFETY: the queue is non-empty, so `start` is live.
        Ok(unsafe { self.storage.get_mut(self.start) })
    }

    /// Returns the back element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyQueue`] if the queue is empty.
    pub fn back(&self) -> Result<&T> {
        if self.len == 0 {
            return Err(Error::EmptyQueue);
        }
        let slot = self.physical(self.len - 1);
        // SAFETY: the last logical position is inside the run.
        Ok(unsafe { self.storage.get(slot) })
    }

    /// Returns the back element mutably.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyQueue`] if the queue is empty.
    pub fn back_mut(&mut self) -> Result<&mut T> {
        if self.len == 0 {
            return Err(Error::EmptyQueue);
        }
        let slot = self.physical(self.len - 1);
        // SAFETY: the last logical position is inside the run.
        Ok(unsafe { self.storage.get_mut(slot) })
    }

    /// Lengths of the run from `start` to the physical end, and of the part
    /// that wrapped to slot 0.
    #[inline]
    fn run_lengths(&self) -> (usize, usize) {
        let head = self.len.min(self.capacity() - self.start);
        (head, self.len - head)
    }

    /// The queued elements as two slices in logical order: the run starting
    /// at the front, then the wrapped remainder (empty for a linear queue).
    #[must_use]
    pub fn as_slices(&self) -> (&[T], &[T]) {
        let (head, tail) = self.run_lengths();
        // SAFETY: both ranges lie inside the occupied run.
        unsafe {
            (
                self.storage.slice(self.start, head),
                self.storage.slice(0, tail),
            )
        }
    }

    /// Mutable form of [`as_slices`](Self::as_slices).
    pub fn as_mut_slices(&mut self) -> (&mut [T], &mut [T]) {
        let (head, tail) = self.run_lengths();
        let start = self.start;
        // SAFETY: both ranges lie inside the occupied run; when the run
        // wraps, the wrapped part `[0, tail)` ends before `start`.
        unsafe { self.storage.slice_pair_mut((start, head), (0, tail)) }
    }

    /// Destructs every queued element and resets the rotation. The capacity
    /// is kept.
    pub fn clear(&mut self) {
        let (head, tail) = self.run_lengths();
        let start = self.start;
        self.len = 0;
        self.start = 0;
        // SAFETY: both ranges were the occupied run and are now vacant.
        unsafe {
            self.storage.destruct_range(start, head);
            self.storage.destruct_range(0, tail);
        }
    }

    /// Cursor at physical slot 0.
    ///
    /// Cursors walk physical slots linearly, so `[begin, end)` covers the
    /// queued elements only while [`is_linear`](Self::is_linear) holds (after
    /// construction, growth, [`clear`](Self::clear) or a copy, and before the
    /// first dequeue). Use [`iter`](Self::iter) for traversal at any rotation.
    #[inline]
    #[must_use]
    pub fn begin(&self) -> Cursor<'_, T> {
        Cursor::new(self.storage.base(), 0)
    }

    /// Cursor at physical slot `len`. See [`begin`](Self::begin).
    #[inline]
    #[must_use]
    pub fn end(&self) -> Cursor<'_, T> {
        Cursor::new(self.storage.base(), self.len)
    }

    /// Iterates front to back at any rotation.
    pub fn iter(&self) -> RingIter<'_, T> {
        let (head, tail) = self.run_lengths();
        let base = self.storage.base();
        // SAFETY: both ranges lie inside the occupied run.
        unsafe { RingIter::new(Iter::over(base, self.start, head), Iter::over(base, 0, tail)) }
    }

    /// Iterates front to back mutably.
    pub fn iter_mut(&mut self) -> Chain<slice::IterMut<'_, T>, slice::IterMut<'_, T>> {
        let (head, tail) = self.as_mut_slices();
        head.iter_mut().chain(tail.iter_mut())
    }

    /// Copies the queue in logical order into slots `0..len` of a region
    /// with the same capacity; the copy is linear. An empty queue copies to
    /// an empty queue with no storage.
    ///
    /// # Errors
    ///
    /// Propagates storage acquisition failures.
    pub fn try_clone(&self) -> Result<Self>
    where
        T: Clone,
    {
        let mut copy = RingQueue::new();
        if self.len == 0 {
            return Ok(copy);
        }

        copy.storage = RawStorage::acquire(self.capacity())?;
        copy.stats.record_acquisition();
        for value in self.iter() {
            // SAFETY: `copy.len < self.len <= capacity` and `copy.start` is
            // 0, so slot `copy.len` is vacant. `len` only advances after the
            // write, so a panicking `clone` drops exactly what was built.
            unsafe { copy.storage.construct(copy.len, value.clone()) };
            copy.len += 1;
        }

        Ok(copy)
    }

    /// Relocates the run in logical order into a larger region and resets
    /// `start` to 0.
    fn grow(&mut self) -> Result<()> {
        let old_capacity = self.capacity();
        let new_capacity = grown_capacity(old_capacity)?;
        let mut grown = RawStorage::acquire(new_capacity)?;

        let (head, tail) = self.run_lengths();
        // SAFETY: `[start, start + head)` then `[0, tail)` is the occupied
        // run in logical order; it lands in the vacant slots `[0, len)` of
        // the new region.
        unsafe {
            grown.move_from(0, &mut self.storage, self.start, head);
            grown.move_from(head, &mut self.storage, 0, tail);
        }
        self.storage = grown;
        self.start = 0;
        self.stats.record_growth(self.len);

        trace!(
            "RingQueue<{}> grew {old_capacity} -> {new_capacity} slots, relocated {}",
            type_name::<T>(),
            self.len
        );
        Ok(())
    }
}

impl<T> Default for RingQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for RingQueue<T> {
    fn drop(&mut self) {
        let (head, tail) = self.run_lengths();
        // SAFETY: both ranges are the occupied run.
        unsafe {
            self.storage.destruct_range(self.start, head);
            self.storage.destruct_range(0, tail);
        }
    }
}

impl<T: Clone> Clone for RingQueue<T> {
    /// # Panics
    ///
    /// Panics if storage for the copy cannot be acquired. Use
    /// [`RingQueue::try_clone`] to handle that case.
    fn clone(&self) -> Self {
        self.try_clone().unwrap_or_else(|err| acquisition_failed(err))
    }
}

impl<T: fmt::Debug> fmt::Debug for RingQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Queues are equal when they hold equal elements in the same logical
/// order, regardless of rotation or capacity.
impl<T: PartialEq> PartialEq for RingQueue<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for RingQueue<T> {}

impl<'a, T> IntoIterator for &'a RingQueue<T> {
    type Item = &'a T;
    type IntoIter = RingIter<'a, T>;

    fn into_iter(self) -> RingIter<'a, T> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn queue_of<T>(values: impl IntoIterator<Item = T>) -> RingQueue<T> {
        let mut queue = RingQueue::new();
        for value in values {
            queue.enqueue(value).unwrap();
        }
        queue
    }

    fn drain<T>(queue: &mut RingQueue<T>) -> Vec<T> {
        let mut out = Vec::new();
        while let Some(value) = queue.dequeue() {
            out.push(value);
        }
        out
    }

    #[derive(Clone)]
    struct DropCounter(Rc<Cell<usize>>);

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_basic_front_back_len() {
        let queue = queue_of([10, 20, 30]);
        assert_eq!(queue.front(), Ok(&10));
        assert_eq!(queue.back(), Ok(&30));
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_dequeue_in_order() {
        let mut queue = queue_of([10, 20, 30]);
        assert_eq!(queue.dequeue(), Some(10));
        assert_eq!(queue.front(), Ok(&20));
        assert_eq!(queue.dequeue(), Some(20));
        assert_eq!(queue.front(), Ok(&30));
        assert_eq!(queue.dequeue(), Some(30));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_empty_accessors_fail() {
        let mut queue = RingQueue::<i32>::new();
        assert_eq!(queue.front(), Err(Error::EmptyQueue));
        assert_eq!(queue.back(), Err(Error::EmptyQueue));
        assert_eq!(queue.front_mut(), Err(Error::EmptyQueue));
        assert_eq!(queue.back_mut(), Err(Error::EmptyQueue));
        assert_eq!(queue.dequeue(), None);
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn test_capacity_grows_through_powers_of_two() {
        let mut queue = RingQueue::new();
        let mut capacities = Vec::new();
        for value in [10, 20, 30, 40, 50] {
            queue.enqueue(value).unwrap();
            capacities.push(queue.capacity());
        }
        assert_eq!(capacities, [1, 2, 4, 4, 8]);
    }

    #[test]
    fn test_wraparound_then_grow_relinearizes() {
        let mut queue = queue_of([1, 2, 3, 4]);
        assert_eq!(queue.capacity(), 4);
        queue.dequeue();
        queue.dequeue();
        queue.enqueue(5).unwrap();
        queue.enqueue(6).unwrap();

        // Full and rotated: physical [5, 6, 3, 4], start = 2.
        assert_eq!(queue.start, 2);
        assert_eq!(queue.as_slices(), (&[3, 4][..], &[5, 6][..]));
        assert_eq!(queue.back(), Ok(&6));

        queue.enqueue(7).unwrap();
        assert_eq!(queue.capacity(), 8);
        assert!(queue.is_linear());
        assert_eq!(queue.as_slices(), (&[3, 4, 5, 6, 7][..], &[] as &[i32]));
        assert_eq!(queue.stats().relocations, 1 + 2 + 4);
    }

    #[test]
    fn test_scenario_thirty_to_seventy() {
        let mut queue = queue_of([10, 20, 30, 40, 50]);
        assert_eq!(queue.dequeue(), Some(10));
        assert_eq!(queue.dequeue(), Some(20));
        queue.enqueue(60).unwrap();
        queue.enqueue(70).unwrap();
        assert_eq!(drain(&mut queue), [30, 40, 50, 60, 70]);
    }

    #[test]
    fn test_clear_resets_rotation_and_drops_all() {
        let drops = Rc::new(Cell::new(0));
        let mut queue = queue_of((0..4).map(|_| DropCounter(Rc::clone(&drops))));
        queue.dequeue();
        assert_eq!(drops.get(), 1);
        queue.enqueue(DropCounter(Rc::clone(&drops))).unwrap();
        assert!(!queue.is_linear());

        queue.clear();
        assert_eq!(drops.get(), 5);
        assert!(queue.is_empty());
        assert!(queue.is_linear());
        assert_eq!(queue.capacity(), 4);
    }

    #[test]
    fn test_clear_and_reuse() {
        let mut queue = queue_of([100, 200]);
        queue.clear();
        assert_eq!(queue.len(), 0);
        queue.enqueue(300).unwrap();
        assert_eq!(queue.front(), Ok(&300));
    }

    #[test]
    fn test_drop_releases_rotated_run() {
        let drops = Rc::new(Cell::new(0));
        {
            let mut queue = queue_of((0..4).map(|_| DropCounter(Rc::clone(&drops))));
            queue.dequeue();
            queue.dequeue();
            queue.enqueue(DropCounter(Rc::clone(&drops))).unwrap();
            assert_eq!(drops.get(), 2);
        }
        assert_eq!(drops.get(), 5);
    }

    #[test]
    fn test_clone_normalizes_rotation() {
        let mut original = queue_of(['x', 'a', 'b']);
        original.dequeue();
        original.dequeue();
        original.enqueue('c').unwrap();
        original.enqueue('d').unwrap();
        // Logical [b, c, d] starting at physical slot 2, wrapped.
        assert_eq!(original.capacity(), 4);
        assert!(!original.is_linear());

        let mut copy = original.clone();
        assert!(copy.is_linear());
        assert_eq!(copy.capacity(), original.capacity());
        assert_eq!(copy.front(), Ok(&'b'));
        assert_eq!(copy.back(), Ok(&'d'));
        assert_eq!(copy, original);

        copy.dequeue();
        *original.back_mut().unwrap() = 'z';
        assert_eq!(drain(&mut copy), ['c', 'd']);
        assert_eq!(drain(&mut original), ['b', 'c', 'z']);
    }

    #[test]
    fn test_clone_of_empty_has_no_storage() {
        let mut queue = queue_of([1]);
        queue.dequeue();
        let copy = queue.try_clone().unwrap();
        assert!(copy.is_empty());
        assert_eq!(copy.capacity(), 0);
    }

    #[test]
    fn test_cursors_cover_linear_queue() {
        let queue = queue_of([3, 1, 4]);
        assert!(queue.is_linear());

        let mut cursor = queue.begin();
        let mut seen = Vec::new();
        while cursor != queue.end() {
            seen.push(unsafe { *cursor.get() });
            cursor.inc();
        }
        assert_eq!(seen, [3, 1, 4]);
    }

    #[test]
    fn test_iter_mut_at_rotation() {
        let mut queue = queue_of([1, 2, 3, 4]);
        queue.dequeue();
        queue.enqueue(5).unwrap();
        for value in queue.iter_mut() {
            *value *= 10;
        }
        assert_eq!(queue.iter().copied().collect::<Vec<_>>(), [20, 30, 40, 50]);
        assert_eq!(queue.iter().rev().copied().collect::<Vec<_>>(), [50, 40, 30, 20]);

        let (head, tail) = queue.as_mut_slices();
        head[0] = 0;
        tail[0] = 0;
        assert_eq!(format!("{queue:?}"), "[0, 30, 40, 0]");
    }

    #[test]
    fn test_front_mut_updates_front() {
        let mut queue = queue_of([1, 2]);
        *queue.front_mut().unwrap() = 9;
        assert_eq!(queue.dequeue(), Some(9));
    }

    #[test]
    fn test_zero_sized_elements() {
        let mut queue = RingQueue::new();
        for _ in 0..5 {
            queue.enqueue(()).unwrap();
        }
        queue.dequeue();
        queue.enqueue(()).unwrap();
        assert_eq!(queue.len(), 5);
        assert_eq!(queue.iter().count(), 5);
    }
}
