//! Position cursors and iterators over contiguous storage.
//!
//! A [`Cursor`] is a thin, `Copy` position marker inside one storage region:
//! the region's base pointer plus a signed slot offset. It owns nothing. It
//! does borrow the container it came from for `'a`, and every operation that
//! could relocate storage or change which slots are live takes `&mut self` on
//! the container, so a cursor that would be invalidated cannot be used
//! afterwards; the borrow checker rejects it.
//!
//! Moving a cursor is always safe, even past either end of the region.
//! Reading through it ([`Cursor::get`], [`Cursor::at`]) is `unsafe`: the
//! caller promises the target slot holds a live element.
//!
//! [`Iter`] and [`RingIter`] are the safe iterators built on cursor pairs.
//!
//! ```
//! use rawcon_mem::DynArray;
//!
//! let mut array = DynArray::new();
//! for value in [9, 1, 6] {
//!     array.push(value).unwrap();
//! }
//!
//! let mut cursor = array.begin();
//! let mut seen = Vec::new();
//! while cursor != array.end() {
//!     seen.push(unsafe { *cursor.get() });
//!     cursor.inc();
//! }
//! assert_eq!(seen, [9, 1, 6]);
//! assert_eq!(unsafe { *(array.begin() + 2).get() }, 6);
//! assert_eq!(array.end() - array.begin(), 3);
//! ```

use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::ptr::NonNull;

/// A position within a container's storage region.
pub struct Cursor<'a, T> {
    base: NonNull<T>,
    pos: isize,
    _marker: PhantomData<&'a T>,
}

// SAFETY: a cursor only ever hands out `&T`, like `&[T]`.
unsafe impl<T: Sync> Send for Cursor<'_, T> {}
unsafe impl<T: Sync> Sync for Cursor<'_, T> {}

impl<'a, T> Cursor<'a, T> {
    /// Creates a cursor at slot `pos` of the region starting at `base`.
    #[inline]
    pub(crate) fn new(base: NonNull<T>, pos: usize) -> Self {
        Cursor {
            base,
            pos: pos as isize,
            _marker: PhantomData,
        }
    }

    /// Returns the element at the cursor's position.
    ///
    /// # Safety
    ///
    /// The position must name a live element of the borrowed container:
    /// not past-the-end, not before the start, and (for a queue) inside the
    /// occupied run.
    #[inline]
    #[must_use]
    pub unsafe fn get(&self) -> &'a T {
        // SAFETY: the caller guarantees the slot is live.
        unsafe { &*self.base.as_ptr().wrapping_offset(self.pos) }
    }

    /// Returns the element `n` slots away from the cursor.
    ///
    /// # Safety
    ///
    /// Same contract as [`Cursor::get`] for the position `self + n`.
    #[inline]
    #[must_use]
    pub unsafe fn at(&self, n: isize) -> &'a T {
        // SAFETY: forwarded to the caller.
        unsafe { (*self + n).get() }
    }

    /// Advances one slot (pre-increment).
    #[inline]
    pub fn inc(&mut self) -> &mut Self {
        self.pos += 1;
        self
    }

    /// Retreats one slot (pre-decrement).
    #[inline]
    pub fn dec(&mut self) -> &mut Self {
        self.pos -= 1;
        self
    }

    /// Advances one slot and returns the previous position (post-increment).
    #[inline]
    #[must_use]
    pub fn post_inc(&mut self) -> Self {
        let previous = *self;
        self.pos += 1;
        previous
    }

    /// Retreats one slot and returns the previous position (post-decrement).
    #[inline]
    #[must_use]
    pub fn post_dec(&mut self) -> Self {
        let previous = *self;
        self.pos -= 1;
        previous
    }

    /// Number of slots from `origin` to `self`.
    ///
    /// Both cursors must come from the same region.
    #[inline]
    #[must_use]
    pub fn distance_from(&self, origin: &Self) -> isize {
        debug_assert_eq!(self.base, origin.base, "cursors from different regions");
        self.pos - origin.pos
    }
}

impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Cursor<'_, T> {}

impl<T> PartialEq for Cursor<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base && self.pos == other.pos
    }
}

impl<T> Eq for Cursor<'_, T> {}

impl<T> Add<isize> for Cursor<'_, T> {
    type Output = Self;

    fn add(mut self, n: isize) -> Self {
        self.pos += n;
        self
    }
}

impl<T> Sub<isize> for Cursor<'_, T> {
    type Output = Self;

    fn sub(mut self, n: isize) -> Self {
        self.pos -= n;
        self
    }
}

impl<T> AddAssign<isize> for Cursor<'_, T> {
    fn add_assign(&mut self, n: isize) {
        self.pos += n;
    }
}

impl<T> SubAssign<isize> for Cursor<'_, T> {
    fn sub_assign(&mut self, n: isize) {
        self.pos -= n;
    }
}

impl<'a, T> Sub for Cursor<'a, T> {
    type Output = isize;

    fn sub(self, origin: Cursor<'a, T>) -> isize {
        self.distance_from(&origin)
    }
}

impl<T> fmt::Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("base", &self.base)
            .field("pos", &self.pos)
            .finish()
    }
}

/// Iterator over the live elements between two cursors.
pub struct Iter<'a, T> {
    front: Cursor<'a, T>,
    back: Cursor<'a, T>,
}

impl<'a, T> Iter<'a, T> {
    /// Iterates `[begin, end)`.
    ///
    /// # Safety
    ///
    /// Both cursors come from the same region, `begin <= end`, and every slot
    /// in between holds a live element for `'a`.
    #[inline]
    pub(crate) unsafe fn new(begin: Cursor<'a, T>, end: Cursor<'a, T>) -> Self {
        debug_assert!(end.distance_from(&begin) >= 0);
        Iter {
            front: begin,
            back: end,
        }
    }

    /// An iterator over `len` slots of `base` starting at `start`.
    ///
    /// # Safety
    ///
    /// Same contract as [`Iter::new`] for `[start, start + len)`.
    #[inline]
    pub(crate) unsafe fn over(base: NonNull<T>, start: usize, len: usize) -> Self {
        // SAFETY: forwarded to the caller.
        unsafe { Iter::new(Cursor::new(base, start), Cursor::new(base, start + len)) }
    }
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            front: self.front,
            back: self.back,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        if self.front == self.back {
            return None;
        }
        // SAFETY: `front` lies in the live range `[front, back)`.
        let item = unsafe { self.front.get() };
        self.front.inc();
        Some(item)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back.distance_from(&self.front).unsigned_abs();
        (remaining, Some(remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    #[inline]
    fn next_back(&mut self) -> Option<&'a T> {
        if self.front == self.back {
            return None;
        }
        self.back.dec();
        // SAFETY: after the decrement `back` lies in the live range.
        Some(unsafe { self.back.get() })
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Iter").field(&self.clone().collect::<Vec<_>>()).finish()
    }
}

/// Iterator over a queue in logical (front-to-back) order.
///
/// The occupied run of a rotated queue wraps past the physical end of its
/// region, so this walks the run from `start` to the end of the region first
/// and then the wrapped part from slot 0.
pub struct RingIter<'a, T> {
    head: Iter<'a, T>,
    tail: Iter<'a, T>,
}

impl<'a, T> RingIter<'a, T> {
    #[inline]
    pub(crate) fn new(head: Iter<'a, T>, tail: Iter<'a, T>) -> Self {
        RingIter { head, tail }
    }
}

impl<T> Clone for RingIter<'_, T> {
    fn clone(&self) -> Self {
        RingIter {
            head: self.head.clone(),
            tail: self.tail.clone(),
        }
    }
}

impl<'a, T> Iterator for RingIter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        self.head.next().or_else(|| self.tail.next())
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.head.len() + self.tail.len();
        (remaining, Some(remaining))
    }
}

impl<'a, T> DoubleEndedIterator for RingIter<'a, T> {
    #[inline]
    fn next_back(&mut self) -> Option<&'a T> {
        self.tail.next_back().or_else(|| self.head.next_back())
    }
}

impl<T> ExactSizeIterator for RingIter<'_, T> {}

impl<T> FusedIterator for RingIter<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for RingIter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RingIter")
            .field(&self.clone().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_of<T>(values: &[T]) -> NonNull<T> {
        NonNull::from(values).cast::<T>()
    }

    #[test]
    fn test_cursor_increment_and_decrement() {
        let values = [10, 20, 30];
        let base = base_of(&values);

        let mut cursor = Cursor::new(base, 0);
        unsafe {
            assert_eq!(*cursor.inc().get(), 20);
            assert_eq!(*cursor.post_inc().get(), 20);
            assert_eq!(*cursor.get(), 30);
            assert_eq!(*cursor.post_dec().get(), 30);
            assert_eq!(*cursor.dec().get(), 10);
        }
    }

    #[test]
    fn test_cursor_arithmetic() {
        let values = [1, 2, 3, 4, 5];
        let base = base_of(&values);
        let begin = Cursor::new(base, 0);
        let end = Cursor::new(base, values.len());

        assert_eq!(end - begin, 5);
        assert_eq!(begin - end, -5);
        assert_eq!((begin + 3) - begin, 3);
        assert_eq!(end - 2, begin + 3);

        let mut cursor = begin;
        cursor += 4;
        cursor -= 1;
        unsafe {
            assert_eq!(*cursor.get(), 4);
            assert_eq!(*cursor.at(-3), 1);
            assert_eq!(*begin.at(4), 5);
        }
    }

    #[test]
    fn test_cursor_may_move_out_of_range() {
        let values = [7];
        let base = base_of(&values);
        let begin = Cursor::new(base, 0);

        let before = begin - 3;
        assert_eq!(before + 3, begin);
        assert_ne!(before, begin);
    }

    #[test]
    fn test_cursor_equality_is_by_position() {
        let left = [1, 2];
        let right = [1, 2];

        assert_eq!(Cursor::new(base_of(&left), 1), Cursor::new(base_of(&left), 1));
        assert_ne!(Cursor::new(base_of(&left), 0), Cursor::new(base_of(&left), 1));
        assert_ne!(Cursor::new(base_of(&left), 0), Cursor::new(base_of(&right), 0));
    }

    #[test]
    fn test_iter_both_ends() {
        let values = ['a', 'b', 'c', 'd'];
        let mut iter = unsafe { Iter::over(base_of(&values), 0, values.len()) };

        assert_eq!(iter.len(), 4);
        assert_eq!(iter.next(), Some(&'a'));
        assert_eq!(iter.next_back(), Some(&'d'));
        assert_eq!(iter.len(), 2);
        assert_eq!(iter.collect::<String>(), "bc");
    }

    #[test]
    fn test_iter_zero_sized_elements() {
        let values = [(), (), ()];
        let iter = unsafe { Iter::over(base_of(&values), 0, values.len()) };
        assert_eq!(iter.count(), 3);
    }

    #[test]
    fn test_ring_iter_chains_runs() {
        // Physical [3, 4, x, 1, 2] with the run starting at slot 3.
        let values = [3, 4, 0, 1, 2];
        let base = base_of(&values);
        let ring = unsafe { RingIter::new(Iter::over(base, 3, 2), Iter::over(base, 0, 2)) };

        assert_eq!(ring.len(), 4);
        assert_eq!(ring.clone().copied().collect::<Vec<_>>(), [1, 2, 3, 4]);
        assert_eq!(ring.rev().copied().collect::<Vec<_>>(), [4, 3, 2, 1]);
    }
}
