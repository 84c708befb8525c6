//! Growable contiguous array over [`RawStorage`].
//!
//! [`DynArray`] keeps its live elements in slots `[0, len)` of a single
//! region; slots `[len, capacity)` are uninitialized. A push into a full
//! array acquires a region twice as large (or of one slot, when empty),
//! relocates every live element into it in index order, and only then
//! releases the old region.
//!
//! # Example
//!
//! ```
//! use rawcon_mem::DynArray;
//!
//! let mut array = DynArray::new();
//! for value in [5, 2, 8, 1] {
//!     array.push(value)?;
//! }
//! assert_eq!((array[0], array[2]), (5, 8));
//!
//! assert_eq!(array.pop(), Some(1));
//! array.sort(false);
//! assert_eq!(array.as_slice(), &[2, 5, 8]);
//! array.sort(true);
//! assert_eq!(array.as_slice(), &[8, 5, 2]);
//! # Ok::<(), rawcon_mem::Error>(())
//! ```

use std::any::type_name;
use std::fmt;
use std::ops::{Index, IndexMut};
use std::slice;

use rawcon_log::trace;

use crate::cursor::{Cursor, Iter};
use crate::error::{Result, acquisition_failed};
use crate::raw::{RawStorage, grown_capacity};
use crate::stats::StorageStats;

/// A growable array whose element lifetimes are managed by hand.
pub struct DynArray<T> {
    storage: RawStorage<T>,
    len: usize,
    stats: StorageStats,
}

impl<T> DynArray<T> {
    /// Creates an empty array. No storage is acquired until the first push.
    #[must_use]
    pub const fn new() -> Self {
        DynArray {
            storage: RawStorage::new(),
            len: 0,
            stats: StorageStats {
                acquisitions: 0,
                growths: 0,
                relocations: 0,
            },
        }
    }

    /// Number of live elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the array holds no elements.
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

    /// Storage activity of this array so far.
    #[must_use]
    pub const fn stats(&self) -> StorageStats {
        self.stats
    }

    /// Appends `value`, growing the storage first if it is full.
    ///
    /// # Errors
    ///
    /// Propagates [`Error::OutOfMemory`](crate::Error::OutOfMemory) or
    /// [`Error::CapacityOverflow`](crate::Error::CapacityOverflow) from
    /// growth. The array is left exactly as it was and `value` is dropped.
    pub fn push(&mut self, value: T) -> Result<()> {
        if self.len == self.capacity() {
            self.grow()?;
        }

        // SAFETY: growth guarantees `len < capacity`; slot `len` is vacant.
        unsafe { self.storage.construct(self.len, value) };
        self.len += 1;
        Ok(())
    }

    /// Removes the last element and returns it.
    ///
    /// An empty array is left untouched and `None` is returned; popping
    /// never underflows.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }

        self.len -= 1;
        // SAFETY: slot `len` was the last live slot and is now outside the
        // live range.
        Some(unsafe { self.storage.take(self.len) })
    }

    /// Returns the element at `index`, or `None` if out of range.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    /// Returns the element at `index` mutably, or `None` if out of range.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.as_mut_slice().get_mut(index)
    }

    /// Returns the element at `index` without a bounds check.
    ///
    /// # Safety
    ///
    /// `index < self.len()`.
    #[inline]
    #[must_use]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        debug_assert!(index < self.len);
        // SAFETY: `index < len`, so the slot is live.
        unsafe { self.storage.get(index) }
    }

    /// Returns the element at `index` mutably without a bounds check.
    ///
    /// # Safety
    ///
    /// `index < self.len()`.
    #[inline]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.len);
        // SAFETY: `index < len`, so the slot is live.
        unsafe { self.storage.get_mut(index) }
    }

    /// Views the live elements as a slice.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: slots `[0, len)` are live.
        unsafe { self.storage.slice(0, self.len) }
    }

    /// Views the live elements as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: slots `[0, len)` are live.
        unsafe { self.storage.slice_mut(0, self.len) }
    }

    /// Destructs every live element. The capacity is kept.
    pub fn clear(&mut self) {
        let len = self.len;
        // A panicking destructor must not leave dropped slots in the live
        // range.
        self.len = 0;
        // SAFETY: slots `[0, len)` were live and are now outside the live
        // range.
        unsafe { self.storage.destruct_range(0, len) };
    }

    /// Cursor at slot 0.
    #[inline]
    #[must_use]
    pub fn begin(&self) -> Cursor<'_, T> {
        Cursor::new(self.storage.base(), 0)
    }

    /// Cursor one past the last live element.
    #[inline]
    #[must_use]
    pub fn end(&self) -> Cursor<'_, T> {
        Cursor::new(self.storage.base(), self.len)
    }

    /// Iterates the live elements front to back.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        // SAFETY: `[begin, end)` is exactly the live range.
        unsafe { Iter::new(self.begin(), self.end()) }
    }

    /// Iterates the live elements mutably.
    #[inline]
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    /// Copies the array element by element into a region of the same
    /// capacity. An empty array copies to an empty array with no storage.
    ///
    /// # Errors
    ///
    /// Propagates storage acquisition failures.
    pub fn try_clone(&self) -> Result<Self>
    where
        T: Clone,
    {
        let mut copy = DynArray::new();
        if self.len == 0 {
            return Ok(copy);
        }

        copy.storage = RawStorage::acquire(self.capacity())?;
        copy.stats.record_acquisition();
        for value in self.iter() {
            // SAFETY: `copy.len < self.len <= capacity` and the slot is
            // vacant. `len` only advances after the write, so a panicking
            // `clone` drops exactly the elements built so far.
            unsafe { copy.storage.construct(copy.len, value.clone()) };
            copy.len += 1;
        }

        Ok(copy)
    }

    /// Moves every live element into a region of `grown_capacity` slots.
    fn grow(&mut self) -> Result<()> {
        let old_capacity = self.capacity();
        let new_capacity = grown_capacity(old_capacity)?;
        let mut grown = RawStorage::acquire(new_capacity)?;

        // SAFETY: slots `[0, len)` of the old region are live and the same
        // slots of the new region are vacant (`len <= old < new capacity`).
        unsafe { grown.move_from(0, &mut self.storage, 0, self.len) };
        // The old slots are now vacant; dropping the old region only frees it.
        self.storage = grown;
        self.stats.record_growth(self.len);

        trace!(
            "DynArray<{}> grew {old_capacity} -> {new_capacity} slots, relocated {}",
            type_name::<T>(),
            self.len
        );
        Ok(())
    }
}

impl<T: PartialOrd> DynArray<T> {
    /// Sorts the live elements in place with quicksort.
    ///
    /// Ascending (non-decreasing) when `descending` is `false`, otherwise
    /// non-increasing. The pivot is the last element of each range, so the
    /// sort is not stable, averages `O(n log n)` comparisons, and degrades to
    /// `O(n^2)` on already-ordered input.
    pub fn sort(&mut self, descending: bool) {
        quicksort(self.as_mut_slice(), descending);
    }
}

/// Quicksort that recurses into the smaller partition and loops on the
/// larger one, bounding stack depth to `O(log n)`.
fn quicksort<T: PartialOrd>(mut values: &mut [T], descending: bool) {
    while values.len() > 1 {
        let pivot = partition(values, descending);
        let (left, right) = std::mem::take(&mut values).split_at_mut(pivot);
        let right = &mut right[1..];

        if left.len() < right.len() {
            quicksort(left, descending);
            values = right;
        } else {
            quicksort(right, descending);
            values = left;
        }
    }
}

/// Lomuto partition around the last element; returns the pivot's final index.
fn partition<T: PartialOrd>(values: &mut [T], descending: bool) -> usize {
    let high = values.len() - 1;
    let mut store = 0;

    for j in 0..high {
        let before_pivot = if descending {
            values[j] > values[high]
        } else {
            values[j] < values[high]
        };
        if before_pivot {
            values.swap(store, j);
            store += 1;
        }
    }

    values.swap(store, high);
    store
}

impl<T> Default for DynArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for DynArray<T> {
    fn drop(&mut self) {
        // SAFETY: slots `[0, len)` are live; the region is released by
        // `RawStorage::drop` afterwards.
        unsafe { self.storage.destruct_range(0, self.len) };
    }
}

impl<T: Clone> Clone for DynArray<T> {
    /// # Panics
    ///
    /// Panics if storage for the copy cannot be acquired. Use
    /// [`DynArray::try_clone`] to handle that case.
    fn clone(&self) -> Self {
        self.try_clone().unwrap_or_else(|err| acquisition_failed(err))
    }
}

impl<T> Index<usize> for DynArray<T> {
    type Output = T;

    /// # Panics
    ///
    /// Panics if `index >= len`.
    #[inline]
    #[track_caller]
    fn index(&self, index: usize) -> &T {
        &self.as_slice()[index]
    }
}

impl<T> IndexMut<usize> for DynArray<T> {
    #[inline]
    #[track_caller]
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.as_mut_slice()[index]
    }
}

impl<T: fmt::Debug> fmt::Debug for DynArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for DynArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for DynArray<T> {}

impl<'a, T> IntoIterator for &'a DynArray<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut DynArray<T> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> slice::IterMut<'a, T> {
        self.iter_mut()
    }
}
