//! Raw, untyped-until-constructed storage regions.
//!
//! [`RawStorage`] separates "has memory" from "has a live object". It
//! acquires a region sized for `capacity` elements of `T` from the global
//! allocator and releases it on drop, and it never constructs or destructs an
//! element on its own. Its owner (a container) is the only party that knows
//! which slots are live, so every slot operation is `unsafe` and states
//! exactly what the owner must guarantee.
//!
//! # Example
//!
//! ```
//! use rawcon_mem::RawStorage;
//!
//! let mut storage = RawStorage::<String>::acquire(4).unwrap();
//! assert_eq!(storage.capacity(), 4);
//!
//! unsafe {
//!     storage.construct(0, String::from("live"));
//!     assert_eq!(storage.get(0), "live");
//!     storage.destruct(0);
//! }
//! // Dropping `storage` frees the region without touching slot 0 again.
//! ```

use std::alloc::{self, Layout};
use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;
use std::ptr::{self, NonNull};
use std::slice;

use rawcon_log::debug;

use crate::error::{Error, Result};

/// Capacity of the first region acquired by an empty container.
pub const MIN_NON_ZERO_CAPACITY: usize = 1;

/// Factor applied to the capacity each time a container grows.
pub const GROWTH_FACTOR: usize = 2;

/// Returns the capacity a full container grows to: `max(1, 2 * capacity)`.
///
/// # Errors
///
/// Returns [`Error::CapacityOverflow`] if doubling overflows `usize`.
///
/// ```
/// use rawcon_mem::raw::grown_capacity;
///
/// assert_eq!(grown_capacity(0), Ok(1));
/// assert_eq!(grown_capacity(4), Ok(8));
/// assert!(grown_capacity(usize::MAX).is_err());
/// ```
pub fn grown_capacity(capacity: usize) -> Result<usize> {
    if capacity == 0 {
        return Ok(MIN_NON_ZERO_CAPACITY);
    }

    capacity
        .checked_mul(GROWTH_FACTOR)
        .ok_or(Error::CapacityOverflow {
            requested: capacity.saturating_mul(GROWTH_FACTOR),
        })
}

/// An exclusively owned region with room for `capacity` values of `T`.
///
/// Slots start out uninitialized. Zero-capacity storage and storage for
/// zero-sized types never touch the allocator.
///
/// # Invariants
///
/// - `ptr` is either dangling (zero-byte layout) or the start of a live
///   allocation made with `Layout::array::<T>(capacity)`.
/// - Dropping the storage deallocates the region and runs no destructors.
pub struct RawStorage<T> {
    ptr: NonNull<T>,
    capacity: usize,
    _owns: PhantomData<T>,
}

// SAFETY: `RawStorage` is the unique owner of its region, so sending or
// sharing it is exactly as safe as sending or sharing the `T`s inside.
unsafe impl<T: Send> Send for RawStorage<T> {}
unsafe impl<T: Sync> Sync for RawStorage<T> {}

impl<T> RawStorage<T> {
    /// Creates empty storage without allocating.
    #[must_use]
    pub const fn new() -> Self {
        RawStorage {
            ptr: NonNull::dangling(),
            capacity: 0,
            _owns: PhantomData,
        }
    }

    /// Acquires an uninitialized region for exactly `capacity` elements.
    ///
    /// No constructor runs.
    ///
    /// # Errors
    ///
    /// - [`Error::CapacityOverflow`] if the byte size exceeds `isize::MAX`.
    /// - [`Error::OutOfMemory`] if the allocator returns null.
    pub fn acquire(capacity: usize) -> Result<Self> {
        let layout = Self::layout(capacity)?;

        if layout.size() == 0 {
            return Ok(RawStorage {
                ptr: NonNull::dangling(),
                capacity,
                _owns: PhantomData,
            });
        }

        // SAFETY: the layout has a non-zero size (checked above).
        let raw = unsafe { alloc::alloc(layout) };

        let Some(ptr) = NonNull::new(raw.cast::<T>()) else {
            let err = Error::OutOfMemory {
                requested: layout.size(),
            };
            debug!(
                "acquire {capacity} x {} failed: {err}",
                type_name::<T>()
            );
            return Err(err);
        };

        Ok(RawStorage {
            ptr,
            capacity,
            _owns: PhantomData,
        })
    }

    fn layout(capacity: usize) -> Result<Layout> {
        Layout::array::<T>(capacity).map_err(|_| Error::CapacityOverflow {
            requested: capacity,
        })
    }

    /// Number of element slots in the region.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Pointer to slot 0.
    #[inline]
    #[must_use]
    pub const fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    #[inline]
    pub(crate) const fn base(&self) -> NonNull<T> {
        self.ptr
    }

    /// Pointer to `index`. Creating the pointer is always safe; using it is not.
    #[inline]
    fn slot(&self, index: usize) -> *mut T {
        self.ptr.as_ptr().wrapping_add(index)
    }

    /// Constructs `value` in slot `index`.
    ///
    /// # Safety
    ///
    /// `index < capacity` and the slot must be vacant. A live value in the
    /// slot would be overwritten without being dropped.
    #[inline]
    pub unsafe fn construct(&mut self, index: usize, value: T) {
        debug_assert!(index < self.capacity);
        // SAFETY: in bounds and vacant per the caller's contract.
        unsafe { ptr::write(self.slot(index), value) }
    }

    /// Runs the destructor of the value in slot `index`, leaving it vacant.
    ///
    /// # Safety
    ///
    /// `index < capacity` and the slot must hold a live value.
    #[inline]
    pub unsafe fn destruct(&mut self, index: usize) {
        debug_assert!(index < self.capacity);
        // SAFETY: the slot is live per the caller's contract.
        unsafe { ptr::drop_in_place(self.slot(index)) }
    }

    /// Moves the value out of slot `index`, leaving it vacant.
    ///
    /// # Safety
    ///
    /// `index < capacity` and the slot must hold a live value. The slot must
    /// be treated as vacant afterwards.
    #[inline]
    pub unsafe fn take(&mut self, index: usize) -> T {
        debug_assert!(index < self.capacity);
        // SAFETY: the slot is live per the caller's contract.
        unsafe { ptr::read(self.slot(index)) }
    }

    /// Borrows the value in slot `index`.
    ///
    /// # Safety
    ///
    /// `index < capacity` and the slot must hold a live value.
    #[inline]
    pub unsafe fn get(&self, index: usize) -> &T {
        debug_assert!(index < self.capacity);
        // SAFETY: the slot is live per the caller's contract.
        unsafe { &*self.slot(index) }
    }

    /// Mutably borrows the value in slot `index`.
    ///
    /// # Safety
    ///
    /// `index < capacity` and the slot must hold a live value.
    #[inline]
    pub unsafe fn get_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.capacity);
        // SAFETY: the slot is live per the caller's contract.
        unsafe { &mut *self.slot(index) }
    }

    /// Views `len` slots starting at `start` as a slice.
    ///
    /// # Safety
    ///
    /// `start + len <= capacity` and every slot in the range must be live.
    #[inline]
    pub unsafe fn slice(&self, start: usize, len: usize) -> &[T] {
        debug_assert!(start + len <= self.capacity);
        // SAFETY: the range is in bounds and fully initialized.
        unsafe { slice::from_raw_parts(self.slot(start), len) }
    }

    /// Views `len` slots starting at `start` as a mutable slice.
    ///
    /// # Safety
    ///
    /// `start + len <= capacity` and every slot in the range must be live.
    #[inline]
    pub unsafe fn slice_mut(&mut self, start: usize, len: usize) -> &mut [T] {
        debug_assert!(start + len <= self.capacity);
        // SAFETY: the range is in bounds and fully initialized.
        unsafe { slice::from_raw_parts_mut(self.slot(start), len) }
    }

    /// Views two disjoint ranges, each given as `(start, len)`, as mutable
    /// slices at once.
    ///
    /// # Safety
    ///
    /// Each range satisfies the [`slice_mut`](Self::slice_mut) contract and
    /// the two ranges do not overlap.
    #[inline]
    pub unsafe fn slice_pair_mut(
        &mut self,
        first: (usize, usize),
        second: (usize, usize),
    ) -> (&mut [T], &mut [T]) {
        debug_assert!(first.0 + first.1 <= self.capacity);
        debug_assert!(second.0 + second.1 <= self.capacity);
        // SAFETY: in bounds, initialized and disjoint per the caller's
        // contract, so the two borrows never alias.
        unsafe {
            (
                slice::from_raw_parts_mut(self.slot(first.0), first.1),
                slice::from_raw_parts_mut(self.slot(second.0), second.1),
            )
        }
    }

    /// Destructs `len` consecutive live slots starting at `start`.
    ///
    /// # Safety
    ///
    /// `start + len <= capacity`, every slot in the range must be live, and
    /// all of them must be treated as vacant afterwards.
    #[inline]
    pub unsafe fn destruct_range(&mut self, start: usize, len: usize) {
        debug_assert!(start + len <= self.capacity);
        let range = ptr::slice_from_raw_parts_mut(self.slot(start), len);
        // SAFETY: the range is in bounds and fully initialized.
        unsafe { ptr::drop_in_place(range) }
    }

    /// Relocates `count` live values from `src` (starting at `src_index`)
    /// into this region (starting at `dst`).
    ///
    /// This is a bitwise move: no clone, no destructor. Afterwards the
    /// source slots are vacant and the destination slots are live.
    ///
    /// # Safety
    ///
    /// - `src_index + count <= src.capacity()` and those source slots are live.
    /// - `dst + count <= self.capacity()` and those destination slots are
    ///   vacant.
    #[inline]
    pub unsafe fn move_from(
        &mut self,
        dst: usize,
        src: &mut RawStorage<T>,
        src_index: usize,
        count: usize,
    ) {
        debug_assert!(dst + count <= self.capacity);
        debug_assert!(src_index + count <= src.capacity);
        // SAFETY: distinct owners never share a region, so the ranges cannot
        // overlap; bounds and liveness are the caller's contract.
        unsafe {
            ptr::copy_nonoverlapping(src.slot(src_index), self.slot(dst), count);
        }
    }
}

impl<T> Default for RawStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for RawStorage<T> {
    fn drop(&mut self) {
        if let Ok(layout) = Self::layout(self.capacity)
            && layout.size() != 0
        {
            // SAFETY: a non-zero layout means `ptr` came from `alloc::alloc`
            // with this exact layout in `acquire`.
            unsafe { alloc::dealloc(self.ptr.as_ptr().cast::<u8>(), layout) }
        }
    }
}

impl<T> fmt::Debug for RawStorage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawStorage")
            .field("ptr", &self.ptr)
            .field("capacity", &self.capacity)
            .finish()
    }
}
