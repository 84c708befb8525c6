//! `rawcon` containers over manually managed memory
//!
//! This crate provides two growable containers that manage element
//! lifetimes by hand on top of raw, uninitialized storage:
//!
//! - **[`DynArray`]**: a contiguous dynamic array with push/pop, indexing
//!   and an in-place quicksort
//! - **[`RingQueue`]**: a FIFO queue on a circular buffer with wraparound
//!   indexing
//!
//! Both own a single [`RawStorage`] region, which only acquires and releases
//! memory; constructing and destructing elements is always an explicit step
//! taken by the container. Both grow by doubling (`max(1, 2 * capacity)`)
//! and expose [`Cursor`]s for position-based traversal.
//!
//! The containers are single-threaded data structures. They are `Send` and
//! `Sync` exactly when their element type is, and never synchronize.

pub mod array;
pub mod cursor;
pub mod error;
pub mod queue;
pub mod raw;
pub mod stats;

pub use array::DynArray;
pub use cursor::{Cursor, Iter, RingIter};
pub use error::{Error, Result};
pub use queue::RingQueue;
pub use raw::RawStorage;
pub use stats::StorageStats;
