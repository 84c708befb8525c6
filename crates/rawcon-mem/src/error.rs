//! Error types for the container core.
//!
//! Only storage acquisition and the queue's checked accessors can fail.
//! Everything else is either infallible, a silent no-op (`pop`/`dequeue` on
//! an empty container), or an `unsafe` API with a documented contract.

use std::fmt;

/// Errors reported by storage and container operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The global allocator could not provide a region.
    OutOfMemory {
        /// Size of the failed request in bytes.
        requested: usize,
    },

    /// The requested slot count cannot be represented as an allocation.
    CapacityOverflow {
        /// The requested number of element slots.
        requested: usize,
    },

    /// `front()` or `back()` was called on an empty queue.
    EmptyQueue,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::OutOfMemory { requested } => {
                write!(f, "Out of memory: failed to acquire {requested} bytes")
            }
            Error::CapacityOverflow { requested } => {
                write!(f, "Capacity overflow: {requested} slots exceed the addressable size")
            }
            Error::EmptyQueue => write!(f, "Queue is empty"),
        }
    }
}

impl std::error::Error for Error {}

/// Result type for container operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Aborts an infallible API (such as `Clone`) whose storage acquisition failed.
#[cold]
#[track_caller]
pub(crate) fn acquisition_failed(err: Error) -> ! {
    panic!("{err}")
}
