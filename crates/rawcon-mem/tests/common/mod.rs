// Common test utilities for integration tests
//
// Elements that record their own construction and destruction, so tests can
// check that every live element is dropped exactly once.

#![allow(dead_code)]

use std::cell::Cell;
use std::cmp::Ordering;
use std::rc::Rc;

use rawcon_mem::{DynArray, RingQueue};

/// Shared live/drop counters for [`Tracked`] elements.
#[derive(Debug, Default)]
pub struct Ledger {
    created: Cell<usize>,
    dropped: Cell<usize>,
}

impl Ledger {
    pub fn new() -> Rc<Self> {
        Rc::new(Ledger::default())
    }

    /// Elements created (including clones) that have not been dropped.
    pub fn live(&self) -> usize {
        self.created.get() - self.dropped.get()
    }

    pub fn dropped(&self) -> usize {
        self.dropped.get()
    }
}

/// An element that reports to a [`Ledger`].
#[derive(Debug)]
pub struct Tracked {
    pub value: i64,
    ledger: Rc<Ledger>,
}

impl Tracked {
    pub fn new(value: i64, ledger: &Rc<Ledger>) -> Self {
        ledger.created.set(ledger.created.get() + 1);
        Tracked {
            value,
            ledger: Rc::clone(ledger),
        }
    }
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        Tracked::new(self.value, &self.ledger)
    }
}

impl PartialEq for Tracked {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl PartialOrd for Tracked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.value.partial_cmp(&other.value)
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.ledger.dropped.set(self.ledger.dropped.get() + 1);
    }
}

/// Builds an array by pushing `values` in order.
pub fn array_of<T>(values: impl IntoIterator<Item = T>) -> DynArray<T> {
    let mut array = DynArray::new();
    for value in values {
        array.push(value).expect("push failed");
    }
    array
}

/// Builds a queue by enqueuing `values` in order.
pub fn queue_of<T>(values: impl IntoIterator<Item = T>) -> RingQueue<T> {
    let mut queue = RingQueue::new();
    for value in values {
        queue.enqueue(value).expect("enqueue failed");
    }
    queue
}

/// Dequeues everything, reading `front()` before each dequeue.
pub fn drain_via_front<T: Clone>(queue: &mut RingQueue<T>) -> Vec<T> {
    let mut out = Vec::new();
    while let Ok(front) = queue.front() {
        out.push(front.clone());
        queue.dequeue();
    }
    out
}
