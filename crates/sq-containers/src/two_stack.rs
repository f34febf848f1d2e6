//! FIFO queue built from two array stacks.
//!
//! ```text
//!   enqueue ──► [ input  ]        [ output ] ──► dequeue
//!               bottom..top        top = oldest
//!
//!   output empty?  move input top→bottom onto output, then pop output
//! ```
//!
//! Every element is pushed and popped once on each stack, so N operations
//! cost O(N) in total: O(1) amortized, even though one transfer is O(n).
//!
//! # Atomicity
//!
//! "Output is empty, so transfer" and the transfer itself must be one step.
//! If an enqueue could land in `input` between the check and the drain, or
//! the drain released the lock halfway, two dequeuers could each move part
//! of `input` and hand elements out of order. `TwoStackCore` is a raw
//! container, so its whole `dequeue` (check, transfer, pop) always runs
//! inside one critical section of the `TwoStackQueue` lock. The
//! `sq-model` crate model-checks the split variant to show the failure.

use std::fmt;
use std::time::Duration;

use sq_core::{Closed, ConcurrentContainer, Order, PeekableContainer};

use crate::raw::RawContainer;
use crate::synchronized::Synchronized;
use crate::vec_stack::VecStack;

/// Two raw stacks acting as one FIFO queue. Unsynchronized.
#[derive(Clone)]
pub struct TwoStackCore<T> {
    input: VecStack<T>,
    output: VecStack<T>,
    transferred: u64,
}

impl<T> TwoStackCore<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            input: VecStack::new(),
            output: VecStack::new(),
            transferred: 0,
        }
    }

    /// Push onto `input`. O(1) worst case (amortized for reallocation).
    pub fn enqueue(&mut self, value: T) {
        self.input.push(value);
    }

    /// Pop the oldest element, refilling `output` from `input` first if
    /// `output` is empty.
    pub fn dequeue(&mut self) -> Option<T> {
        self.transfer_if_needed();
        self.output.pop()
    }

    /// The oldest element: top of `output`, or the bottom of `input` when
    /// no transfer has happened yet.
    #[must_use]
    pub fn front(&self) -> Option<&T> {
        self.output.peek().or_else(|| self.input.bottom())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.input.len() + self.output.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.input.is_empty() && self.output.is_empty()
    }

    /// Total number of elements moved from `input` to `output` so far.
    /// Never exceeds the number of enqueues.
    #[must_use]
    pub fn transferred(&self) -> u64 {
        self.transferred
    }

    /// Iterate oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.output.iter().chain(self.input.as_slice().iter())
    }

    fn transfer_if_needed(&mut self) {
        if !self.output.is_empty() {
            return;
        }
        self.output.reserve(self.input.len());
        while let Some(value) = self.input.pop() {
            self.output.push(value);
            self.transferred += 1;
        }
    }
}

impl<T> Default for TwoStackCore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for TwoStackCore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwoStackCore")
            .field("input", &self.input)
            .field("output", &self.output)
            .finish()
    }
}

impl<T> RawContainer for TwoStackCore<T> {
    type Item = T;
    const ORDER: Order = Order::Fifo;

    fn push(&mut self, value: T) {
        self.enqueue(value);
    }

    fn pop(&mut self) -> Option<T> {
        self.dequeue()
    }

    fn peek(&self) -> Option<&T> {
        self.front()
    }

    fn len(&self) -> usize {
        TwoStackCore::len(self)
    }
}

/// Thread-safe two-stack queue: one lock and one "not empty" condition
/// shared by both internal stacks.
pub struct TwoStackQueue<T> {
    inner: Synchronized<TwoStackCore<T>>,
}

impl<T> TwoStackQueue<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Synchronized::from_core(TwoStackCore::new()),
        }
    }

    /// Enqueue and wake one waiting dequeuer.
    pub fn enqueue(&self, value: T) {
        self.inner.push(value);
    }

    /// Lock-guarded enqueue that wakes nobody. Dequeuers polling with
    /// `try_dequeue` see the value; a parked `dequeue_wait` does not.
    pub fn enqueue_quiet(&self, value: T) {
        self.inner.push_quiet(value);
    }

    /// Lock-guarded, non-blocking dequeue. Transfer and pop happen under
    /// the same lock acquisition.
    pub fn try_dequeue(&self) -> Option<T> {
        self.inner.try_pop()
    }

    /// Block until an element is available (or the queue is closed and
    /// empty).
    pub fn dequeue_wait(&self) -> Result<T, Closed> {
        self.inner.pop()
    }

    /// Block for at most `timeout`.
    pub fn dequeue_timeout(&self, timeout: Duration) -> Option<T> {
        self.inner.pop_timeout(timeout)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn close(&self) {
        self.inner.close();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    /// Elements moved between the internal stacks so far.
    #[must_use]
    pub fn transferred(&self) -> u64 {
        self.inner.with_locked(|core| core.transferred())
    }

    /// Remove everything, oldest first, under one lock acquisition.
    pub fn drain(&self) -> Vec<T> {
        self.inner.drain()
    }

    /// Run `f` on the raw core while holding the queue's lock.
    pub fn with_locked<R>(&self, f: impl FnOnce(&mut TwoStackCore<T>) -> R) -> R {
        self.inner.with_locked(f)
    }
}

impl<T: Clone> TwoStackQueue<T> {
    /// Copy of the oldest element.
    #[must_use]
    pub fn try_peek(&self) -> Option<T> {
        self.inner.try_peek()
    }
}

impl<T> Default for TwoStackQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for TwoStackQueue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> fmt::Debug for TwoStackQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwoStackQueue")
            .field("id", &self.inner.id())
            .field("len", &self.len())
            .finish()
    }
}

impl<T: Send> ConcurrentContainer for TwoStackQueue<T> {
    type Item = T;

    fn order(&self) -> Order {
        Order::Fifo
    }

    fn push(&self, value: T) {
        self.enqueue(value);
    }

    fn push_quiet(&self, value: T) {
        self.enqueue_quiet(value);
    }

    fn try_pop(&self) -> Option<T> {
        self.try_dequeue()
    }

    fn pop(&self) -> Result<T, Closed> {
        self.dequeue_wait()
    }

    fn pop_timeout(&self, timeout: Duration) -> Option<T> {
        self.dequeue_timeout(timeout)
    }

    fn is_empty(&self) -> bool {
        TwoStackQueue::is_empty(self)
    }

    fn len(&self) -> usize {
        TwoStackQueue::len(self)
    }

    fn close(&self) {
        TwoStackQueue::close(self);
    }

    fn is_closed(&self) -> bool {
        TwoStackQueue::is_closed(self)
    }
}

impl<T: Send> PeekableContainer for TwoStackQueue<T> {
    fn try_peek(&self) -> Option<T>
    where
        T: Clone,
    {
        self.inner.try_peek()
    }
}
