//! The unsynchronized tier shared by every container core.
//!
//! A `RawContainer` is plain single-threaded data. It only becomes
//! shareable once wrapped in [`Synchronized`](crate::Synchronized), which
//! runs these operations while holding its lock. That is the only route
//! from a shared reference to a core, so "raw" operations cannot be
//! reached without the lock.

use sq_core::Order;

/// Single-threaded container with O(1) (or amortized O(1)) push and pop.
pub trait RawContainer {
    /// Element type.
    type Item;

    /// LIFO or FIFO.
    const ORDER: Order;

    /// Insert a value.
    fn push(&mut self, value: Self::Item);

    /// Remove the next value in `ORDER`, or `None` when empty.
    fn pop(&mut self) -> Option<Self::Item>;

    /// The value `pop` would return, without removing it.
    fn peek(&self) -> Option<&Self::Item>;

    /// Number of held elements.
    fn len(&self) -> usize;

    /// Whether nothing is held.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
