//! The operation surface shared by every synchronized container.
//!
//! Linked stacks, array stacks, linked queues and the two-stack queue all
//! expose the same shape, so a benchmark or a DST runner can drive any of
//! them without knowing which one it holds.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Order in which a container hands values back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    /// Last in, first out (stacks).
    Lifo,
    /// First in, first out (queues).
    Fifo,
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Order::Lifo => f.write_str("LIFO"),
            Order::Fifo => f.write_str("FIFO"),
        }
    }
}

/// A blocking pop gave up because the container was closed and drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("container closed while waiting for a value")]
pub struct Closed;

/// Thread-safe producer/consumer container.
///
/// Every method takes `&self`; implementations guard their state with one
/// lock per instance. Each operation is linearizable with respect to that
/// lock.
pub trait ConcurrentContainer: Send + Sync {
    /// Element type.
    type Item: Send;

    /// Whether values come back LIFO or FIFO.
    fn order(&self) -> Order;

    /// Insert a value and wake one parked popper.
    ///
    /// Never blocks beyond ordinary lock contention. Values pushed after
    /// [`close`](Self::close) are still accepted.
    fn push(&self, value: Self::Item);

    /// Insert a value without signalling parked poppers.
    ///
    /// The lock-only tier, for callers whose consumers poll with
    /// [`try_pop`](Self::try_pop). A popper parked in [`pop`](Self::pop)
    /// may stay parked until the next signalling push or `close`.
    /// Containers without a wakeup signal just push.
    fn push_quiet(&self, value: Self::Item) {
        self.push(value);
    }

    /// Remove a value if one is present. Never waits for a producer.
    fn try_pop(&self) -> Option<Self::Item>;

    /// Remove a value, parking until one is available.
    ///
    /// Returns `Err(Closed)` only once the container has been closed and
    /// holds nothing.
    fn pop(&self) -> Result<Self::Item, Closed>;

    /// Like [`pop`](Self::pop), but gives up after `timeout`.
    ///
    /// Expiry is a normal outcome, not an error: `None` means nothing was
    /// removed.
    fn pop_timeout(&self, timeout: Duration) -> Option<Self::Item>;

    /// Consistent-snapshot emptiness check.
    fn is_empty(&self) -> bool;

    /// Consistent-snapshot element count.
    fn len(&self) -> usize;

    /// Wake every parked popper; blocking pops on an empty container
    /// return `Err(Closed)` from now on.
    fn close(&self);

    /// Whether [`close`](Self::close) has been called.
    fn is_closed(&self) -> bool;
}

impl<C: ConcurrentContainer + ?Sized> ConcurrentContainer for Arc<C> {
    type Item = C::Item;

    fn order(&self) -> Order {
        (**self).order()
    }

    fn push(&self, value: Self::Item) {
        (**self).push(value);
    }

    fn push_quiet(&self, value: Self::Item) {
        (**self).push_quiet(value);
    }

    fn try_pop(&self) -> Option<Self::Item> {
        (**self).try_pop()
    }

    fn pop(&self) -> Result<Self::Item, Closed> {
        (**self).pop()
    }

    fn pop_timeout(&self, timeout: Duration) -> Option<Self::Item> {
        (**self).pop_timeout(timeout)
    }

    fn is_empty(&self) -> bool {
        (**self).is_empty()
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn close(&self) {
        (**self).close();
    }

    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }
}

/// A container that can report the value its next pop would return.
///
/// Separate from [`ConcurrentContainer`] because not every container can
/// look at its head without removing it.
pub trait PeekableContainer: ConcurrentContainer {
    /// Copy of the value [`try_pop`](ConcurrentContainer::try_pop) would
    /// remove right now. Never waits for a producer.
    fn try_peek(&self) -> Option<Self::Item>
    where
        Self::Item: Clone;
}

impl<C: PeekableContainer + ?Sized> PeekableContainer for Arc<C> {
    fn try_peek(&self) -> Option<Self::Item>
    where
        Self::Item: Clone,
    {
        (**self).try_peek()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_display() {
        assert_eq!(
            Closed.to_string(),
            "container closed while waiting for a value"
        );
    }

    #[test]
    fn test_order_display() {
        assert_eq!(Order::Lifo.to_string(), "LIFO");
        assert_eq!(Order::Fifo.to_string(), "FIFO");
    }
}
