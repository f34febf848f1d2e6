//! Linked FIFO queue, unsynchronized.
//!
//! # Invariants
//!
//! - `front.is_none()` iff `rear.is_none()` iff `len == 0`
//! - with one element, `front` and `rear` are the same node
//! - `rear.next` is always `None`
//!
//! # Ownership
//!
//! `front` owns the whole chain through `Node`'s owned `next` links.
//! `rear` is a non-owning pointer into that chain, used only for O(1)
//! append and `back`; it is reset whenever the chain becomes empty.

use std::fmt;
use std::ptr::NonNull;

use sq_core::Order;

use crate::node::{drop_chain, Link, Node};
use crate::raw::RawContainer;

/// Single-threaded linked queue.
///
/// `pop`/`peek`/`back` on an empty queue return `None`.
pub struct Queue<T> {
    front: Link<T>,
    rear: Option<NonNull<Node<T>>>,
    len: usize,
}

// Safety: `rear` only ever points into the chain owned by `front`, and is
// dereferenced through `&self`/`&mut self` borrows of the queue itself.
unsafe impl<T: Send> Send for Queue<T> {}
unsafe impl<T: Sync> Sync for Queue<T> {}

impl<T> Queue<T> {
    /// Create an empty queue.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            front: None,
            rear: None,
            len: 0,
        }
    }

    /// Append a value at the rear. O(1).
    pub fn push(&mut self, value: T) {
        // Allocate first: nothing is relinked until the node exists.
        let mut node = Node::boxed(value);
        let raw = NonNull::from(&mut *node);

        match self.rear {
            // Safety: `rear` points at the last node of the chain owned by
            // `front`, and `&mut self` rules out any other reference to it.
            Some(rear) => unsafe { (*rear.as_ptr()).next = Some(node) },
            None => self.front = Some(node),
        }
        self.rear = Some(raw);
        self.len += 1;
    }

    /// Remove the least recently pushed value.
    pub fn pop(&mut self) -> Option<T> {
        self.front.take().map(|mut node| {
            self.front = node.next.take();
            if self.front.is_none() {
                self.rear = None;
            }
            self.len -= 1;
            node.value
        })
    }

    /// The least recently pushed value.
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        self.front.as_deref().map(|node| &node.value)
    }

    pub fn peek_mut(&mut self) -> Option<&mut T> {
        self.front.as_deref_mut().map(|node| &mut node.value)
    }

    /// The most recently pushed value.
    #[must_use]
    pub fn back(&self) -> Option<&T> {
        // Safety: `rear` is in the chain, which lives as long as `&self`.
        self.rear.map(|node| unsafe { &(*node.as_ptr()).value })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.front.is_none()
    }

    /// Iterate from front to rear.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            next: self.front.as_deref(),
            remaining: self.len,
        }
    }

    /// Drop every element.
    pub fn clear(&mut self) {
        self.rear = None;
        self.len = 0;
        drop_chain(self.front.take());
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for Queue<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: Clone> Clone for Queue<T> {
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }
}

impl<T: fmt::Debug> fmt::Debug for Queue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Extend<T> for Queue<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

impl<T> FromIterator<T> for Queue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut queue = Queue::new();
        queue.extend(iter);
        queue
    }
}

impl<T> RawContainer for Queue<T> {
    type Item = T;
    const ORDER: Order = Order::Fifo;

    fn push(&mut self, value: T) {
        Queue::push(self, value);
    }

    fn pop(&mut self) -> Option<T> {
        Queue::pop(self)
    }

    fn peek(&self) -> Option<&T> {
        Queue::peek(self)
    }

    fn len(&self) -> usize {
        self.len
    }
}

/// Front-to-rear iterator over a [`Queue`].
pub struct Iter<'a, T> {
    next: Option<&'a Node<T>>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.next.map(|node| {
            self.next = node.next.as_deref();
            self.remaining -= 1;
            &node.value
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_operations() {
        let mut queue = Queue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.pop(), None);
        assert_eq!(queue.peek(), None);
        assert_eq!(queue.back(), None);

        queue.push(1);
        assert_eq!(queue.peek(), Some(&1));
        assert_eq!(queue.back(), Some(&1));

        queue.push(2);
        queue.push(3);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.peek(), Some(&1));
        assert_eq!(queue.back(), Some(&3));

        assert_eq!(queue.pop(), Some(1));
        assert_eq!(queue.pop(), Some(2));
        assert_eq!(queue.pop(), Some(3));
        assert_eq!(queue.pop(), None);
        assert!(queue.is_empty());
        assert_eq!(queue.back(), None);
    }

    #[test]
    fn test_fifo_order() {
        let mut queue: Queue<u32> = (0..1000).collect();
        for expected in 0..1000 {
            assert_eq!(queue.pop(), Some(expected));
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn test_refill_after_empty() {
        // Rear must be reset when the last node leaves.
        let mut queue = Queue::new();
        queue.push(1);
        assert_eq!(queue.pop(), Some(1));
        queue.push(2);
        queue.push(3);
        assert_eq!(queue.back(), Some(&3));
        assert_eq!(queue.pop(), Some(2));
        assert_eq!(queue.pop(), Some(3));
    }

    #[test]
    fn test_peek_mut() {
        let mut queue = Queue::new();
        queue.push(10);
        queue.push(20);
        if let Some(front) = queue.peek_mut() {
            *front += 1;
        }
        assert_eq!(queue.pop(), Some(11));
    }

    #[test]
    fn test_clone_is_deep() {
        let queue: Queue<String> = ["a", "b"].into_iter().map(String::from).collect();
        let mut copy = queue.clone();
        copy.push("c".to_string());
        assert_eq!(queue.len(), 2);
        assert_eq!(format!("{:?}", copy), r#"["a", "b", "c"]"#);
    }

    #[test]
    fn test_drop_releases_values() {
        use std::rc::Rc;

        let tracker = Rc::new(());
        {
            let mut queue = Queue::new();
            for _ in 0..10 {
                queue.push(Rc::clone(&tracker));
            }
            queue.pop();
            assert_eq!(Rc::strong_count(&tracker), 10);
        }
        assert_eq!(Rc::strong_count(&tracker), 1);
    }

    #[test]
    fn test_back_follows_rear_through_interleaving() {
        let mut queue = Queue::new();
        for round in 0..50u32 {
            queue.push(round * 2);
            queue.push(round * 2 + 1);
            assert_eq!(queue.back(), Some(&(round * 2 + 1)));
            assert_eq!(queue.pop(), Some(round));
            assert_eq!(queue.peek(), Some(&(round + 1)));
        }
        assert_eq!(queue.len(), 50);
        let rest: Vec<_> = queue.iter().copied().collect();
        assert_eq!(rest, (50..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_clear_then_reuse() {
        let mut queue: Queue<u64> = (0..100_000).collect();
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.back(), None);

        queue.push(7);
        queue.push(8);
        assert_eq!(queue.peek(), Some(&7));
        assert_eq!(queue.back(), Some(&8));
        assert_eq!(queue.pop(), Some(7));
        assert_eq!(queue.pop(), Some(8));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_drop_long_chain() {
        let queue: Queue<u64> = (0..1_000_000).collect();
        assert_eq!(queue.len(), 1_000_000);
        drop(queue);
    }
}
