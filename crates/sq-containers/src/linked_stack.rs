//! Linked LIFO stack, unsynchronized.
//!
//! # Invariants
//!
//! - `len` equals the number of nodes reachable from `top`
//! - `top.is_none()` iff `len == 0`

use std::fmt;

use sq_core::Order;

use crate::node::{drop_chain, Link, Node};
use crate::raw::RawContainer;

/// Single-threaded linked stack.
///
/// `pop`/`peek` on an empty stack return `None`; there is no unchecked
/// variant.
pub struct Stack<T> {
    top: Link<T>,
    len: usize,
}

impl<T> Stack<T> {
    /// Create an empty stack.
    #[must_use]
    pub const fn new() -> Self {
        Self { top: None, len: 0 }
    }

    /// Push a value on top. O(1).
    pub fn push(&mut self, value: T) {
        // Allocate first: nothing is relinked until the node exists.
        let mut node = Node::boxed(value);
        node.next = self.top.take();
        self.top = Some(node);
        self.len += 1;
    }

    /// Remove the most recently pushed value.
    pub fn pop(&mut self) -> Option<T> {
        self.top.take().map(|node| {
            let node = *node;
            self.top = node.next;
            self.len -= 1;
            node.value
        })
    }

    /// The most recently pushed value.
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        self.top.as_deref().map(|node| &node.value)
    }

    pub fn peek_mut(&mut self) -> Option<&mut T> {
        self.top.as_deref_mut().map(|node| &mut node.value)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.top.is_none()
    }

    /// Iterate from top to bottom.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            next: self.top.as_deref(),
            remaining: self.len,
        }
    }

    /// Drop every element.
    pub fn clear(&mut self) {
        drop_chain(self.top.take());
        self.len = 0;
    }
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for Stack<T> {
    fn drop(&mut self) {
        drop_chain(self.top.take());
    }
}

impl<T: Clone> Clone for Stack<T> {
    fn clone(&self) -> Self {
        // Rebuild bottom-up so the copy keeps the same top.
        let items: Vec<&T> = self.iter().collect();
        let mut copy = Stack::new();
        for value in items.into_iter().rev() {
            copy.push(value.clone());
        }
        copy
    }
}

impl<T: fmt::Debug> fmt::Debug for Stack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Extend<T> for Stack<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

impl<T> FromIterator<T> for Stack<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut stack = Stack::new();
        stack.extend(iter);
        stack
    }
}

impl<T> RawContainer for Stack<T> {
    type Item = T;
    const ORDER: Order = Order::Lifo;

    fn push(&mut self, value: T) {
        Stack::push(self, value);
    }

    fn pop(&mut self) -> Option<T> {
        Stack::pop(self)
    }

    fn peek(&self) -> Option<&T> {
        Stack::peek(self)
    }

    fn len(&self) -> usize {
        self.len
    }
}

/// Top-to-bottom iterator over a [`Stack`].
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
