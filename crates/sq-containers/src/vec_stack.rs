//! Array-backed stack.
//!
//! `VecStack` is the raw tier: contiguous storage, push/pop at the end.
//! `SyncVecStack` adds the lock-guarded and blocking tiers. The two-stack
//! queue composes two raw `VecStack`s under a single lock of its own.

use std::fmt;

use sq_core::Order;

use crate::raw::RawContainer;
use crate::synchronized::Synchronized;

/// Lock-guarded, blocking array stack.
pub type SyncVecStack<T> = Synchronized<VecStack<T>>;

/// Single-threaded stack over a `Vec`.
#[derive(Clone, PartialEq, Eq)]
pub struct VecStack<T> {
    data: Vec<T>,
}

impl<T> VecStack<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self { data: Vec::new() }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Push on top. Amortized O(1); a failed reallocation leaves the
    /// stack untouched.
    pub fn push(&mut self, value: T) {
        self.data.push(value);
    }

    pub fn pop(&mut self) -> Option<T> {
        self.data.pop()
    }

    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        self.data.last()
    }

    /// The oldest element still held.
    #[must_use]
    pub fn bottom(&self) -> Option<&T> {
        self.data.first()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn reserve(&mut self, additional: usize) {
        self.data.reserve(additional);
    }

    /// Iterate from top to bottom.
    pub fn iter(&self) -> std::iter::Rev<std::slice::Iter<'_, T>> {
        self.data.iter().rev()
    }

    /// Bottom-to-top view of the storage.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl<T> Default for VecStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for VecStack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> FromIterator<T> for VecStack<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().collect(),
        }
    }
}

impl<T> RawContainer for VecStack<T> {
    type Item = T;
    const ORDER: Order = Order::Lifo;

    fn push(&mut self, value: T) {
        self.data.push(value);
    }

    fn pop(&mut self) -> Option<T> {
        self.data.pop()
    }

    fn peek(&self) -> Option<&T> {
        self.data.last()
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_operations() {
        let mut stack = VecStack::new();
        assert!(stack.is_empty());
        assert_eq!(stack.pop(), None);

        stack.push(1);
        stack.push(2);
        assert_eq!(stack.peek(), Some(&2));
        assert_eq!(stack.bottom(), Some(&1));
        assert_eq!(stack.len(), 2);

        assert_eq!(stack.pop(), Some(2));
        assert_eq!(stack.pop(), Some(1));
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn test_iter_top_first() {
        let stack: VecStack<u8> = [1, 2, 3].into_iter().collect();
        assert_eq!(stack.iter().copied().collect::<Vec<_>>(), vec![3, 2, 1]);
        assert_eq!(stack.as_slice(), &[1, 2, 3]);
        assert_eq!(format!("{:?}", stack), "[3, 2, 1]");
    }

    #[test]
    fn test_raw_container_surface() {
        fn drain<C: RawContainer>(c: &mut C) -> Vec<C::Item> {
            let mut out = Vec::new();
            while let Some(v) = c.pop() {
                out.push(v);
            }
            out
        }

        let mut stack = VecStack::with_capacity(4);
        RawContainer::push(&mut stack, 'a');
        RawContainer::push(&mut stack, 'b');
        assert_eq!(<VecStack<char> as RawContainer>::ORDER, Order::Lifo);
        assert_eq!(drain(&mut stack), vec!['b', 'a']);
        assert!(RawContainer::is_empty(&stack));
    }
}
