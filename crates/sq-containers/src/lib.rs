//! # sq-containers
//!
//! Stacks and queues in three tiers:
//!
//! - **Unsynchronized** ([`unsync`]): plain single-owner containers. Not
//!   shareable across threads without external locking.
//! - **Lock-guarded** ([`Synchronized`]): one mutex per instance; `try_pop`
//!   returns `None` on empty instead of waiting.
//! - **Blocking**: the same [`Synchronized`] wrapper parks `pop` on a
//!   "not empty" condition until a value arrives, the timeout in
//!   `pop_timeout` expires, or the container is closed.
//!
//! The raw tier of a shared container is only reachable through
//! [`Synchronized::with_locked`], so unsynchronized access to shared state
//! does not type-check.
//!
//! # Modules
//!
//! - `linked_stack`: singly linked LIFO stack
//! - `linked_queue`: linked FIFO queue with O(1) append
//! - `vec_stack`: array-backed stack
//! - `two_stack`: FIFO queue built from two array stacks whose transfer
//!   runs inside one critical section
//! - `synchronized`: the mutex + condition variable wrapper
//!
//! Under `--cfg loom` the wrapper is built on loom's primitives and the
//! `loom_tests` modules explore every interleaving.

mod node;
mod sync;

pub mod linked_queue;
pub mod linked_stack;
pub mod raw;
pub mod synchronized;
pub mod two_stack;
pub mod vec_stack;

pub use raw::RawContainer;
pub use synchronized::{SyncQueue, SyncStack, Synchronized};
pub use two_stack::{TwoStackCore, TwoStackQueue};
pub use vec_stack::{SyncVecStack, VecStack};

pub use sq_core::{Closed, ConcurrentContainer, Order, PeekableContainer};

/// Single-threaded containers.
pub mod unsync {
    pub use crate::linked_queue::Queue;
    pub use crate::linked_stack::Stack;
}
