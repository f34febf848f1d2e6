//! Monitor wrapper: one mutex and one "not empty" condition per instance.
//!
//! `Synchronized<C>` turns any [`RawContainer`] into a
//! [`ConcurrentContainer`]. Every read and write of the core happens with
//! the lock held.
//!
//! # Operations
//!
//! | Operation | Blocks? | Empty container |
//! |-----------|---------|-----------------|
//! | `push` | lock only | n/a |
//! | `try_pop` | lock only | `None` |
//! | `pop` | until a value arrives or `close()` | waits |
//! | `pop_timeout` | at most `timeout` | `None` after expiry |
//! | `try_peek`, `len`, `is_empty` | lock only | snapshot |
//!
//! # Wakeups
//!
//! `push` mutates under the lock, releases it, then calls `notify_one`.
//! Waiters re-check the predicate in a loop after every wake, so spurious
//! wakeups and a racing `try_pop` that steals the value are both
//! harmless. `close` wakes everyone.
//!
//! # Lock ordering
//!
//! Each instance gets a process-unique id at construction. Operations that
//! touch two instances (`assign_from`, `swap_with`) lock the lower id
//! first, so two threads copying in opposite directions cannot deadlock.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::PoisonError;
use std::time::{Duration, Instant};

use sq_core::{Closed, ConcurrentContainer, Order, PeekableContainer};

use crate::linked_queue::Queue;
use crate::linked_stack::Stack;
use crate::raw::RawContainer;
use crate::sync::{Condvar, Mutex, MutexGuard};

/// Lock-guarded, blocking linked stack.
pub type SyncStack<T> = Synchronized<Stack<T>>;

/// Lock-guarded, blocking linked queue.
pub type SyncQueue<T> = Synchronized<Queue<T>>;

/// Instance ids start at 1; 0 is never handed out.
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

struct State<C> {
    core: C,
    closed: bool,
}

/// A raw container behind one mutex and one condition variable.
pub struct Synchronized<C> {
    id: u64,
    state: Mutex<State<C>>,
    not_empty: Condvar,
}

impl<C> Synchronized<C> {
    /// Wrap an existing core.
    pub fn from_core(core: C) -> Self {
        Self {
            id: next_id(),
            state: Mutex::new(State {
                core,
                closed: false,
            }),
            not_empty: Condvar::new(),
        }
    }

    /// Process-unique id used for cross-instance lock ordering.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Unwrap the core.
    pub fn into_inner(self) -> C {
        self.state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .core
    }

    // Cores never sit half-mutated across a panic point, so a poisoned
    // lock still guards a consistent container.
    fn lock(&self) -> MutexGuard<'_, State<C>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait<'a>(&self, guard: MutexGuard<'a, State<C>>) -> MutexGuard<'a, State<C>> {
        self.not_empty
            .wait(guard)
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn wait_for<'a>(
        &self,
        guard: MutexGuard<'a, State<C>>,
        timeout: Duration,
    ) -> MutexGuard<'a, State<C>> {
        let (guard, _) = self
            .not_empty
            .wait_timeout(guard, timeout)
            .unwrap_or_else(PoisonError::into_inner);
        guard
    }

    /// Wake every parked popper. Blocking pops on an empty container return
    /// `Err(Closed)` from now on; values can still be pushed and popped.
    pub fn close(&self) {
        let mut state = self.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        drop(state);
        tracing::debug!(id = self.id, "container closed");
        self.not_empty.notify_all();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }
}

impl<C: RawContainer> Synchronized<C> {
    /// Push and wake one parked popper.
    pub fn push(&self, value: C::Item) {
        {
            let mut state = self.lock();
            state.core.push(value);
        }
        self.not_empty.notify_one();
    }

    /// Push without waking anyone. Pollers using `try_pop` see the value;
    /// a popper parked in `pop` waits for the next signal.
    pub fn push_quiet(&self, value: C::Item) {
        self.lock().core.push(value);
    }

    /// Remove a value if one is present. Never waits.
    pub fn try_pop(&self) -> Option<C::Item> {
        self.lock().core.pop()
    }

    /// Remove a value, parking on the "not empty" condition until one
    /// arrives.
    ///
    /// Returns `Err(Closed)` only if the container is closed and empty;
    /// values pushed before (or after) `close` are still handed out.
    pub fn pop(&self) -> Result<C::Item, Closed> {
        let mut state = self.lock();
        loop {
            if let Some(value) = state.core.pop() {
                return Ok(value);
            }
            if state.closed {
                return Err(Closed);
            }
            tracing::trace!(id = self.id, "pop parked on empty container");
            state = self.wait(state);
        }
    }

    /// Like [`pop`](Self::pop), bounded by `timeout`.
    ///
    /// The deadline is fixed on entry, so spurious wakeups do not extend
    /// the total wait. `None` means nothing was removed.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<C::Item> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return self.pop().ok();
        };

        let mut state = self.lock();
        loop {
            if let Some(value) = state.core.pop() {
                return Some(value);
            }
            if state.closed {
                return None;
            }
            let now = Instant::now();
            if now >= deadline {
                tracing::trace!(id = self.id, ?timeout, "pop timed out");
                return None;
            }
            state = self.wait_for(state, deadline - now);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().core.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().core.is_empty()
    }

    /// Remove every element, in pop order, under one lock acquisition.
    pub fn drain(&self) -> Vec<C::Item> {
        let mut state = self.lock();
        let mut out = Vec::with_capacity(state.core.len());
        while let Some(value) = state.core.pop() {
            out.push(value);
        }
        out
    }

    /// Run `f` on the raw core while holding the lock.
    ///
    /// This is the only way to reach the unsynchronized tier of a shared
    /// container. If `f` leaves the core larger than it found it, all
    /// parked poppers are woken.
    pub fn with_locked<R>(&self, f: impl FnOnce(&mut C) -> R) -> R {
        let mut state = self.lock();
        let before = state.core.len();
        let result = f(&mut state.core);
        let grew = state.core.len() > before;
        drop(state);
        if grew {
            self.not_empty.notify_all();
        }
        result
    }

    /// Lock `self` and `other` in id order and hand both states to `f`.
    fn with_both<R>(
        &self,
        other: &Self,
        f: impl FnOnce(&mut State<C>, &mut State<C>) -> R,
    ) -> R {
        debug_assert_ne!(self.id, other.id, "both locks taken on one instance");
        let (mut mine, mut theirs) = if self.id < other.id {
            let mine = self.lock();
            let theirs = other.lock();
            (mine, theirs)
        } else {
            let theirs = other.lock();
            let mine = self.lock();
            (mine, theirs)
        };
        f(&mut mine, &mut theirs)
    }

    /// Exchange contents with another live container.
    ///
    /// Both locks are held for the whole exchange, taken in id order.
    /// Swapping with itself is a no-op.
    pub fn swap_with(&self, other: &Self) {
        if self.id == other.id {
            return;
        }
        self.with_both(other, |mine, theirs| {
            std::mem::swap(&mut mine.core, &mut theirs.core);
        });
        self.not_empty.notify_all();
        other.not_empty.notify_all();
    }
}

impl<C: RawContainer + Default> Synchronized<C> {
    #[must_use]
    pub fn new() -> Self {
        Self::from_core(C::default())
    }
}

impl<C: RawContainer + Clone> Synchronized<C> {
    /// Replace this container's contents with a copy of `other`'s.
    ///
    /// Both locks are held for the whole copy, taken in id order.
    /// Assigning a container to itself is a no-op. The closed flag is not
    /// copied.
    pub fn assign_from(&self, other: &Self) {
        if self.id == other.id {
            return;
        }
        let filled = self.with_both(other, |mine, theirs| {
            mine.core = theirs.core.clone();
            !mine.core.is_empty()
        });
        if filled {
            self.not_empty.notify_all();
        }
    }
}

impl<C> Synchronized<C>
where
    C: RawContainer,
    C::Item: Clone,
{
    /// Copy of the value `pop` would return.
    #[must_use]
    pub fn try_peek(&self) -> Option<C::Item> {
        self.lock().core.peek().cloned()
    }
}

impl<C: RawContainer + Default> Default for Synchronized<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies the contents under the source's lock. The copy gets a fresh id
/// and starts open.
impl<C: Clone> Clone for Synchronized<C> {
    fn clone(&self) -> Self {
        Self::from_core(self.lock().core.clone())
    }
}

impl<C: RawContainer> fmt::Debug for Synchronized<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("Synchronized")
            .field("id", &self.id)
            .field("order", &C::ORDER)
            .field("len", &state.core.len())
            .field("closed", &state.closed)
            .finish()
    }
}

impl<C> ConcurrentContainer for Synchronized<C>
where
    C: RawContainer + Send,
    C::Item: Send,
{
    type Item = C::Item;

    fn order(&self) -> Order {
        C::ORDER
    }

    fn push(&self, value: C::Item) {
        Synchronized::push(self, value);
    }

    fn push_quiet(&self, value: C::Item) {
        Synchronized::push_quiet(self, value);
    }

    fn try_pop(&self) -> Option<C::Item> {
        Synchronized::try_pop(self)
    }

    fn pop(&self) -> Result<C::Item, Closed> {
        Synchronized::pop(self)
    }

    fn pop_timeout(&self, timeout: Duration) -> Option<C::Item> {
        Synchronized::pop_timeout(self, timeout)
    }

    fn is_empty(&self) -> bool {
        Synchronized::is_empty(self)
    }

    fn len(&self) -> usize {
        Synchronized::len(self)
    }

    fn close(&self) {
        Synchronized::close(self);
    }

    fn is_closed(&self) -> bool {
        Synchronized::is_closed(self)
    }
}

impl<C> PeekableContainer for Synchronized<C>
where
    C: RawContainer + Send,
    C::Item: Send,
{
    fn try_peek(&self) -> Option<C::Item>
    where
        C::Item: Clone,
    {
        Synchronized::try_peek(self)
    }
}


/// Loom tests - these exhaustively check all interleavings
#[cfg(loom)]
mod loom_tests {
    use super::*;
    use crate::two_stack::TwoStackQueue;
    use loom::sync::Arc;
    use loom::thread;

    #[test]
    fn test_push_try_pop_race() {
        loom::model(|| {
            let stack = Arc::new(SyncStack::new());
            stack.push(1);

            let s1 = Arc::clone(&stack);
            let s2 = Arc::clone(&stack);

            let h1 = thread::spawn(move || s1.push(2));
            let h2 = thread::spawn(move || s2.try_pop());

            h1.join().unwrap();
            let popped = h2.join().unwrap();
            assert!(popped.is_some());

            let remaining = stack.drain();
            assert_eq!(remaining.len(), 1);
        });
    }

    #[test]
    fn test_blocking_pop_never_misses_push() {
        // A lost wakeup shows up as a loom deadlock.
        loom::model(|| {
            let queue = Arc::new(SyncQueue::new());

            let consumer = {
                let queue = Arc::clone(&queue);
                thread::spawn(move || queue.pop())
            };

            queue.push(7);
            assert_eq!(consumer.join().unwrap(), Ok(7));
        });
    }

    #[test]
    fn test_two_blocking_poppers() {
        loom::model(|| {
            let stack = Arc::new(SyncStack::<u32>::new());

            let consumers: Vec<_> = (0..2)
                .map(|_| {
                    let stack = Arc::clone(&stack);
                    thread::spawn(move || stack.pop().unwrap())
                })
                .collect();

            stack.push(1);
            stack.push(2);

            let mut got: Vec<u32> = consumers.into_iter().map(|h| h.join().unwrap()).collect();
            got.sort_unstable();
            assert_eq!(got, vec![1, 2]);
        });
    }

    #[test]
    fn test_close_releases_waiter() {
        loom::model(|| {
            let stack = Arc::new(SyncStack::<u32>::new());

            let waiter = {
                let stack = Arc::clone(&stack);
                thread::spawn(move || stack.pop())
            };

            stack.close();
            assert_eq!(waiter.join().unwrap(), Err(Closed));
        });
    }

    #[test]
    fn test_two_stack_dequeue_is_atomic() {
        loom::model(|| {
            let queue = Arc::new(TwoStackQueue::new());
            queue.enqueue(1);
            queue.enqueue(2);

            let q1 = Arc::clone(&queue);
            let q2 = Arc::clone(&queue);

            let h1 = thread::spawn(move || q1.try_dequeue());
            let h2 = thread::spawn(move || {
                q2.enqueue(3);
                q2.try_dequeue()
            });

            let a = h1.join().unwrap();
            let b = h2.join().unwrap();

            // The two dequeues take the two oldest elements, 1 and 2.
            let mut got = vec![a.unwrap(), b.unwrap()];
            got.sort_unstable();
            assert_eq!(got, vec![1, 2]);
            assert_eq!(queue.try_dequeue(), Some(3));
        });
    }
}
