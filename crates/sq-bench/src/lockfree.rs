//! Lock-free comparison point: crossbeam's `SegQueue` behind the
//! container surface.
//!
//! `SegQueue` has no blocking pop, so `pop` and `pop_timeout` back off and
//! retry instead of parking on a condition variable.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam::queue::SegQueue;
use crossbeam::utils::Backoff;
use sq_core::{Closed, ConcurrentContainer, Order};

/// Unbounded MPMC queue without locks.
#[derive(Debug)]
pub struct LockFreeQueue<T> {
    queue: SegQueue<T>,
    closed: AtomicBool,
}

impl<T> LockFreeQueue<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            queue: SegQueue::new(),
            closed: AtomicBool::new(false),
        }
    }
}

impl<T> Default for LockFreeQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn wait(backoff: &Backoff) {
    if backoff.is_completed() {
        thread::yield_now();
    } else {
        backoff.snooze();
    }
}

impl<T: Send> ConcurrentContainer for LockFreeQueue<T> {
    type Item = T;

    fn order(&self) -> Order {
        Order::Fifo
    }

    fn push(&self, value: T) {
        self.queue.push(value);
    }

    fn try_pop(&self) -> Option<T> {
        self.queue.pop()
    }

    fn pop(&self) -> Result<T, Closed> {
        let backoff = Backoff::new();
        loop {
            if let Some(value) = self.queue.pop() {
                return Ok(value);
            }
            if self.closed.load(Ordering::Acquire) {
                // A push may have landed just before close.
                return self.queue.pop().ok_or(Closed);
            }
            wait(&backoff);
        }
    }

    fn pop_timeout(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now().checked_add(timeout);
        let backoff = Backoff::new();
        loop {
            if let Some(value) = self.queue.pop() {
                return Some(value);
            }
            if self.closed.load(Ordering::Acquire) {
                return self.queue.pop();
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return None;
            }
            wait(&backoff);
        }
    }

    fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn len(&self) -> usize {
        self.queue.len()
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_fifo_and_timeout() {
        let queue = LockFreeQueue::new();
        queue.push(1);
        queue.push(2);
        assert_eq!(queue.try_pop(), Some(1));
        assert_eq!(queue.pop(), Ok(2));

        let start = Instant::now();
        assert_eq!(queue.pop_timeout(Duration::from_millis(20)), None);
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_close_releases_spinning_pop() {
        let queue = Arc::new(LockFreeQueue::<u64>::new());
        let waiter = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.pop())
        };
        thread::sleep(Duration::from_millis(20));
        queue.close();
        assert_eq!(waiter.join().unwrap(), Err(Closed));
    }
}
