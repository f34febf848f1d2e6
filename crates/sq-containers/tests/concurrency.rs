//! Multi-threaded behaviour of every synchronized container.
//!
//! Each property is checked against all four implementations through the
//! shared `ConcurrentContainer` surface.

#![cfg(not(loom))]

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use sq_containers::{
    Closed, ConcurrentContainer, Order, PeekableContainer, SyncQueue, SyncStack, SyncVecStack,
    TwoStackQueue,
};

type Shared = Arc<dyn ConcurrentContainer<Item = u64>>;

fn shared<C: ConcurrentContainer<Item = u64> + 'static>(container: C) -> Shared {
    Arc::new(container)
}

fn every_container() -> Vec<(&'static str, Shared)> {
    vec![
        ("linked_stack", shared(SyncStack::new())),
        ("vec_stack", shared(SyncVecStack::new())),
        ("linked_queue", shared(SyncQueue::new())),
        ("two_stack_queue", shared(TwoStackQueue::new())),
    ]
}

#[test]
fn test_size_matches_pushes_minus_pops() {
    const THREADS: u64 = 8;
    const OPS: u64 = 2_000;

    for (name, container) in every_container() {
        let pushes = Arc::new(AtomicU64::new(0));
        let pops = Arc::new(AtomicU64::new(0));

        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let container = Arc::clone(&container);
                let pushes = Arc::clone(&pushes);
                let pops = Arc::clone(&pops);
                thread::spawn(move || {
                    for i in 0..OPS {
                        // Mix of pushes and pops, weighted toward pushes.
                        if (i + t) % 3 == 0 {
                            if container.try_pop().is_some() {
                                pops.fetch_add(1, Ordering::Relaxed);
                            }
                        } else {
                            container.push(t * OPS + i);
                            pushes.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let expected = pushes.load(Ordering::Relaxed) - pops.load(Ordering::Relaxed);
        assert_eq!(container.len() as u64, expected, "{}", name);
        assert_eq!(container.is_empty(), expected == 0, "{}", name);
    }
}

#[test]
fn test_spsc_order() {
    for (name, container) in every_container() {
        let producer = {
            let container = Arc::clone(&container);
            thread::spawn(move || {
                for i in 0..1000 {
                    container.push(i);
                }
            })
        };
        producer.join().unwrap();

        let consumer = {
            let container = Arc::clone(&container);
            thread::spawn(move || {
                let mut out = Vec::with_capacity(1000);
                while let Some(v) = container.try_pop() {
                    out.push(v);
                }
                out
            })
        };
        let popped = consumer.join().unwrap();

        let expected: Vec<u64> = match container.order() {
            Order::Fifo => (0..1000).collect(),
            Order::Lifo => (0..1000).rev().collect(),
        };
        assert_eq!(popped, expected, "{}", name);
    }
}

fn assert_peek_matches_pop<C>(name: &str, container: &C)
where
    C: PeekableContainer<Item = u64>,
{
    assert_eq!(container.try_peek(), None, "{}", name);
    for i in 0..100 {
        container.push(i);
    }

    let mut seen = 0;
    while let Some(head) = container.try_peek() {
        assert_eq!(container.try_pop(), Some(head), "{}", name);
        seen += 1;
    }
    assert_eq!(seen, 100, "{}", name);
    assert!(container.is_empty(), "{}", name);
}

#[test]
fn test_try_peek_matches_next_pop() {
    assert_peek_matches_pop("linked_stack", &SyncStack::new());
    assert_peek_matches_pop("vec_stack", &SyncVecStack::new());
    assert_peek_matches_pop("linked_queue", &SyncQueue::new());
    assert_peek_matches_pop("two_stack_queue", &TwoStackQueue::new());
}

#[test]
fn test_try_peek_under_concurrent_pushes() {
    let queue = Arc::new(TwoStackQueue::new());
    let pusher = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            for i in 0..10_000u64 {
                queue.push(i);
            }
        })
    };

    // With no pops, the head stays the first value pushed.
    let mut last = None;
    while last != Some(0) || !pusher.is_finished() {
        if let Some(head) = PeekableContainer::try_peek(&*queue) {
            assert_eq!(head, 0);
            last = Some(head);
        }
    }
    pusher.join().unwrap();
    assert_eq!(queue.len(), 10_000);
}

#[test]
fn test_two_stack_sequences() {
    let queue = TwoStackQueue::new();
    for i in 1..=5 {
        queue.enqueue(i);
    }
    let out: Vec<_> = std::iter::from_fn(|| queue.try_dequeue()).collect();
    assert_eq!(out, vec![1, 2, 3, 4, 5]);

    queue.enqueue(1);
    queue.enqueue(2);
    assert_eq!(queue.try_dequeue(), Some(1));
    queue.enqueue(3);
    assert_eq!(queue.try_dequeue(), Some(2));
    assert_eq!(queue.try_dequeue(), Some(3));
    assert_eq!(queue.try_dequeue(), None);
}

#[test]
fn test_blocking_pop_wakes_on_push() {
    for (name, container) in every_container() {
        let consumer = {
            let container = Arc::clone(&container);
            thread::spawn(move || {
                let value = container.pop();
                (value, Instant::now())
            })
        };

        thread::sleep(Duration::from_millis(50));
        let pushed_at = Instant::now();
        container.push(42);

        let (value, woke_at) = consumer.join().unwrap();
        assert_eq!(value, Ok(42), "{}", name);
        assert!(
            woke_at.duration_since(pushed_at) < Duration::from_secs(1),
            "{} woke too late",
            name
        );
    }
}

#[test]
fn test_try_pop_on_empty_returns_immediately() {
    for (name, container) in every_container() {
        let start = Instant::now();
        assert_eq!(container.try_pop(), None, "{}", name);
        assert!(start.elapsed() < Duration::from_millis(10), "{}", name);
    }
}

#[test]
fn test_pop_timeout_expires() {
    for (name, container) in every_container() {
        let start = Instant::now();
        assert_eq!(container.pop_timeout(Duration::from_millis(50)), None, "{}", name);
        let waited = start.elapsed();
        assert!(waited >= Duration::from_millis(50), "{} returned early", name);
        assert!(waited < Duration::from_secs(1), "{} overslept", name);
    }
}

#[test]
fn test_pop_timeout_gets_late_value() {
    for (name, container) in every_container() {
        let consumer = {
            let container = Arc::clone(&container);
            thread::spawn(move || container.pop_timeout(Duration::from_secs(5)))
        };
        thread::sleep(Duration::from_millis(20));
        container.push(9);
        assert_eq!(consumer.join().unwrap(), Some(9), "{}", name);
    }
}

#[test]
fn test_load_four_by_four() {
    const PRODUCERS: u64 = 4;
    const CONSUMERS: u64 = 4;
    const PER_PRODUCER: u64 = 25_000;
    const TOTAL: u64 = PRODUCERS * PER_PRODUCER;

    for (name, container) in every_container() {
        let barrier = Arc::new(Barrier::new((PRODUCERS + CONSUMERS) as usize));
        let consumed = Arc::new(AtomicU64::new(0));

        let producers: Vec<_> = (0..PRODUCERS)
            .map(|p| {
                let container = Arc::clone(&container);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    for i in 0..PER_PRODUCER {
                        container.push(p * PER_PRODUCER + i);
                    }
                })
            })
            .collect();

        let consumers: Vec<_> = (0..CONSUMERS)
            .map(|_| {
                let container = Arc::clone(&container);
                let barrier = Arc::clone(&barrier);
                let consumed = Arc::clone(&consumed);
                thread::spawn(move || {
                    barrier.wait();
                    let mut seen = Vec::new();
                    while let Ok(value) = container.pop() {
                        seen.push(value);
                        if consumed.fetch_add(1, Ordering::AcqRel) + 1 == TOTAL {
                            container.close();
                        }
                    }
                    seen
                })
            })
            .collect();

        for handle in producers {
            handle.join().unwrap();
        }

        let mut all = HashSet::with_capacity(TOTAL as usize);
        for handle in consumers {
            for value in handle.join().unwrap() {
                assert!(all.insert(value), "{} handed out {} twice", name, value);
            }
        }

        assert_eq!(all.len() as u64, TOTAL, "{}", name);
        assert_eq!(consumed.load(Ordering::Acquire), TOTAL, "{}", name);
        assert!(container.is_empty(), "{}", name);
    }
}

#[test]
fn test_close_releases_every_waiter() {
    for (name, container) in every_container() {
        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let container = Arc::clone(&container);
                thread::spawn(move || container.pop())
            })
            .collect();

        thread::sleep(Duration::from_millis(30));
        container.close();
        assert!(container.is_closed(), "{}", name);

        for waiter in waiters {
            assert_eq!(waiter.join().unwrap(), Err(Closed), "{}", name);
        }
    }
}

#[test]
fn test_opposite_assignments_finish() {
    let a = Arc::new(SyncVecStack::new());
    let b = Arc::new(SyncVecStack::new());
    for i in 0..100u64 {
        a.push(i);
        b.push(i + 1000);
    }

    let (tx, rx) = std::sync::mpsc::channel();
    for forward in [true, false] {
        let a = Arc::clone(&a);
        let b = Arc::clone(&b);
        let tx = tx.clone();
        thread::spawn(move || {
            for _ in 0..1_000 {
                if forward {
                    a.assign_from(&b);
                } else {
                    b.assign_from(&a);
                }
            }
            let _ = tx.send(());
        });
    }
    drop(tx);

    // A lock-order deadlock would hang here; fail instead.
    for _ in 0..2 {
        rx.recv_timeout(Duration::from_secs(30))
            .expect("assignments deadlocked");
    }
    assert_eq!(a.len(), 100);
    assert_eq!(b.len(), 100);
}

#[test]
fn test_two_stack_concurrent_dequeuers_keep_producer_order() {
    let queue = Arc::new(TwoStackQueue::new());
    const PER_PRODUCER: u64 = 5_000;

    let producers: Vec<_> = (0..2u64)
        .map(|p| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for i in 0..PER_PRODUCER {
                    queue.enqueue((p, i));
                }
            })
        })
        .collect();

    // Each dequeuer sees a subsequence of the global FIFO order, so values
    // from one producer must arrive increasing.
    let consumers: Vec<_> = (0..3)
        .map(|_| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                let mut last = [None::<u64>; 2];
                let mut taken = 0u64;
                while let Some((p, i)) = queue.dequeue_timeout(Duration::from_millis(200)) {
                    let slot = &mut last[p as usize];
                    assert!(slot.map_or(true, |prev| i > prev));
                    *slot = Some(i);
                    taken += 1;
                }
                taken
            })
        })
        .collect();

    for handle in producers {
        handle.join().unwrap();
    }
    let taken: u64 = consumers.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(taken, 2 * PER_PRODUCER);
    assert!(queue.transferred() <= 2 * PER_PRODUCER);
}
