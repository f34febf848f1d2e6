//! Producer/consumer workload.
//!
//! ```text
//!   producer 0 ─┐                    ┌─► consumer 0
//!   producer 1 ─┼──► container ──────┼─► consumer 1
//!   producer N ─┘                    └─► consumer M
//!                                         │
//!                          consumed == items ──► close()
//! ```
//!
//! Spin runs measure the lock-only tier: producers push without signalling
//! and consumers poll `try_pop` until the shared consumed counter reaches
//! the item count. Blocking consumers park in `pop`; whichever
//! consumer takes the last item closes the container so the others wake
//! with `Closed`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use sq_core::ConcurrentContainer;

use crate::config::{BenchConfig, Strategy};
use crate::error::BenchError;

/// Timing and counts from one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchResult {
    pub benchmark: String,
    pub producers: usize,
    pub consumers: usize,
    pub items: u64,
    pub strategy: Strategy,
    pub duration_ms: u64,
    pub ops_per_sec: f64,
}

impl BenchResult {
    /// One row matching [`CSV_HEADER`](crate::report::CSV_HEADER).
    #[must_use]
    pub fn csv_row(&self) -> String {
        format!(
            "{},{},{},{},{}",
            self.benchmark, self.producers, self.consumers, self.items, self.duration_ms
        )
    }

    pub fn format(&self) -> String {
        format!(
            "{}: {} producers, {} consumers, {} items total - {} ms",
            self.benchmark, self.producers, self.consumers, self.items, self.duration_ms
        )
    }
}

fn producer_loop<C>(container: &C, strategy: Strategy, first_value: u64, count: u64)
where
    C: ConcurrentContainer<Item = u64>,
{
    let values = first_value..first_value + count;
    match strategy {
        // Nobody parks, so skip the wakeup.
        Strategy::Spin => values.for_each(|value| container.push_quiet(value)),
        Strategy::Blocking => values.for_each(|value| container.push(value)),
    }
}

fn spin_consumer<C>(container: &C, consumed: &AtomicU64, items: u64)
where
    C: ConcurrentContainer<Item = u64>,
{
    while consumed.load(Ordering::Acquire) < items {
        match container.try_pop() {
            Some(_) => {
                consumed.fetch_add(1, Ordering::AcqRel);
            }
            None => thread::yield_now(),
        }
    }
}

fn blocking_consumer<C>(container: &C, consumed: &AtomicU64, items: u64)
where
    C: ConcurrentContainer<Item = u64>,
{
    while consumed.load(Ordering::Acquire) < items {
        match container.pop() {
            Ok(_) => {
                if consumed.fetch_add(1, Ordering::AcqRel) + 1 == items {
                    container.close();
                }
            }
            Err(_) => break,
        }
    }
}

/// Run one producer/consumer workload against `container`.
///
/// The container must be open and empty. A blocking run closes it at the
/// end, so build a fresh container per run.
pub fn run_benchmark<C>(
    name: &str,
    container: &C,
    config: &BenchConfig,
) -> Result<BenchResult, BenchError>
where
    C: ConcurrentContainer<Item = u64>,
{
    config.validate()?;
    if container.is_closed() {
        return Err(BenchError::ContainerClosed);
    }
    let held = container.len();
    if held != 0 {
        return Err(BenchError::ContainerNotEmpty(held));
    }

    let consumed = AtomicU64::new(0);
    let items = config.items;
    tracing::debug!(
        benchmark = name,
        producers = config.producers,
        consumers = config.consumers,
        items,
        strategy = config.strategy.as_str(),
        "starting run"
    );

    let start = Instant::now();
    let all_joined = thread::scope(|scope| {
        let mut handles = Vec::with_capacity(config.producers + config.consumers);

        let mut next_value = 0;
        for p in 0..config.producers {
            let count = config.items_for_producer(p);
            let first = next_value;
            next_value += count;
            let strategy = config.strategy;
            handles.push(scope.spawn(move || producer_loop(container, strategy, first, count)));
        }

        let consumed = &consumed;
        for _ in 0..config.consumers {
            handles.push(match config.strategy {
                Strategy::Spin => scope.spawn(move || spin_consumer(container, consumed, items)),
                Strategy::Blocking => {
                    scope.spawn(move || blocking_consumer(container, consumed, items))
                }
            });
        }

        handles
            .into_iter()
            .map(|h| h.join().is_ok())
            .fold(true, |ok, joined| ok && joined)
    });
    let elapsed = start.elapsed();

    if !all_joined {
        return Err(BenchError::WorkerPanicked);
    }

    let popped = consumed.load(Ordering::Acquire);
    let left = container.len();
    if popped != items || left != 0 {
        return Err(BenchError::Incomplete {
            expected: items,
            popped,
            left,
        });
    }

    let result = BenchResult {
        benchmark: name.to_string(),
        producers: config.producers,
        consumers: config.consumers,
        items,
        strategy: config.strategy,
        duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        ops_per_sec: ops_per_sec(items, elapsed),
    };
    tracing::info!("{}", result.format());
    Ok(result)
}

fn ops_per_sec(items: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        items as f64 / secs
    } else {
        0.0
    }
}
