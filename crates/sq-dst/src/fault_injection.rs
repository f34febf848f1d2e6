//! Fault injection around container operations.
//!
//! DST injects faults at OPERATION BOUNDARIES, never inside a critical
//! section. The container's code is not instrumented; the runner decides,
//! from the seed, what happens before and after each call.
//!
//! Faults are simulated by the runner. An `AllocationFailure` abandons the
//! push before the container is called, so it models a caller whose node
//! allocation failed; it does not exercise the containers' own
//! allocate-before-link ordering (a failed `Box` allocation aborts the
//! process in Rust).
//!
//! # What DST Tests (vs Loom)
//!
//! | Concern | Tool | Level |
//! |---------|------|-------|
//! | Lost wakeups, lock races | Loom | Interleaving (exhaustive) |
//! | Failed node allocation (simulated) | DST | Before push |
//! | Thread death | DST | Before or after an operation |
//! | Slow threads | DST | Between operations |
//!
//! ```text
//!  FaultPoint (pre-op) ──> container.push()/try_pop() ──> FaultPoint (post-op)
//!        │                                                     │
//!  "allocation fails?"                           "caller dies before return?"
//! ```

use std::collections::HashSet;

use sq_core::invariants::{ContainerHistory, ContainerProperties, ContainerPropertyChecker};
use sq_core::{ConcurrentContainer, Order, PropertyChecker, PropertyResult};

use crate::fault::{FaultConfig, FaultInjector, FaultPoint, FaultType};
use crate::random::DeterministicRng;

/// Drives a container with seeded operations and boundary faults, and
/// keeps the bookkeeping the invariant checker needs.
pub struct DstRunner<C> {
    container: C,
    rng: DeterministicRng,
    fault_injector: FaultInjector,
    seed: u64,
    threads: u64,
    current_thread: u64,
    pushed: HashSet<u64>,
    popped: HashSet<u64>,
    history: ContainerHistory,
    operations_count: u64,
    abandoned_operations: u64,
    delays: u64,
}

impl<C: ConcurrentContainer<Item = u64>> DstRunner<C> {
    /// Runner with the default fault mix.
    pub fn new(container: C, seed: u64) -> Self {
        Self::with_config(container, seed, FaultConfig::default())
    }

    pub fn with_config(container: C, seed: u64, config: FaultConfig) -> Self {
        Self {
            container,
            rng: DeterministicRng::new(seed),
            fault_injector: FaultInjector::new(DeterministicRng::new(seed.wrapping_add(1)), config),
            seed,
            threads: 2,
            current_thread: 0,
            pushed: HashSet::new(),
            popped: HashSet::new(),
            history: ContainerHistory::new(),
            operations_count: 0,
            abandoned_operations: 0,
            delays: 0,
        }
    }

    /// Number of simulated threads operations are attributed to.
    #[must_use]
    pub fn with_threads(mut self, threads: u64) -> Self {
        assert!(threads > 0, "at least one simulated thread");
        self.threads = threads;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn container(&self) -> &C {
        &self.container
    }

    /// Push with faults at both boundaries.
    pub fn push(&mut self, value: u64) -> Result<(), FaultType> {
        self.pick_thread();

        if let Some(fault) = self.inject(FaultPoint::BeforeOperation, true) {
            if fault != FaultType::Delay {
                // The push never started.
                self.abandoned_operations += 1;
                return Err(fault);
            }
        }

        self.container.push(value);
        self.operations_count += 1;
        self.pushed.insert(value);
        self.history.record_push(self.current_thread, value);

        if let Some(FaultType::ThreadCrash) = self.inject(FaultPoint::AfterOperation, true) {
            // The value is in the container; only the caller is gone.
            self.abandoned_operations += 1;
            return Err(FaultType::ThreadCrash);
        }
        Ok(())
    }

    /// Non-blocking pop with faults at both boundaries.
    pub fn pop(&mut self) -> Result<Option<u64>, FaultType> {
        self.pick_thread();

        if let Some(FaultType::ThreadCrash) = self.inject(FaultPoint::BeforeOperation, false) {
            self.abandoned_operations += 1;
            return Err(FaultType::ThreadCrash);
        }

        let result = self.container.try_pop();
        self.operations_count += 1;
        if let Some(value) = result {
            self.popped.insert(value);
        }
        self.history.record_pop(self.current_thread, result);

        if let Some(FaultType::ThreadCrash) = self.inject(FaultPoint::AfterOperation, false) {
            // Popped, but the caller never used it.
            self.abandoned_operations += 1;
            return Err(FaultType::ThreadCrash);
        }
        Ok(result)
    }

    /// Execute one scripted operation.
    pub fn apply(&mut self, op: &DstOp) -> Result<(), FaultType> {
        match *op {
            DstOp::Push(value) => self.push(value),
            DstOp::Pop => self.pop().map(|_| ()),
        }
    }

    fn pick_thread(&mut self) {
        self.current_thread = self.rng.gen_range(0..self.threads);
    }

    fn inject(&mut self, point: FaultPoint, is_push: bool) -> Option<FaultType> {
        let fault = self.fault_injector.choose(point, is_push)?;
        tracing::debug!(seed = self.seed, ?point, ?fault, "fault injected");
        if fault == FaultType::Delay {
            self.delays += 1;
            std::thread::yield_now();
        }
        Some(fault)
    }

    pub fn stats(&self) -> DstStats {
        DstStats {
            seed: self.seed,
            operations_count: self.operations_count,
            faults_injected: self.fault_injector.injected(),
            abandoned_operations: self.abandoned_operations,
            delays: self.delays,
        }
    }

    /// Drain the container and freeze everything the checker needs.
    ///
    /// The reported length is sampled before draining; drained elements are
    /// the final contents, not pops.
    pub fn finish(self) -> DstOutcome {
        let stats = self.stats();
        let reported_len = self.container.len();
        let mut contents = Vec::with_capacity(reported_len);
        while let Some(value) = self.container.try_pop() {
            contents.push(value);
        }
        DstOutcome {
            order: self.container.order(),
            pushed: self.pushed,
            popped: self.popped,
            contents,
            reported_len,
            history: self.history,
            stats,
        }
    }
}

/// Frozen end state of a DST run.
#[derive(Debug, Clone)]
pub struct DstOutcome {
    pub order: Order,
    pub pushed: HashSet<u64>,
    pub popped: HashSet<u64>,
    /// Elements left at the end, in pop order
    pub contents: Vec<u64>,
    pub reported_len: usize,
    pub history: ContainerHistory,
    pub stats: DstStats,
}

impl DstOutcome {
    /// Check every container invariant, tagging failures with the seed.
    pub fn check(&self) -> Vec<PropertyResult> {
        ContainerPropertyChecker::new(self)
            .with_seed(self.stats.seed)
            .check_all()
    }
}

impl ContainerProperties for DstOutcome {
    fn order(&self) -> Order {
        self.order
    }

    fn pushed_elements(&self) -> HashSet<u64> {
        self.pushed.clone()
    }

    fn popped_elements(&self) -> HashSet<u64> {
        self.popped.clone()
    }

    fn current_contents(&self) -> Vec<u64> {
        self.contents.clone()
    }

    fn reported_len(&self) -> usize {
        self.reported_len
    }

    fn history(&self) -> ContainerHistory {
        self.history.clone()
    }
}

/// Statistics from a DST run.
#[derive(Debug, Clone)]
pub struct DstStats {
    pub seed: u64,
    pub operations_count: u64,
    pub faults_injected: u64,
    pub abandoned_operations: u64,
    pub delays: u64,
}

impl DstStats {
    pub fn format(&self) -> String {
        format!(
            "DST_SEED={} ops={} faults={} abandoned={} delays={}",
            self.seed,
            self.operations_count,
            self.faults_injected,
            self.abandoned_operations,
            self.delays
        )
    }
}

/// A scripted DST operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DstOp {
    Push(u64),
    Pop,
}

/// Random script of `count` operations with unique push values.
///
/// Roughly 60% pushes, so the container tends to grow and pops are rarely
/// empty.
pub fn random_ops(seed: u64, count: usize) -> Vec<DstOp> {
    let mut rng = DeterministicRng::new(seed);
    let mut next_value = 1;
    (0..count)
        .map(|_| {
            if rng.gen_range(0..10) < 6 {
                let value = next_value;
                next_value += 1;
                DstOp::Push(value)
            } else {
                DstOp::Pop
            }
        })
        .collect()
}

/// Result of [`run_dst_scenario`].
#[derive(Debug)]
pub struct DstResult {
    pub passed: bool,
    pub properties: Vec<PropertyResult>,
    pub stats: DstStats,
    pub fault_errors: Vec<String>,
}

impl DstResult {
    pub fn format(&self) -> String {
        let status = if self.passed { "PASS" } else { "FAIL" };
        let mut result = format!("[{}] {}", status, self.stats.format());

        for property in self.properties.iter().filter(|p| !p.holds) {
            result.push_str("\n  VIOLATION: ");
            result.push_str(&property.format());
            if let Some(ce) = &property.counterexample {
                result.push('\n');
                result.push_str(&ce.render_diagram());
            }
        }

        result
    }
}

/// Run a scripted scenario against `container` and check every invariant
/// at the end.
pub fn run_dst_scenario<C>(container: C, seed: u64, operations: &[DstOp]) -> DstResult
where
    C: ConcurrentContainer<Item = u64>,
{
    run_dst_scenario_with(container, seed, FaultConfig::default(), operations)
}

pub fn run_dst_scenario_with<C>(
    container: C,
    seed: u64,
    config: FaultConfig,
    operations: &[DstOp],
) -> DstResult
where
    C: ConcurrentContainer<Item = u64>,
{
    let mut runner = DstRunner::with_config(container, seed, config);
    let mut errors = Vec::new();

    for op in operations {
        // Faults are part of the test; keep going.
        if let Err(fault) = runner.apply(op) {
            errors.push(format!("{:?}", fault));
        }
    }

    let outcome = runner.finish();
    let properties = outcome.check();
    let passed = properties.iter().all(|p| p.holds);
    if !passed {
        tracing::warn!(seed, "DST scenario violated an invariant");
    }

    DstResult {
        passed,
        properties,
        stats: outcome.stats,
        fault_errors: errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sq_core::Closed;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    // Minimal container for testing the runner itself
    struct MockQueue {
        values: Mutex<VecDeque<u64>>,
        lose_every: Option<usize>,
        push_calls: AtomicU64,
    }

    impl MockQueue {
        fn new() -> Self {
            Self {
                values: Mutex::new(VecDeque::new()),
                lose_every: None,
                push_calls: AtomicU64::new(0),
            }
        }

        fn lossy(n: usize) -> Self {
            Self {
                lose_every: Some(n),
                ..Self::new()
            }
        }
    }

    impl ConcurrentContainer for MockQueue {
        type Item = u64;

        fn order(&self) -> Order {
            Order::Fifo
        }

        fn push(&self, value: u64) {
            self.push_calls.fetch_add(1, Ordering::Relaxed);
            let mut values = self.values.lock().unwrap();
            if self.lose_every.is_some_and(|n| value as usize % n == 0) {
                return;
            }
            values.push_back(value);
        }

        fn try_pop(&self) -> Option<u64> {
            self.values.lock().unwrap().pop_front()
        }

        fn pop(&self) -> Result<u64, Closed> {
            self.try_pop().ok_or(Closed)
        }

        fn pop_timeout(&self, _timeout: Duration) -> Option<u64> {
            self.try_pop()
        }

        fn is_empty(&self) -> bool {
            self.values.lock().unwrap().is_empty()
        }

        fn len(&self) -> usize {
            self.values.lock().unwrap().len()
        }

        fn close(&self) {}

        fn is_closed(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_dst_runner_basic() {
        let mut runner = DstRunner::new(MockQueue::new(), 12345);

        // These might fail due to fault injection, and that's OK
        let _ = runner.push(1);
        let _ = runner.push(2);
        let _ = runner.pop();

        let outcome = runner.finish();
        assert!(outcome.check().iter().all(|p| p.holds));
    }

    #[test]
    fn test_dst_scenario() {
        let ops = [
            DstOp::Push(100),
            DstOp::Push(200),
            DstOp::Pop,
            DstOp::Push(300),
        ];

        let result = run_dst_scenario(MockQueue::new(), 12345, &ops);
        assert!(result.passed, "DST failed: {}", result.format());
    }

    #[test]
    fn test_random_scenario_aggressive() {
        let ops = random_ops(777, 500);
        let result =
            run_dst_scenario_with(MockQueue::new(), 777, FaultConfig::aggressive(), &ops);
        assert!(result.passed, "DST failed: {}", result.format());
        assert!(result.stats.faults_injected > 0);
    }

    #[test]
    fn test_allocation_failure_never_reaches_container() {
        let config = FaultConfig {
            fault_probability: 1.0,
            allocation_failures: true,
            thread_crashes: false,
            delays: false,
        };
        let mut runner = DstRunner::with_config(MockQueue::new(), 9, config);
        assert_eq!(runner.push(1), Err(FaultType::AllocationFailure));
        assert_eq!(runner.container().push_calls.load(Ordering::Relaxed), 0);
        assert!(runner.container().is_empty());

        let outcome = runner.finish();
        assert!(outcome.pushed.is_empty());
        assert_eq!(outcome.stats.operations_count, 0);
        assert_eq!(outcome.stats.abandoned_operations, 1);
        assert!(outcome.check().iter().all(|p| p.holds));
    }

    #[test]
    fn test_lost_element_caught() {
        let ops: Vec<_> = (1..=10).map(DstOp::Push).collect();
        let result = run_dst_scenario_with(MockQueue::lossy(5), 4242, FaultConfig::none(), &ops);
        assert!(!result.passed);
        assert!(result.format().contains("NoLostElements"));
        assert!(result.format().contains("DST_SEED=4242"));
    }

    #[test]
    fn test_determinism() {
        let ops = random_ops(42, 200);
        let result1 = run_dst_scenario(MockQueue::new(), 42, &ops);
        let result2 = run_dst_scenario(MockQueue::new(), 42, &ops);

        // Same seed = same faults = same stats
        assert_eq!(result1.stats.faults_injected, result2.stats.faults_injected);
        assert_eq!(result1.fault_errors, result2.fault_errors);
    }
}
