//! Fault selection.
//!
//! Faults are injected at operation boundaries only. Which fault (if any)
//! fires at a boundary is drawn from a [`DeterministicRng`].

use crate::random::DeterministicRng;

/// Where a fault is injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultPoint {
    /// Before an operation starts; the container is not touched.
    BeforeOperation,
    /// After an operation took effect, before the caller sees the result.
    AfterOperation,
}

/// Kinds of injected faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultType {
    /// The node for a push could not be allocated. Only fires before a
    /// push; the runner abandons the push without calling the container.
    AllocationFailure,
    /// The calling thread dies. Before an operation it never happens;
    /// after one, its effect stays but the result is lost.
    ThreadCrash,
    /// The calling thread is descheduled for a moment.
    Delay,
}

/// Fault probabilities.
#[derive(Debug, Clone)]
pub struct FaultConfig {
    /// Probability that any fault fires at a boundary
    pub fault_probability: f64,
    /// Allow `AllocationFailure`
    pub allocation_failures: bool,
    /// Allow `ThreadCrash`
    pub thread_crashes: bool,
    /// Allow `Delay`
    pub delays: bool,
}

impl Default for FaultConfig {
    fn default() -> Self {
        Self {
            fault_probability: 0.05,
            allocation_failures: true,
            thread_crashes: true,
            delays: true,
        }
    }
}

impl FaultConfig {
    /// No faults at all.
    #[must_use]
    pub fn none() -> Self {
        Self {
            fault_probability: 0.0,
            ..Self::default()
        }
    }

    /// Faults at nearly a third of all boundaries.
    #[must_use]
    pub fn aggressive() -> Self {
        Self {
            fault_probability: 0.3,
            ..Self::default()
        }
    }
}

/// Draws faults according to a [`FaultConfig`].
#[derive(Debug, Clone)]
pub struct FaultInjector {
    rng: DeterministicRng,
    config: FaultConfig,
    injected: u64,
}

impl FaultInjector {
    #[must_use]
    pub fn new(rng: DeterministicRng, config: FaultConfig) -> Self {
        Self {
            rng,
            config,
            injected: 0,
        }
    }

    /// Whether a fault fires at the next boundary.
    pub fn should_fail(&mut self) -> bool {
        self.config.fault_probability > 0.0 && self.rng.gen_bool(self.config.fault_probability)
    }

    /// Pick the fault (if any) for this boundary.
    ///
    /// `is_push` gates `AllocationFailure`, which is only meaningful before
    /// a push.
    pub fn choose(&mut self, point: FaultPoint, is_push: bool) -> Option<FaultType> {
        if !self.should_fail() {
            return None;
        }

        let mut candidates = Vec::with_capacity(3);
        if self.config.allocation_failures && is_push && point == FaultPoint::BeforeOperation {
            candidates.push(FaultType::AllocationFailure);
        }
        if self.config.thread_crashes {
            candidates.push(FaultType::ThreadCrash);
        }
        if self.config.delays {
            candidates.push(FaultType::Delay);
        }
        if candidates.is_empty() {
            return None;
        }

        let fault = candidates[self.rng.gen_range(0..candidates.len())];
        self.injected += 1;
        Some(fault)
    }

    /// Faults injected so far.
    #[must_use]
    pub fn injected(&self) -> u64 {
        self.injected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_never_fires() {
        let mut injector = FaultInjector::new(DeterministicRng::new(3), FaultConfig::none());
        for _ in 0..1000 {
            assert_eq!(injector.choose(FaultPoint::BeforeOperation, true), None);
        }
        assert_eq!(injector.injected(), 0);
    }

    #[test]
    fn test_allocation_failure_only_before_push() {
        let config = FaultConfig {
            fault_probability: 1.0,
            allocation_failures: true,
            thread_crashes: false,
            delays: false,
        };
        let mut injector = FaultInjector::new(DeterministicRng::new(5), config);
        assert_eq!(
            injector.choose(FaultPoint::BeforeOperation, true),
            Some(FaultType::AllocationFailure)
        );
        assert_eq!(injector.choose(FaultPoint::BeforeOperation, false), None);
        assert_eq!(injector.choose(FaultPoint::AfterOperation, true), None);
    }

    #[test]
    fn test_aggressive_fires() {
        let mut injector =
            FaultInjector::new(DeterministicRng::new(11), FaultConfig::aggressive());
        let fired = (0..1000)
            .filter(|_| injector.choose(FaultPoint::AfterOperation, false).is_some())
            .count();
        assert!(fired > 100, "only {} faults in 1000 boundaries", fired);
    }
}
