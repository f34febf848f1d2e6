//! Property results and the checker trait.

use crate::counterexample::Counterexample;

/// Outcome of checking one named invariant.
#[derive(Debug, Clone)]
pub struct PropertyResult {
    /// Invariant name (e.g., "NoLostElements")
    pub name: &'static str,
    /// Whether the invariant held
    pub holds: bool,
    /// Violation message if it did not hold
    pub violation: Option<String>,
    /// Failure path, when one could be reconstructed
    pub counterexample: Option<Counterexample>,
}

impl PropertyResult {
    /// The invariant held.
    #[must_use]
    pub fn pass(name: &'static str) -> Self {
        Self {
            name,
            holds: true,
            violation: None,
            counterexample: None,
        }
    }

    /// The invariant was violated.
    #[must_use]
    pub fn fail(
        name: &'static str,
        violation: impl Into<String>,
        counterexample: Option<Counterexample>,
    ) -> Self {
        Self {
            name,
            holds: false,
            violation: Some(violation.into()),
            counterexample,
        }
    }

    /// One-line summary.
    #[must_use]
    pub fn format(&self) -> String {
        match &self.violation {
            None => format!("[PASS] {}", self.name),
            Some(msg) => format!("[FAIL] {}: {}", self.name, msg),
        }
    }
}

/// Something that can check a set of invariants.
pub trait PropertyChecker {
    /// Check every invariant, in a fixed order.
    fn check_all(&self) -> Vec<PropertyResult>;

    /// Whether every invariant holds.
    fn all_hold(&self) -> bool {
        self.check_all().iter().all(|r| r.holds)
    }

    /// Only the violated invariants.
    fn failures(&self) -> Vec<PropertyResult> {
        self.check_all().into_iter().filter(|r| !r.holds).collect()
    }
}
