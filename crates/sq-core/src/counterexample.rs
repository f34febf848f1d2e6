//! Counterexample representation and rendering.
//!
//! When an invariant check fails, a counterexample shows the sequence of
//! container operations (and the container state around them) that led to
//! the failure, plus the DST seed needed to replay it.

use std::fmt::Write as _;

/// A failure path: operations per thread and state snapshots per step.
#[derive(Debug, Clone, Default)]
pub struct Counterexample {
    /// Sequence of state snapshots
    pub states: Vec<StateSnapshot>,
    /// Operations in the order they took effect
    pub interleaving: Vec<ThreadAction>,
    /// DST seed for reproduction (if applicable)
    pub dst_seed: Option<u64>,
    /// Human-readable description of the failure
    pub description: Option<String>,
}

/// Snapshot of container state at one step.
#[derive(Debug, Clone)]
pub struct StateSnapshot {
    /// Step number in the execution
    pub step: u64,
    /// Short description (e.g., "contents=[3, 1]")
    pub description: String,
    /// Named values at this point
    pub variables: Vec<(String, String)>,
}

/// One container operation performed by a thread.
#[derive(Debug, Clone)]
pub struct ThreadAction {
    /// Thread identifier
    pub thread_id: u64,
    /// Step number when the operation took effect
    pub step: u64,
    /// Operation text, e.g. "push(4)" or "pop() -> 2"
    pub action: String,
    /// Whether the operation produced a value / succeeded
    pub success: bool,
}

impl Counterexample {
    /// Create a new empty counterexample.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a counterexample carrying a DST seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        debug_assert!(seed != 0, "DST seed should not be zero");
        Self {
            dst_seed: Some(seed),
            ..Self::default()
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a state snapshot. Steps must be strictly increasing.
    pub fn add_state(&mut self, state: StateSnapshot) {
        debug_assert!(
            self.states.last().map_or(true, |last| state.step > last.step),
            "States must be added in order"
        );
        self.states.push(state);
    }

    /// Add a thread action.
    pub fn add_action(&mut self, action: ThreadAction) {
        self.interleaving.push(action);
    }

    /// Render as a thread diagram.
    ///
    /// ```text
    /// DST_SEED=12345
    ///
    /// Step | Thread 0 | Thread 1 | State
    /// -----|----------|----------|------
    ///    1 | push(1) |          | contents=[1]
    ///    2 |          | pop() -> 1 | contents=[]
    /// ```
    #[must_use]
    pub fn render_diagram(&self) -> String {
        let mut output = String::new();

        if let Some(seed) = self.dst_seed {
            let _ = write!(output, "DST_SEED={}\n\n", seed);
        }

        if let Some(ref desc) = self.description {
            let _ = write!(output, "Failure: {}\n\n", desc);
        }

        let mut threads: Vec<u64> = self.interleaving.iter().map(|a| a.thread_id).collect();
        threads.sort_unstable();
        threads.dedup();

        if threads.is_empty() {
            output.push_str("(no thread actions recorded)\n");
            for state in &self.states {
                let _ = writeln!(output, "{:4} | {}", state.step, state.description);
            }
            return output;
        }

        output.push_str("Step |");
        for tid in &threads {
            let _ = write!(output, " Thread {} |", tid);
        }
        output.push_str(" State\n");

        output.push_str("-----|");
        for _ in &threads {
            output.push_str("----------|");
        }
        output.push_str("------\n");

        let max_step = self.interleaving.iter().map(|a| a.step).max().unwrap_or(0);

        for step in 1..=max_step {
            let _ = write!(output, "{:4} |", step);

            for tid in &threads {
                let action = self
                    .interleaving
                    .iter()
                    .find(|a| a.step == step && a.thread_id == *tid);

                match action {
                    Some(a) => {
                        let status = if a.success { "" } else { " [EMPTY]" };
                        let _ = write!(output, " {}{} |", a.action, status);
                    }
                    None => output.push_str("          |"),
                }
            }

            if let Some(state) = self.states.iter().find(|s| s.step == step) {
                let _ = write!(output, " {}", state.description);
            }

            output.push('\n');
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counterexample_creation() {
        let ce = Counterexample::new();
        assert!(ce.states.is_empty());
        assert!(ce.interleaving.is_empty());
        assert!(ce.dst_seed.is_none());
    }

    #[test]
    fn test_counterexample_with_seed() {
        let ce = Counterexample::with_seed(12345).with_description("element 3 lost");
        assert_eq!(ce.dst_seed, Some(12345));
        assert_eq!(ce.description.as_deref(), Some("element 3 lost"));
    }

    #[test]
    fn test_render_diagram() {
        let mut ce = Counterexample::with_seed(42);

        ce.add_action(ThreadAction {
            thread_id: 0,
            step: 1,
            action: "push(1)".to_string(),
            success: true,
        });
        ce.add_action(ThreadAction {
            thread_id: 1,
            step: 2,
            action: "pop()".to_string(),
            success: false,
        });
        ce.add_state(StateSnapshot {
            step: 1,
            description: "contents=[1]".to_string(),
            variables: vec![],
        });

        let diagram = ce.render_diagram();
        assert!(diagram.contains("DST_SEED=42"));
        assert!(diagram.contains("Thread 0"));
        assert!(diagram.contains("push(1)"));
        assert!(diagram.contains("pop() [EMPTY]"));
        assert!(diagram.contains("contents=[1]"));
    }

    #[test]
    fn test_render_without_actions_lists_states() {
        let mut ce = Counterexample::new();
        ce.add_state(StateSnapshot {
            step: 3,
            description: "len=2 contents=[1]".to_string(),
            variables: vec![],
        });

        let diagram = ce.render_diagram();
        assert!(diagram.contains("(no thread actions recorded)"));
        assert!(diagram.contains("len=2 contents=[1]"));
    }
}
