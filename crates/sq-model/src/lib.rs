//! # sq-model
//!
//! Stateright model of the two-stack queue's dequeue protocol.
//!
//! The model checks that a dequeue whose emptiness check, transfer and pop
//! form one step keeps FIFO order under any interleaving, and finds the
//! reordering once those parts are allowed to interleave.
//!
//! ## Usage
//!
//! ```ignore
//! use sq_model::{check_two_stack, DequeueMode};
//!
//! let report = check_two_stack(DequeueMode::Split, 2, 3);
//! assert!(!report.fifo_holds);
//! println!("{}", report.format());
//! ```

pub mod two_stack;

pub use two_stack::{ConsumerPc, DequeueMode, TwoStackAction, TwoStackModel, TwoStackState};

use stateright::{Checker, Model};

/// Outcome of exhaustively checking one configuration.
#[derive(Debug, Clone)]
pub struct ModelReport {
    pub mode: DequeueMode,
    pub consumers: usize,
    pub values: u8,
    pub unique_states: usize,
    pub fifo_holds: bool,
    pub conserved: bool,
    /// Actions leading to the first FIFO violation, if any
    pub fifo_counterexample: Vec<TwoStackAction>,
}

impl ModelReport {
    pub fn format(&self) -> String {
        let status = if self.fifo_holds && self.conserved {
            "PASS"
        } else {
            "FAIL"
        };
        let mut out = format!(
            "[{}] {:?} consumers={} values={} states={}",
            status, self.mode, self.consumers, self.values, self.unique_states
        );
        if !self.fifo_counterexample.is_empty() {
            out.push_str("\n  fifo violated by:");
            for (step, action) in self.fifo_counterexample.iter().enumerate() {
                out.push_str(&format!("\n  {:4} | {:?}", step + 1, action));
            }
        }
        out
    }
}

/// Run a breadth-first check of the two-stack model.
pub fn check_two_stack(mode: DequeueMode, consumers: usize, values: u8) -> ModelReport {
    let checker = TwoStackModel::new(mode, consumers, values)
        .checker()
        .spawn_bfs()
        .join();

    let fifo = checker.discovery("fifo");
    ModelReport {
        mode,
        consumers,
        values,
        unique_states: checker.unique_state_count(),
        fifo_holds: fifo.is_none(),
        conserved: checker.discovery("conserved").is_none(),
        fifo_counterexample: fifo.map(|path| path.into_actions()).unwrap_or_default(),
    }
}
