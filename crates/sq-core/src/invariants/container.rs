//! Container invariants.
//!
//! | Property | Description |
//! |----------|-------------|
//! | NoLostElements | Every pushed element is still held or was popped |
//! | NoDuplicates | No element is held twice, none popped that was not pushed |
//! | OrderPreserved | Pop results match a sequential LIFO/FIFO replay |
//! | SizeConsistent | Reported size equals pushes minus pops |

use std::collections::{HashSet, VecDeque};

use crate::container::Order;
use crate::counterexample::{Counterexample, StateSnapshot, ThreadAction};
use crate::property::{PropertyChecker, PropertyResult};

/// View of a container's state for invariant checking.
///
/// Elements are `u64` and assumed unique per push, which is how test
/// drivers generate them.
pub trait ContainerProperties {
    /// LIFO or FIFO.
    fn order(&self) -> Order;

    /// Every element that was successfully pushed.
    fn pushed_elements(&self) -> HashSet<u64>;

    /// Every element that was popped.
    fn popped_elements(&self) -> HashSet<u64>;

    /// Elements still held, in pop order (top first / front first).
    fn current_contents(&self) -> Vec<u64>;

    /// Size the container reports for itself.
    fn reported_len(&self) -> usize;

    /// Operations in the order they took effect.
    fn history(&self) -> ContainerHistory;
}

/// Linearized operation history.
#[derive(Debug, Clone, Default)]
pub struct ContainerHistory {
    /// Operations in linearization order
    pub operations: Vec<ContainerOperation>,
}

/// A single recorded operation.
#[derive(Debug, Clone)]
pub struct ContainerOperation {
    /// Thread that performed the operation
    pub thread_id: u64,
    /// Type of operation
    pub op_type: ContainerOpType,
    /// Pushed element, or the value a pop returned
    pub element: Option<u64>,
    /// Step number for ordering (1-based)
    pub step: u64,
}

/// Type of recorded operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerOpType {
    Push,
    Pop,
    PopEmpty,
}

impl ContainerHistory {
    /// Create a new empty history.
    #[must_use]
    pub fn new() -> Self {
        Self {
            operations: Vec::new(),
        }
    }

    /// Step number the next recorded operation will get.
    #[must_use]
    pub fn next_step(&self) -> u64 {
        self.operations.len() as u64 + 1
    }

    /// Record a push.
    pub fn record_push(&mut self, thread_id: u64, element: u64) {
        let step = self.next_step();
        self.operations.push(ContainerOperation {
            thread_id,
            op_type: ContainerOpType::Push,
            element: Some(element),
            step,
        });
    }

    /// Record a pop and what it returned.
    pub fn record_pop(&mut self, thread_id: u64, element: Option<u64>) {
        let step = self.next_step();
        self.operations.push(ContainerOperation {
            thread_id,
            op_type: if element.is_some() {
                ContainerOpType::Pop
            } else {
                ContainerOpType::PopEmpty
            },
            element,
            step,
        });
    }

    /// Convert into a counterexample trace.
    #[must_use]
    pub fn to_counterexample(&self, seed: Option<u64>) -> Counterexample {
        let mut ce = match seed {
            Some(seed) => Counterexample::with_seed(seed),
            None => Counterexample::new(),
        };
        for op in &self.operations {
            let action = match (op.op_type, op.element) {
                (ContainerOpType::Push, Some(e)) => format!("push({})", e),
                (ContainerOpType::Pop, Some(e)) => format!("pop() -> {}", e),
                _ => "pop()".to_string(),
            };
            ce.add_action(ThreadAction {
                thread_id: op.thread_id,
                step: op.step,
                action,
                success: op.op_type != ContainerOpType::PopEmpty,
            });
        }
        ce
    }
}

/// Sequential reference container used to replay a history.
struct Replay {
    order: Order,
    items: VecDeque<u64>,
}

impl Replay {
    fn new(order: Order) -> Self {
        Self {
            order,
            items: VecDeque::new(),
        }
    }

    fn push(&mut self, value: u64) {
        self.items.push_back(value);
    }

    fn pop(&mut self) -> Option<u64> {
        match self.order {
            Order::Lifo => self.items.pop_back(),
            Order::Fifo => self.items.pop_front(),
        }
    }
}

/// Property checker for containers.
pub struct ContainerPropertyChecker<'a, C: ContainerProperties> {
    container: &'a C,
    dst_seed: Option<u64>,
}

impl<'a, C: ContainerProperties> ContainerPropertyChecker<'a, C> {
    /// Create a new checker for the given container.
    #[must_use]
    pub fn new(container: &'a C) -> Self {
        Self {
            container,
            dst_seed: None,
        }
    }

    /// Set DST seed for counterexample reproduction.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        debug_assert!(seed != 0, "DST seed should not be zero");
        self.dst_seed = Some(seed);
        self
    }

    fn counterexample(&self) -> Counterexample {
        match self.dst_seed {
            Some(seed) => Counterexample::with_seed(seed),
            None => Counterexample::new(),
        }
    }

    /// Every pushed element is either still held or was popped.
    fn check_no_lost_elements(&self) -> PropertyResult {
        let pushed = self.container.pushed_elements();
        let popped = self.container.popped_elements();
        let contents: HashSet<u64> = self.container.current_contents().into_iter().collect();

        let mut lost: Vec<u64> = pushed
            .iter()
            .copied()
            .filter(|e| !contents.contains(e) && !popped.contains(e))
            .collect();

        if lost.is_empty() {
            return PropertyResult::pass("NoLostElements");
        }

        lost.sort_unstable();
        let mut ce = self.counterexample();
        ce.add_state(StateSnapshot {
            step: 1,
            description: format!("Elements {:?} lost", lost),
            variables: vec![
                ("pushed".to_string(), format!("{:?}", pushed)),
                ("popped".to_string(), format!("{:?}", popped)),
                ("contents".to_string(), format!("{:?}", contents)),
            ],
        });

        PropertyResult::fail(
            "NoLostElements",
            format!(
                "Element {} was pushed but is neither held nor popped",
                lost[0]
            ),
            Some(ce),
        )
    }

    /// Nothing is held twice, and nothing came out that never went in.
    fn check_no_duplicates(&self) -> PropertyResult {
        let contents = self.container.current_contents();
        let mut seen = HashSet::new();
        for element in &contents {
            if !seen.insert(*element) {
                return PropertyResult::fail(
                    "NoDuplicates",
                    format!("Element {} appears multiple times in container", element),
                    None,
                );
            }
        }

        let pushed = self.container.pushed_elements();
        if let Some(phantom) = self
            .container
            .popped_elements()
            .into_iter()
            .find(|e| !pushed.contains(e))
        {
            return PropertyResult::fail(
                "NoDuplicates",
                format!("Element {} was popped but never pushed", phantom),
                None,
            );
        }

        PropertyResult::pass("NoDuplicates")
    }

    /// Replay the history against a sequential container and compare
    /// every pop result, then compare what is left.
    fn check_order_preserved(&self) -> PropertyResult {
        let order = self.container.order();
        let history = self.container.history();
        let mut replay = Replay::new(order);

        for op in &history.operations {
            match op.op_type {
                ContainerOpType::Push => {
                    if let Some(e) = op.element {
                        replay.push(e);
                    }
                }
                ContainerOpType::Pop => {
                    let expected = replay.pop();
                    if expected != op.element {
                        let ce = history
                            .to_counterexample(self.dst_seed)
                            .with_description(format!("{} order violated", order));
                        return PropertyResult::fail(
                            "OrderPreserved",
                            format!(
                                "{} violated: pop returned {:?} but replay expected {:?} (step {})",
                                order, op.element, expected, op.step
                            ),
                            Some(ce),
                        );
                    }
                }
                ContainerOpType::PopEmpty => {
                    if !replay.items.is_empty() {
                        return PropertyResult::fail(
                            "OrderPreserved",
                            format!(
                                "pop returned nothing but replay holds {} elements (step {})",
                                replay.items.len(),
                                op.step
                            ),
                            Some(history.to_counterexample(self.dst_seed)),
                        );
                    }
                }
            }
        }

        if history.operations.is_empty() {
            return PropertyResult::pass("OrderPreserved");
        }

        let mut remaining = Vec::with_capacity(replay.items.len());
        while let Some(v) = replay.pop() {
            remaining.push(v);
        }
        let contents = self.container.current_contents();
        if remaining != contents {
            return PropertyResult::fail(
                "OrderPreserved",
                format!(
                    "held elements {:?} differ from replay {:?}",
                    contents, remaining
                ),
                None,
            );
        }

        PropertyResult::pass("OrderPreserved")
    }

    /// len == |pushed| - |popped| == |contents|.
    fn check_size_consistent(&self) -> PropertyResult {
        let pushed = self.container.pushed_elements().len();
        let popped = self.container.popped_elements().len();
        let reported = self.container.reported_len();
        let held = self.container.current_contents().len();

        let Some(expected) = pushed.checked_sub(popped) else {
            return PropertyResult::fail(
                "SizeConsistent",
                format!("popped {} elements but only {} were pushed", popped, pushed),
                None,
            );
        };

        if reported != expected || held != expected {
            return PropertyResult::fail(
                "SizeConsistent",
                format!(
                    "len()={} held={} but pushed-popped={}",
                    reported, held, expected
                ),
                None,
            );
        }

        PropertyResult::pass("SizeConsistent")
    }
}

impl<C: ContainerProperties> PropertyChecker for ContainerPropertyChecker<'_, C> {
    fn check_all(&self) -> Vec<PropertyResult> {
        vec![
            self.check_no_lost_elements(),
            self.check_no_duplicates(),
            self.check_order_preserved(),
            self.check_size_consistent(),
        ]
    }
}
