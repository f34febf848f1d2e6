//! Two-stack queue state machine.
//!
//! One producer enqueues `1..=values` in order. `consumers` threads
//! dequeue. Each dequeue is modeled either as one atomic step (what the
//! locked implementation does) or split into its parts:
//!
//! ```text
//!   Check ──output non-empty──────────────────────────► Pop
//!     │                                                  ▲
//!     └──output empty──► TransferStep (one element) ─────┘
//!                           ▲        │ input empty
//!                           └────────┘
//! ```
//!
//! Any other thread, producer included, may run between the parts.
//!
//! # Properties
//!
//! 1. `fifo`: values are delivered in enqueue order
//! 2. `conserved`: every enqueued value is held exactly once or delivered
//!    exactly once
//! 3. `drains` (sometimes): every value can be delivered

use stateright::{Model, Property};

/// How much of a dequeue runs as one indivisible step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DequeueMode {
    /// Check, transfer and pop happen in one step.
    Atomic,
    /// Check, each single-element transfer, and the pop are separate steps.
    Split,
}

/// Where a consumer is inside a split dequeue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsumerPc {
    Idle,
    Transferring,
    Popping,
}

/// Global state: both stacks, the producer cursor, per-consumer program
/// counters and the delivery log.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TwoStackState {
    /// Input stack, top is the last element
    pub input: Vec<u8>,
    /// Output stack, top is the last element
    pub output: Vec<u8>,
    /// Next value the producer will enqueue
    pub next_value: u8,
    pub consumers: Vec<ConsumerPc>,
    /// Values in the order dequeues returned them
    pub delivered: Vec<u8>,
}

impl TwoStackState {
    fn holds_anything(&self) -> bool {
        !self.input.is_empty() || !self.output.is_empty()
    }
}

/// Model actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TwoStackAction {
    Enqueue,
    /// Atomic-mode dequeue by consumer `c`
    Dequeue(usize),
    /// Split mode: observe whether output is empty
    Check(usize),
    /// Split mode: move one element from input to output
    TransferStep(usize),
    /// Split mode: pop output
    Pop(usize),
}

/// The two-stack queue model.
#[derive(Debug, Clone)]
pub struct TwoStackModel {
    pub mode: DequeueMode,
    pub consumers: usize,
    pub values: u8,
}

impl TwoStackModel {
    #[must_use]
    pub fn new(mode: DequeueMode, consumers: usize, values: u8) -> Self {
        assert!(consumers > 0, "at least one consumer");
        Self {
            mode,
            consumers,
            values,
        }
    }
}

fn transfer_all(state: &mut TwoStackState) {
    while let Some(value) = state.input.pop() {
        state.output.push(value);
    }
}

impl Model for TwoStackModel {
    type State = TwoStackState;
    type Action = TwoStackAction;

    fn init_states(&self) -> Vec<Self::State> {
        vec![TwoStackState {
            input: Vec::new(),
            output: Vec::new(),
            next_value: 1,
            consumers: vec![ConsumerPc::Idle; self.consumers],
            delivered: Vec::new(),
        }]
    }

    fn actions(&self, state: &Self::State, actions: &mut Vec<Self::Action>) {
        if state.next_value <= self.values {
            actions.push(TwoStackAction::Enqueue);
        }

        for (c, pc) in state.consumers.iter().enumerate() {
            match (self.mode, pc) {
                (DequeueMode::Atomic, _) => {
                    if state.holds_anything() {
                        actions.push(TwoStackAction::Dequeue(c));
                    }
                }
                (DequeueMode::Split, ConsumerPc::Idle) => {
                    if state.holds_anything() {
                        actions.push(TwoStackAction::Check(c));
                    }
                }
                (DequeueMode::Split, ConsumerPc::Transferring) => {
                    actions.push(TwoStackAction::TransferStep(c));
                }
                (DequeueMode::Split, ConsumerPc::Popping) => {
                    actions.push(TwoStackAction::Pop(c));
                }
            }
        }
    }

    fn next_state(&self, last_state: &Self::State, action: Self::Action) -> Option<Self::State> {
        let mut state = last_state.clone();

        match action {
            TwoStackAction::Enqueue => {
                state.input.push(state.next_value);
                state.next_value += 1;
            }
            TwoStackAction::Dequeue(_) => {
                if state.output.is_empty() {
                    transfer_all(&mut state);
                }
                let value = state.output.pop()?;
                state.delivered.push(value);
            }
            TwoStackAction::Check(c) => {
                state.consumers[c] = if state.output.is_empty() {
                    ConsumerPc::Transferring
                } else {
                    ConsumerPc::Popping
                };
            }
            TwoStackAction::TransferStep(c) => match state.input.pop() {
                Some(value) => state.output.push(value),
                None => state.consumers[c] = ConsumerPc::Popping,
            },
            TwoStackAction::Pop(c) => {
                // Another consumer may have emptied output meanwhile; an
                // empty pop sends this one back to Check.
                if let Some(value) = state.output.pop() {
                    state.delivered.push(value);
                }
                state.consumers[c] = ConsumerPc::Idle;
            }
        }

        Some(state)
    }

    fn properties(&self) -> Vec<Property<Self>> {
        vec![
            Property::<Self>::always("fifo", |_, state| {
                state.delivered.windows(2).all(|w| w[0] < w[1])
            }),
            Property::<Self>::always("conserved", |_, state| {
                let mut seen: Vec<u8> = state
                    .input
                    .iter()
                    .chain(&state.output)
                    .chain(&state.delivered)
                    .copied()
                    .collect();
                seen.sort_unstable();
                seen.iter().copied().eq(1..state.next_value)
            }),
            Property::<Self>::sometimes("drains", |model, state| {
                state.delivered.len() == usize::from(model.values)
            }),
        ]
    }
}
