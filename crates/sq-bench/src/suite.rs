//! Every container kind × strategy × producer/consumer count.

use serde::{Deserialize, Serialize};
use sq_containers::{SyncQueue, SyncStack, SyncVecStack, TwoStackQueue};

use crate::config::{BenchConfig, Strategy};
use crate::error::BenchError;
use crate::lockfree::LockFreeQueue;
use crate::workload::{run_benchmark, BenchResult};

/// Container implementations the suite can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    LinkedStack,
    VecStack,
    LinkedQueue,
    TwoStackQueue,
    SegQueue,
}

impl ContainerKind {
    pub const ALL: [ContainerKind; 5] = [
        ContainerKind::LinkedStack,
        ContainerKind::VecStack,
        ContainerKind::LinkedQueue,
        ContainerKind::TwoStackQueue,
        ContainerKind::SegQueue,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ContainerKind::LinkedStack => "linked_stack",
            ContainerKind::VecStack => "vec_stack",
            ContainerKind::LinkedQueue => "linked_queue",
            ContainerKind::TwoStackQueue => "two_stack_queue",
            ContainerKind::SegQueue => "crossbeam::SegQueue",
        }
    }

    /// Build a fresh container of this kind and run one workload on it.
    pub fn run(self, config: &BenchConfig) -> Result<BenchResult, BenchError> {
        let name = format!("{} ({})", self.as_str(), config.strategy.as_str());
        match self {
            ContainerKind::LinkedStack => run_benchmark(&name, &SyncStack::new(), config),
            ContainerKind::VecStack => run_benchmark(&name, &SyncVecStack::new(), config),
            ContainerKind::LinkedQueue => run_benchmark(&name, &SyncQueue::new(), config),
            ContainerKind::TwoStackQueue => run_benchmark(&name, &TwoStackQueue::new(), config),
            ContainerKind::SegQueue => run_benchmark(&name, &LockFreeQueue::new(), config),
        }
    }
}

/// Cartesian product to run.
#[derive(Debug, Clone)]
pub struct SuiteConfig {
    pub producers: Vec<usize>,
    pub consumers: Vec<usize>,
    pub items: u64,
    pub strategies: Vec<Strategy>,
    pub kinds: Vec<ContainerKind>,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            producers: vec![1, 2, 4],
            consumers: vec![1, 2, 4],
            items: crate::config::ITEMS_DEFAULT,
            strategies: Strategy::ALL.to_vec(),
            kinds: ContainerKind::ALL.to_vec(),
        }
    }
}

impl SuiteConfig {
    /// Every run this suite performs, in order.
    pub fn runs(&self) -> impl Iterator<Item = (ContainerKind, BenchConfig)> + '_ {
        self.producers.iter().flat_map(move |&producers| {
            self.consumers.iter().flat_map(move |&consumers| {
                self.kinds.iter().flat_map(move |&kind| {
                    self.strategies.iter().map(move |&strategy| {
                        (
                            kind,
                            BenchConfig {
                                producers,
                                consumers,
                                items: self.items,
                                strategy,
                            },
                        )
                    })
                })
            })
        })
    }
}

/// Run the whole suite, stopping at the first failed run.
pub fn run_suite(suite: &SuiteConfig) -> Result<Vec<BenchResult>, BenchError> {
    let mut results = Vec::new();
    let mut last_shape = None;
    for (kind, config) in suite.runs() {
        let shape = (config.producers, config.consumers);
        if last_shape != Some(shape) {
            tracing::info!(
                producers = config.producers,
                consumers = config.consumers,
                "running configuration"
            );
            last_shape = Some(shape);
        }
        results.push(kind.run(&config)?);
    }
    Ok(results)
}
