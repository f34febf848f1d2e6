//! Benchmark errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("invalid benchmark config: {0}")]
    InvalidConfig(String),

    #[error("container was closed before the run started")]
    ContainerClosed,

    #[error("container must start empty, holds {0} items")]
    ContainerNotEmpty(usize),

    #[error("run finished with {popped} of {expected} items consumed ({left} left behind)")]
    Incomplete {
        expected: u64,
        popped: u64,
        left: usize,
    },

    #[error("a benchmark worker panicked")]
    WorkerPanicked,

    #[error("failed to write results: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize results: {0}")]
    Json(#[from] serde_json::Error),
}
