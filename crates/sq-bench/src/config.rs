//! Benchmark configuration.

use serde::{Deserialize, Serialize};

use crate::error::BenchError;

/// Maximum producer or consumer threads per run.
pub const THREADS_MAX: usize = 64;

/// Maximum items moved through one run.
pub const ITEMS_MAX: u64 = 100_000_000;

/// Default items per run.
pub const ITEMS_DEFAULT: u64 = 100_000;

/// How consumers wait for work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Quiet pushes; `try_pop` in a loop, yielding on empty.
    Spin,
    /// Park in `pop` until a value arrives or the container closes.
    Blocking,
}

impl Strategy {
    pub const ALL: [Strategy; 2] = [Strategy::Spin, Strategy::Blocking];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Spin => "spin",
            Strategy::Blocking => "blocking",
        }
    }
}

/// One producer/consumer run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchConfig {
    pub producers: usize,
    pub consumers: usize,
    /// Total items pushed across all producers
    pub items: u64,
    pub strategy: Strategy,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            producers: 4,
            consumers: 4,
            items: ITEMS_DEFAULT,
            strategy: Strategy::Blocking,
        }
    }
}

impl BenchConfig {
    /// Small run for smoke tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            producers: 2,
            consumers: 2,
            items: 10_000,
            ..Self::default()
        }
    }

    /// Heavy contention.
    #[must_use]
    pub fn stress() -> Self {
        Self {
            producers: 8,
            consumers: 8,
            items: 1_000_000,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn validate(&self) -> Result<(), BenchError> {
        if self.producers == 0 || self.producers > THREADS_MAX {
            return Err(BenchError::InvalidConfig(format!(
                "producers must be in 1..={}, got {}",
                THREADS_MAX, self.producers
            )));
        }
        if self.consumers == 0 || self.consumers > THREADS_MAX {
            return Err(BenchError::InvalidConfig(format!(
                "consumers must be in 1..={}, got {}",
                THREADS_MAX, self.consumers
            )));
        }
        if self.items == 0 || self.items > ITEMS_MAX {
            return Err(BenchError::InvalidConfig(format!(
                "items must be in 1..={}, got {}",
                ITEMS_MAX, self.items
            )));
        }
        Ok(())
    }

    /// Items producer `index` pushes. The remainder goes to producer 0.
    #[must_use]
    pub fn items_for_producer(&self, index: usize) -> u64 {
        let producers = self.producers as u64;
        let share = self.items / producers;
        if index == 0 {
            share + self.items % producers
        } else {
            share
        }
    }
}
