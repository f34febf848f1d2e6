//! Lock primitives, swapped for loom's under `--cfg loom`.
//!
//! ```bash
//! RUSTFLAGS="--cfg loom" cargo test -p sq-containers --release
//! ```

#[cfg(loom)]
pub(crate) use loom::sync::{Condvar, Mutex, MutexGuard};

#[cfg(not(loom))]
pub(crate) use std::sync::{Condvar, Mutex, MutexGuard};
