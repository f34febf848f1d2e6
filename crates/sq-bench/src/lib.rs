//! # sq-bench
//!
//! Producer/consumer throughput harness for the synchronized containers.
//!
//! N producers and M consumers share one container; the harness times how
//! long it takes to move every item through it. Any
//! [`ConcurrentContainer`](sq_core::ConcurrentContainer) can be driven,
//! including crossbeam's lock-free `SegQueue` as a comparison point.
//!
//! ## Consumer strategies
//!
//! | Strategy | Empty container | Stop condition |
//! |----------|-----------------|----------------|
//! | Spin | `try_pop` + yield | consumed count reaches items |
//! | Blocking | park in `pop` | last consumer closes the container |

pub mod config;
pub mod error;
pub mod lockfree;
pub mod report;
pub mod suite;
pub mod workload;

pub use config::{BenchConfig, Strategy, ITEMS_DEFAULT, ITEMS_MAX, THREADS_MAX};
pub use error::BenchError;
pub use lockfree::LockFreeQueue;
pub use report::{write_results, Format, CSV_HEADER};
pub use suite::{run_suite, ContainerKind, SuiteConfig};
pub use workload::{run_benchmark, BenchResult};
