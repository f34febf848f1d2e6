//! # sq-dst
//!
//! Deterministic Simulation Testing for synchronized containers.
//!
//! A run is fully determined by its seed: which simulated thread issues
//! each operation, and which faults fire at which operation boundary.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sq_dst::{get_or_generate_seed, random_ops, run_dst_scenario};
//!
//! let seed = get_or_generate_seed();
//! let result = run_dst_scenario(SyncQueue::new(), seed, &random_ops(seed, 1_000));
//! assert!(result.passed, "{}", result.format());
//! ```
//!
//! ## Reproducibility
//!
//! To reproduce a failing test:
//! ```bash
//! DST_SEED=12345 cargo test
//! ```

pub mod fault;
pub mod fault_injection;
pub mod random;

pub use fault::{FaultConfig, FaultInjector, FaultPoint, FaultType};
pub use fault_injection::{
    random_ops, run_dst_scenario, run_dst_scenario_with, DstOp, DstOutcome, DstResult, DstRunner,
    DstStats,
};
pub use random::DeterministicRng;

/// Get DST seed from environment or generate random one.
///
/// Prints the seed for reproduction. Use `DST_SEED=<seed>` to reproduce.
#[must_use]
pub fn get_or_generate_seed() -> u64 {
    match std::env::var("DST_SEED") {
        Ok(s) => {
            let seed: u64 = s.trim().parse().expect("DST_SEED must be a valid u64");
            println!("DST_SEED={} (from environment)", seed);
            seed
        }
        Err(_) => {
            // Zero is reserved; counterexamples treat it as "no seed".
            let seed = rand::random::<u64>().max(1);
            println!("DST_SEED={} (randomly generated)", seed);
            seed
        }
    }
}
