//! # sq-core
//!
//! Shared surface and invariants for synchronized stacks and queues.
//!
//! This crate provides:
//! - `ConcurrentContainer`, the operation set every synchronized container
//!   exposes (and the one harnesses drive)
//! - `PeekableContainer`, adding `try_peek` for containers that can look
//!   at their head
//! - `Closed`, the error a blocking pop reports after cancellation
//! - `PropertyResult` and `PropertyChecker` for verifying invariants
//! - `Counterexample` for rendering failure paths
//! - `ContainerProperties` and its checker (NoLostElements, NoDuplicates,
//!   OrderPreserved, SizeConsistent)

pub mod container;
pub mod counterexample;
pub mod invariants;
pub mod property;

pub use container::{Closed, ConcurrentContainer, Order, PeekableContainer};
pub use counterexample::{Counterexample, StateSnapshot, ThreadAction};
pub use property::{PropertyChecker, PropertyResult};
