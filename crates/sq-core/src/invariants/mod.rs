//! Invariants for synchronized containers.
//!
//! - `container`: NoLostElements, NoDuplicates, OrderPreserved (LIFO or
//!   FIFO, by sequential replay of the history), SizeConsistent

pub mod container;

pub use container::{
    ContainerHistory, ContainerOpType, ContainerOperation, ContainerProperties,
    ContainerPropertyChecker,
};
