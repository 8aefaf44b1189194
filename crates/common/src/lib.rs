//! Shared primitives used across the publishing workflow crates.

pub mod types;

pub use types::{AggregateId, InvalidRatio, Ratio};
