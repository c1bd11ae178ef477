//! Shared utilities for neural network implementations
//!
//! Currently the seeded random source injected into every randomized
//! operation.

pub mod rng;

pub use rng::SimpleRng;
