//! Determinism and integration tests for the flock.
//!
//! - **Determinism tests**: same seed, same flock; boid order does not matter
//! - **Integration tests**: whole-flock behavior over many steps
//! - **Helper functions**: flock and boid factories
//!
//! # Test Structure
//!
//! - `determinism.rs`: seed reproducibility and plan/apply order independence
//! - `integration.rs`: end-to-end runs of the simulation
//! - `helpers.rs`: setup utilities

mod helpers;
mod integration;

// Re-export for convenience
pub use helpers::*;
