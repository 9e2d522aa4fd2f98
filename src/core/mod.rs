//! Core deterministic primitives.
//!
//! All types in this module are designed for perfect cross-platform
//! determinism: given the same inputs, the simulation produces identical
//! results on any platform.

pub mod rng;
pub mod vec2;

// Re-export core types
pub use rng::{RandomDomain, RngStream, SeedManager};
pub use vec2::Vec2;
