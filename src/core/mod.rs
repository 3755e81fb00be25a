//! Core deterministic primitives.
//!
//! Everything maze content depends on lives here: the seed phrase codec,
//! the seeded PRNG and the state hasher. None of it touches the clock,
//! the filesystem or any shared state.

pub mod seed;
pub mod rng;
pub mod hash;

// Re-export core types
pub use seed::{random_seed_text, NumericSeed, Seed, SeedError};
pub use rng::DeterministicRng;
pub use hash::{compute_state_hash, StateHash, StateHasher};
