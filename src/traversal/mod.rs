//! Traversal
//!
//! - `state`: phase machine, run state and snapshots
//! - `events`: what happened during a call, for the UI layer
//! - `engine`: lever integration and fork selection
//! - `replay`: deterministic re-run of a recorded command stream

pub mod engine;
pub mod events;
pub mod replay;
pub mod state;

pub use engine::{LeverResult, TraversalConfig, TraversalEngine, TraversalError};
pub use events::{TraversalEvent, TraversalEventData};
pub use replay::{replay, LeverCommand};
pub use state::{LossReason, Outcome, TraversalPhase, TraversalSnapshot, TraversalState};
