//! # Nightmare Maze Engine
//!
//! Deterministic procedural maze generation and navigation for the
//! Nightmare Maze ride.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    NIGHTMARE MAZE ENGINE                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── seed.rs     - Three-word seed codec                     │
//! │  ├── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │  └── hash.rs     - State hashing for verification            │
//! │                                                              │
//! │  maze/           - Maze graph (deterministic)                │
//! │  ├── cell.rs     - Cells, corridors, headings                │
//! │  └── generator.rs- Lazy per-cell generation                  │
//! │                                                              │
//! │  traversal/      - Player movement (deterministic)           │
//! │  ├── state.rs    - Phase machine and run state               │
//! │  ├── events.rs   - Arrival, fork and terminal events         │
//! │  ├── engine.rs   - Lever integration and fork selection      │
//! │  └── replay.rs   - Recorded command replay                   │
//! │                                                              │
//! │  session/        - Lifecycle and persistence                 │
//! │  ├── store.rs    - New game / continue / exit                │
//! │  └── save.rs     - Saved session codec                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/`, `maze/` and `traversal/` modules are deterministic:
//! - Every cell is generated from its own RNG sub-stream, so the order
//!   in which cells are first reached never changes their content
//! - No HashMap (uses BTreeMap for sorted iteration)
//! - No system time dependencies
//! - All randomness from seeded Xorshift128+
//!
//! Given the same seed phrase, configuration and lever input, a run
//! produces **identical state hashes** on every platform.
//!
//! ```
//! use nightmare_maze::{MazeConfig, MazeGenerator, Seed, TraversalConfig, TraversalEngine};
//!
//! let seed = Seed::normalize("  Red CLOWN  laugh ").unwrap();
//! let maze = MazeGenerator::from_seed(&seed, MazeConfig::default());
//! let mut engine = TraversalEngine::new(maze, TraversalConfig::default());
//!
//! engine.integrate_lever(1.0, 0.5).unwrap();
//! assert_eq!(engine.state().total_distance(), 1.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod maze;
pub mod session;
pub mod traversal;

// Re-export commonly used types
pub use config::{ConfigError, EngineConfig};
pub use core::rng::DeterministicRng;
pub use core::seed::{random_seed_text, NumericSeed, Seed, SeedError};
pub use maze::{Cell, CellId, CellKind, Corridor, ForkChoice, Heading, MazeConfig, MazeError, MazeGenerator};
pub use session::{GameSessionStore, GraphicsQuality, SaveError, SavedSession, SessionError};
pub use traversal::{
    replay, LeverCommand, LeverResult, LossReason, Outcome, TraversalConfig, TraversalEngine,
    TraversalError, TraversalEvent, TraversalEventData, TraversalPhase, TraversalSnapshot,
    TraversalState,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Expected frame rate of the host control loop (Hz)
pub const FRAME_RATE: u32 = 60;
