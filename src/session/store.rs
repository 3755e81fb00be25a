//! Game Session Store
//!
//! Holds `{seed, traversal, is_game_over, graphics_quality}` for the UI
//! and owns the lifecycle of a run:
//!
//! ```text
//!   start_new_game ──► active ──exit_to_menu──► detached ──continue_game──► active
//!                        │                         ▲
//!                        └──── terminal phase ─────┘ (is_game_over, continue refused)
//! ```
//!
//! The store is an ordinary value constructed by the host and passed to
//! its control loop; there is no global instance.
//!
//! # Single writer
//!
//! Every mutating method takes `&mut self`. The store must be driven from
//! one control loop (the same loop that renders); a multi-threaded host
//! has to provide its own exclusive access, for example by owning the
//! store inside one task or wrapping it in a mutex.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{ConfigError, EngineConfig};
use crate::core::seed::{Seed, SeedError};
use crate::maze::cell::ForkChoice;
use crate::maze::generator::MazeGenerator;
use crate::session::save::{SaveError, SavedSession};
use crate::traversal::engine::{LeverResult, TraversalEngine, TraversalError};
use crate::traversal::events::TraversalEvent;
use crate::traversal::state::{Outcome, TraversalPhase, TraversalSnapshot};

/// Session errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// Seed text rejected; the previous session is untouched.
    #[error(transparent)]
    InvalidSeedFormat(#[from] SeedError),

    /// Nothing to continue, or the saved run already ended.
    #[error("no saved session to continue")]
    NoSavedSession,

    /// Gameplay call while no run is attached.
    #[error("no active run")]
    NoActiveRun,

    /// Unrecognised graphics quality name.
    #[error("unknown graphics quality {0:?}")]
    UnknownGraphicsQuality(String),

    /// Rejected by the traversal engine.
    #[error(transparent)]
    Traversal(#[from] TraversalError),

    /// Saved session could not be used.
    #[error(transparent)]
    Save(#[from] SaveError),
}

// =============================================================================
// GRAPHICS QUALITY
// =============================================================================

/// Render quality preset. Stored for the UI; never read by the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphicsQuality {
    /// Low
    Low,
    /// Medium
    #[default]
    Medium,
    /// High
    High,
}

impl GraphicsQuality {
    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            GraphicsQuality::Low => "low",
            GraphicsQuality::Medium => "medium",
            GraphicsQuality::High => "high",
        }
    }
}

impl fmt::Display for GraphicsQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GraphicsQuality {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(GraphicsQuality::Low),
            "medium" => Ok(GraphicsQuality::Medium),
            "high" => Ok(GraphicsQuality::High),
            _ => Err(SessionError::UnknownGraphicsQuality(s.to_string())),
        }
    }
}

// =============================================================================
// STORE
// =============================================================================

/// Session state holder for one player.
#[derive(Debug, Default)]
pub struct GameSessionStore {
    /// Engine tuning used for every run
    config: EngineConfig,
    /// Seed of the current or last run
    seed: Option<Seed>,
    /// Progress kept while detached
    snapshot: Option<TraversalSnapshot>,
    /// Last run reached a terminal phase
    is_game_over: bool,
    /// UI preset
    graphics_quality: GraphicsQuality,
    /// Attached run
    engine: Option<TraversalEngine>,
}

impl GameSessionStore {
    /// Create an empty store. The configuration is checked up front.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    /// Start a fresh run from raw seed text.
    ///
    /// On an invalid seed nothing changes.
    pub fn start_new_game(&mut self, raw_seed: &str) -> Result<(), SessionError> {
        let seed = Seed::normalize(raw_seed)?;

        let maze = MazeGenerator::from_seed(&seed, self.config.maze.clone());
        let engine = TraversalEngine::new(maze, self.config.traversal.clone());

        info!("New game with seed \"{}\"", seed);
        self.is_game_over = engine.is_terminal();
        self.snapshot = Some(engine.snapshot());
        self.seed = Some(seed);
        self.engine = Some(engine);
        Ok(())
    }

    /// Reattach the saved run.
    ///
    /// Cells are regenerated from the seed; only the path comes from the
    /// saved snapshot.
    pub fn continue_game(&mut self) -> Result<(), SessionError> {
        if self.is_game_over {
            return Err(SessionError::NoSavedSession);
        }
        let (Some(seed), Some(snapshot)) = (self.seed.clone(), self.current_snapshot()) else {
            return Err(SessionError::NoSavedSession);
        };

        let maze = MazeGenerator::from_seed(&seed, self.config.maze.clone());
        let engine = TraversalEngine::restore(maze, self.config.traversal.clone(), snapshot)?;

        info!(
            "Continuing \"{}\" at {} cells",
            seed,
            engine.state().cells_visited()
        );
        self.snapshot = Some(engine.snapshot());
        self.engine = Some(engine);
        Ok(())
    }

    /// Detach the run, keeping seed and progress for a later continue.
    ///
    /// Safe in any phase, including mid-corridor.
    pub fn exit_to_menu(&mut self) {
        if let Some(engine) = self.engine.take() {
            info!(
                "Exit to menu at {} cells ({})",
                engine.state().cells_visited(),
                engine.phase().tag()
            );
            self.snapshot = Some(engine.snapshot());
        }
    }

    /// Store the UI quality preset.
    pub fn set_graphics_quality(&mut self, quality: GraphicsQuality) {
        debug!("Graphics quality set to {}", quality);
        self.graphics_quality = quality;
    }

    /// Advance the attached run by one frame of lever input.
    pub fn integrate_lever(&mut self, held: f64, elapsed: f64) -> Result<LeverResult, SessionError> {
        let engine = self.engine.as_mut().ok_or(SessionError::NoActiveRun)?;
        let result = engine.integrate_lever(held, elapsed)?;

        if result.phase.is_terminal() && !self.is_game_over {
            info!("Game over: {:?}", result.phase.outcome());
            self.is_game_over = true;
        }
        Ok(result)
    }

    /// Pick a corridor at the current fork of the attached run.
    pub fn choose_fork(&mut self, index: usize) -> Result<TraversalEvent, SessionError> {
        let engine = self.engine.as_mut().ok_or(SessionError::NoActiveRun)?;
        Ok(engine.choose_fork(index)?)
    }

    /// Persistable copy of the session, if there is anything to save.
    pub fn saved_session(&self) -> Option<SavedSession> {
        let seed = self.seed.clone()?;
        let snapshot = self.current_snapshot()?;
        Some(SavedSession::new(seed, snapshot, self.is_game_over))
    }

    /// Load a saved session in the detached state.
    ///
    /// Call [`continue_game`](Self::continue_game) to reattach. Any
    /// attached run is dropped. On error nothing changes.
    pub fn restore_saved(&mut self, save: SavedSession) -> Result<(), SessionError> {
        save.verify()?;

        info!(
            "Restored saved session \"{}\" ({} cells, game over: {})",
            save.seed,
            save.snapshot.visited.len(),
            save.is_game_over
        );
        self.engine = None;
        self.seed = Some(save.seed);
        self.snapshot = Some(save.snapshot);
        self.is_game_over = save.is_game_over;
        Ok(())
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Seed of the current or last run.
    pub fn seed(&self) -> Option<&Seed> {
        self.seed.as_ref()
    }

    /// True once the last run ended.
    pub fn is_game_over(&self) -> bool {
        self.is_game_over
    }

    /// UI quality preset.
    pub fn graphics_quality(&self) -> GraphicsQuality {
        self.graphics_quality
    }

    /// True if "Continue Game" would succeed.
    pub fn can_continue(&self) -> bool {
        !self.is_game_over && self.seed.is_some() && self.snapshot.is_some()
    }

    /// Attached run, if any.
    pub fn engine(&self) -> Option<&TraversalEngine> {
        self.engine.as_ref()
    }

    /// Phase of the attached run.
    pub fn phase(&self) -> Option<TraversalPhase> {
        self.engine.as_ref().map(TraversalEngine::phase)
    }

    /// Outcome of the attached run, once terminal.
    pub fn outcome(&self) -> Option<Outcome> {
        self.engine.as_ref().and_then(TraversalEngine::outcome)
    }

    /// Options at the current fork; empty unless attached and at a fork.
    pub fn fork_choices(&self) -> Vec<ForkChoice> {
        self.engine
            .as_ref()
            .map(TraversalEngine::fork_choices)
            .unwrap_or_default()
    }

    /// Cells reached so far, attached or not.
    pub fn cells_visited(&self) -> usize {
        match (&self.engine, &self.snapshot) {
            (Some(engine), _) => engine.state().cells_visited(),
            (None, Some(snapshot)) => snapshot.visited.len(),
            (None, None) => 0,
        }
    }

    /// Sanity meter, attached or not.
    pub fn fear(&self) -> f64 {
        match (&self.engine, &self.snapshot) {
            (Some(engine), _) => engine.state().fear,
            (None, Some(snapshot)) => snapshot.fear,
            (None, None) => 0.0,
        }
    }

    /// Items picked up over the whole run, attached or not.
    pub fn items_collected(&self) -> u32 {
        match (&self.engine, &self.snapshot) {
            (Some(engine), _) => engine.state().items_collected,
            (None, Some(snapshot)) => snapshot.items_collected,
            (None, None) => 0,
        }
    }

    /// Items still in hand for blockades, attached or not.
    pub fn items_held(&self) -> u32 {
        match (&self.engine, &self.snapshot) {
            (Some(engine), _) => engine.state().items_held,
            (None, Some(snapshot)) => snapshot.items_held,
            (None, None) => 0,
        }
    }

    /// Odometer, attached or not.
    pub fn total_distance(&self) -> f64 {
        match (&self.engine, &self.snapshot) {
            (Some(engine), _) => engine.state().total_distance(),
            (None, Some(snapshot)) => snapshot.completed_distance + snapshot.distance_into_corridor,
            (None, None) => 0.0,
        }
    }

    /// Live snapshot when attached, otherwise the kept one.
    fn current_snapshot(&self) -> Option<TraversalSnapshot> {
        match &self.engine {
            Some(engine) => Some(engine.snapshot()),
            None => self.snapshot.clone(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
