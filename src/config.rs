//! Engine Configuration
//!
//! Every knob has a default; a JSON document only needs the fields it
//! overrides.
//!
//! ```json
//! {
//!   "maze": { "branch_weights": [1, 6, 3, 1], "max_cells": 4096 },
//!   "traversal": { "speed_constant": 2.0, "win_depth": 40 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::maze::generator::MazeConfig;
use crate::traversal::engine::TraversalConfig;

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Malformed JSON.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value outside its allowed range.
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

/// Full engine configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maze shape
    pub maze: MazeConfig,
    /// Movement, win and sanity tuning
    pub traversal: TraversalConfig,
}

impl EngineConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check both sections.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.maze.validate()?;
        self.traversal.validate()
    }
}
