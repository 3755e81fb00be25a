//! Deterministic Replay
//!
//! Re-runs a recorded command stream against a fresh maze. Two replays of
//! the same seed, configuration and commands end in byte-identical state.

use serde::{Deserialize, Serialize};

use crate::maze::generator::MazeGenerator;
use crate::traversal::engine::{TraversalConfig, TraversalEngine, TraversalError};
use crate::traversal::events::TraversalEvent;

/// One recorded player action.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum LeverCommand {
    /// Lever integration for one frame
    Lever {
        /// Lever position
        held: f64,
        /// Frame time in seconds
        elapsed: f64,
    },
    /// Fork selection by corridor index
    Choose(usize),
}

/// Replay `commands` from the start of `maze`.
///
/// Stops at the first terminal phase; later commands are not applied.
/// Returns the engine (for its state and hash) and every event emitted.
pub fn replay(
    maze: MazeGenerator,
    config: TraversalConfig,
    commands: &[LeverCommand],
) -> Result<(TraversalEngine, Vec<TraversalEvent>), TraversalError> {
    let mut engine = TraversalEngine::new(maze, config);
    let mut all_events = Vec::new();

    for command in commands {
        if engine.is_terminal() {
            break;
        }

        match *command {
            LeverCommand::Lever { held, elapsed } => {
                let result = engine.integrate_lever(held, elapsed)?;
                all_events.extend(result.events);
            }
            LeverCommand::Choose(index) => {
                all_events.push(engine.choose_fork(index)?);
            }
        }
    }

    Ok((engine, all_events))
}
