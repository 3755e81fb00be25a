//! Traversal Engine
//!
//! Integrates the continuous lever signal into discrete cell arrivals and
//! drives the traversal state machine:
//!
//! ```text
//!              lever                      choose_fork
//!   AtCorridor ─────► arrival ──► AtFork ────────────► AtCorridor
//!       ▲                │
//!       └── passage ─────┤──► AtDeadEnd / Won / Lost   (terminal)
//! ```
//!
//! Called once per rendered frame from a single control loop. A call with
//! a huge elapsed time resolves every corridor boundary it crosses, one at
//! a time, so no arrival or terminal condition is skipped.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::ConfigError;
use crate::core::hash::StateHash;
use crate::maze::cell::{Cell, CellKind, Corridor, ForkChoice};
use crate::maze::generator::{MazeError, MazeGenerator};
use crate::traversal::events::{TraversalEvent, TraversalEventData};
use crate::traversal::state::{
    LossReason, Outcome, TraversalPhase, TraversalSnapshot, TraversalState,
};

/// Traversal error. No variant is returned after state was touched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TraversalError {
    /// Fork index out of range, or not stopped at a fork.
    #[error("fork selection {index} rejected: {available} choices while {phase:?}")]
    InvalidForkSelection {
        /// Requested corridor index
        index: usize,
        /// Choices on offer (0 when not at a fork)
        available: usize,
        /// Phase at the time of the call
        phase: TraversalPhase,
    },

    /// Blockaded corridor chosen with no item in hand.
    #[error("corridor {index} is blockaded and no item is held")]
    CorridorBlocked {
        /// Requested corridor index
        index: usize,
    },

    /// Lever values that cannot be integrated.
    #[error("invalid lever input: held {held}, elapsed {elapsed}s")]
    InvalidLeverInput {
        /// Held fraction as received
        held: f64,
        /// Elapsed seconds as received
        elapsed: f64,
    },

    /// A snapshot that does not describe a path through this maze.
    #[error("snapshot does not match the maze: {0}")]
    SnapshotMismatch(&'static str),

    /// Regenerating the snapshot's path failed.
    #[error(transparent)]
    Maze(#[from] MazeError),
}

// =============================================================================
// CONFIG
// =============================================================================

/// Movement, win and sanity tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalConfig {
    /// Distance units per second at full lever.
    pub speed_constant: f64,
    /// Depth (corridors from the start) that wins the run.
    pub win_depth: u32,
    /// Optional odometer threshold that also wins the run.
    pub win_distance: Option<f64>,
    /// Fear at which the run is lost.
    pub max_sanity: f64,
    /// Fear added by every arrival.
    pub fear_per_cell: f64,
    /// Extra fear when a cell holds a villain.
    pub fear_per_villain: f64,
    /// Fear removed when a cell holds a collectible.
    pub fear_relief_per_collectible: f64,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            speed_constant: 2.0,
            win_depth: 40,
            win_distance: None,
            max_sanity: 100.0,
            fear_per_cell: 1.0,
            fear_per_villain: 8.0,
            fear_relief_per_collectible: 5.0,
        }
    }
}

impl TraversalConfig {
    /// Check that every knob is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.speed_constant.is_finite() && self.speed_constant > 0.0) {
            return Err(ConfigError::Invalid("speed_constant must be positive"));
        }
        if self.win_depth == 0 {
            return Err(ConfigError::Invalid("win_depth must be at least 1"));
        }
        if let Some(distance) = self.win_distance {
            if !(distance.is_finite() && distance > 0.0) {
                return Err(ConfigError::Invalid("win_distance must be positive"));
            }
        }
        if !(self.max_sanity.is_finite() && self.max_sanity > 0.0) {
            return Err(ConfigError::Invalid("max_sanity must be positive"));
        }
        let fear_knobs = [
            self.fear_per_cell,
            self.fear_per_villain,
            self.fear_relief_per_collectible,
        ];
        if fear_knobs.iter().any(|v| !(v.is_finite() && *v >= 0.0)) {
            return Err(ConfigError::Invalid("fear amounts must be non-negative"));
        }
        Ok(())
    }
}

/// Result of one lever integration.
#[derive(Debug, Default)]
pub struct LeverResult {
    /// Events generated by this call, in order
    pub events: Vec<TraversalEvent>,
    /// Phase after the call
    pub phase: TraversalPhase,
}

impl LeverResult {
    /// Number of cells reached during the call.
    pub fn arrivals(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.data, TraversalEventData::CellReached { .. }))
            .count()
    }
}

// =============================================================================
// ENGINE
// =============================================================================

/// Owns a maze and the player's traversal of it.
#[derive(Clone, Debug)]
pub struct TraversalEngine {
    maze: MazeGenerator,
    config: TraversalConfig,
    state: TraversalState,
}

impl TraversalEngine {
    /// Start a fresh run at the root's first corridor.
    pub fn new(mut maze: MazeGenerator, config: TraversalConfig) -> Self {
        let root = maze.root();
        let mut state = TraversalState::new(root);

        if let Err(err) = maze.cell_at(root) {
            warn!("Cannot generate start cell: {}", err);
            state.phase = TraversalPhase::Lost(LossReason::GenerationExhausted);
            state.active_corridor = None;
        }

        Self { maze, config, state }
    }

    /// Rebuild a run from a snapshot.
    ///
    /// Regenerates every cell on the recorded path and re-applies each
    /// arrival, so distance, fear and items are derived from the path. The
    /// snapshot is rejected when its own totals disagree.
    pub fn restore(
        mut maze: MazeGenerator,
        config: TraversalConfig,
        snapshot: TraversalSnapshot,
    ) -> Result<Self, TraversalError> {
        let root = maze.root();
        if snapshot.visited.first() != Some(&root) {
            return Err(TraversalError::SnapshotMismatch("path does not start at the root"));
        }
        if snapshot.visited.last() != Some(&snapshot.current_cell) {
            return Err(TraversalError::SnapshotMismatch("path does not end at the current cell"));
        }
        let progress = snapshot.distance_into_corridor;
        if !(progress.is_finite() && progress >= 0.0) {
            return Err(TraversalError::SnapshotMismatch("negative or non-finite progress"));
        }

        let mut state = TraversalState::new(root);
        state.active_corridor = None;

        for step in snapshot.visited.windows(2) {
            let from = maze.cell_at(step[0])?.clone();
            if stopped_phase(&from, &state, &config).is_terminal() {
                return Err(TraversalError::SnapshotMismatch("path continues after the run ended"));
            }
            let corridor = from
                .corridors
                .iter()
                .find(|c| c.to == step[1])
                .ok_or(TraversalError::SnapshotMismatch("path skips a corridor"))?;
            if corridor.blocked {
                spend_item(&mut state)?;
            }
            state.completed_distance += corridor.length;

            let cell = maze.cell_at(step[1])?.clone();
            state.current_cell = cell.id;
            state.visited.push(cell.id);
            apply_arrival(&mut state, &cell, &config);
        }

        let cell = maze.cell_at(snapshot.current_cell)?.clone();
        let stopped = stopped_phase(&cell, &state, &config);
        match snapshot.pending_corridor_index {
            Some(index) => {
                if stopped.is_terminal() {
                    return Err(TraversalError::SnapshotMismatch("moving after the run ended"));
                }
                let corridor = cell
                    .corridor(index as usize)
                    .ok_or(TraversalError::SnapshotMismatch("corridor index out of range"))?;
                if progress >= corridor.length {
                    return Err(TraversalError::SnapshotMismatch("progress beyond corridor end"));
                }
                if corridor.blocked {
                    spend_item(&mut state)?;
                }
                state.active_corridor = Some(index);
                state.distance_into_corridor = progress;
            }
            None => {
                if stopped == TraversalPhase::AtCorridor {
                    return Err(TraversalError::SnapshotMismatch("stopped on a passage"));
                }
                state.phase = stopped;
                if stopped == TraversalPhase::AtFork {
                    state.pending_fork = Some(cell.id);
                }
            }
        }

        let totals_match = state.completed_distance == snapshot.completed_distance
            && state.fear == snapshot.fear
            && state.items_collected == snapshot.items_collected
            && state.items_held == snapshot.items_held;
        if !totals_match {
            return Err(TraversalError::SnapshotMismatch("totals disagree with the path"));
        }

        debug!(
            "Restored run at cell {} after {} cells ({:?})",
            state.current_cell,
            state.visited.len(),
            state.phase
        );

        Ok(Self { maze, config, state })
    }

    /// Current traversal state.
    pub fn state(&self) -> &TraversalState {
        &self.state
    }

    /// Current phase.
    #[inline]
    pub fn phase(&self) -> TraversalPhase {
        self.state.phase
    }

    /// Terminal outcome, if the run is over.
    pub fn outcome(&self) -> Option<Outcome> {
        self.state.phase.outcome()
    }

    /// True once the run cannot continue.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.state.phase.is_terminal()
    }

    /// The maze being traversed.
    pub fn maze(&self) -> &MazeGenerator {
        &self.maze
    }

    /// Active configuration.
    pub fn config(&self) -> &TraversalConfig {
        &self.config
    }

    /// Cell most recently reached.
    pub fn current_cell(&self) -> Option<&Cell> {
        self.maze.get(self.state.current_cell)
    }

    /// Corridor being ridden, if moving.
    pub fn active_corridor(&self) -> Option<&Corridor> {
        let index = self.state.active_corridor?;
        self.current_cell()?.corridor(index as usize)
    }

    /// Persistable snapshot of the run.
    pub fn snapshot(&self) -> TraversalSnapshot {
        self.state.snapshot()
    }

    /// Replay verification hash.
    pub fn compute_hash(&self) -> StateHash {
        self.state.compute_hash(self.maze.numeric_seed())
    }

    /// Options at the current fork; empty unless `AtFork`.
    pub fn fork_choices(&self) -> Vec<ForkChoice> {
        if self.state.phase != TraversalPhase::AtFork {
            return Vec::new();
        }
        self.current_cell()
            .map(Cell::fork_choices)
            .unwrap_or_default()
    }

    /// First choice at or after `from` (wrapping) that can be taken now.
    ///
    /// Blockaded corridors count only while an item is held.
    pub fn next_passable_choice(&self, from: usize) -> Option<usize> {
        let choices = self.fork_choices();
        let n = choices.len();
        let held = self.state.items_held > 0;
        (0..n)
            .map(|k| (from + k) % n)
            .find(|&i| !choices[i].blocked || held)
    }

    /// Pick the corridor to ride out of the current fork.
    ///
    /// A blockaded corridor costs one held item; without one the call is
    /// rejected and nothing changes.
    pub fn choose_fork(&mut self, index: usize) -> Result<TraversalEvent, TraversalError> {
        let phase = self.state.phase;
        let available = self.fork_choices().len();
        if phase != TraversalPhase::AtFork || index >= available {
            return Err(TraversalError::InvalidForkSelection {
                index,
                available,
                phase,
            });
        }

        let cell = self.state.current_cell;
        let (heading, item_spent) = self
            .current_cell()
            .and_then(|c| c.corridor(index))
            .map(|c| (c.heading, c.blocked))
            .ok_or(TraversalError::SnapshotMismatch("fork cell missing from maze"))?;
        if item_spent && self.state.items_held == 0 {
            return Err(TraversalError::CorridorBlocked { index });
        }

        if item_spent {
            self.state.items_held -= 1;
        }
        self.state.active_corridor = Some(index as u8);
        self.state.distance_into_corridor = 0.0;
        self.state.pending_fork = None;
        self.state.phase = TraversalPhase::AtCorridor;

        debug!("Chose corridor {} ({}) at fork {}", index, heading.label(), cell);
        if item_spent {
            debug!("Spent an item on the blockade, {} left", self.state.items_held);
        }

        Ok(TraversalEvent::new(
            self.step(),
            TraversalEventData::ForkChosen {
                cell,
                index,
                heading,
                item_spent,
            },
        ))
    }

    /// Advance along the active corridor.
    ///
    /// `held` is the lever position (clamped to [0, 1]) and `elapsed` the
    /// frame time in seconds. Movement is `held * speed_constant * elapsed`.
    /// Ignored while stopped at a fork or after the run has ended.
    pub fn integrate_lever(&mut self, held: f64, elapsed: f64) -> Result<LeverResult, TraversalError> {
        if !held.is_finite() || !elapsed.is_finite() || elapsed < 0.0 {
            return Err(TraversalError::InvalidLeverInput { held, elapsed });
        }

        let mut result = LeverResult::default();
        if self.state.phase != TraversalPhase::AtCorridor {
            result.phase = self.state.phase;
            return Ok(result);
        }

        let advance = held.clamp(0.0, 1.0) * self.config.speed_constant * elapsed;
        let advance = if advance.is_finite() { advance } else { f64::MAX };
        self.state.distance_into_corridor += advance;

        // Resolve every boundary crossed, one corridor at a time
        while self.state.phase == TraversalPhase::AtCorridor {
            let Some(corridor) = self.active_corridor().cloned() else {
                break;
            };
            if self.state.distance_into_corridor < corridor.length {
                break;
            }

            let cell = match self.maze.cell_at(corridor.to) {
                Ok(cell) => cell.clone(),
                Err(err) => {
                    warn!("Run lost at cell {}: {}", self.state.current_cell, err);
                    self.state.distance_into_corridor = corridor.length;
                    self.finish(
                        TraversalPhase::Lost(LossReason::GenerationExhausted),
                        &mut result.events,
                    );
                    break;
                }
            };

            self.state.distance_into_corridor -= corridor.length;
            self.state.completed_distance += corridor.length;
            self.arrive(&cell, &mut result.events);
        }

        result.phase = self.state.phase;
        Ok(result)
    }

    /// Move onto `cell` and settle the next phase.
    fn arrive(&mut self, cell: &Cell, events: &mut Vec<TraversalEvent>) {
        self.state.current_cell = cell.id;
        self.state.visited.push(cell.id);
        self.state.active_corridor = None;

        let step = self.step();
        debug!("Reached cell {} at depth {} ({:?})", cell.id, cell.depth, cell.kind());
        events.push(TraversalEvent::new(
            step,
            TraversalEventData::CellReached {
                cell: cell.id,
                depth: cell.depth,
                kind: cell.kind(),
            },
        ));

        apply_arrival(&mut self.state, cell, &self.config);
        if cell.has_villain {
            events.push(TraversalEvent::new(
                step,
                TraversalEventData::VillainEncountered { cell: cell.id },
            ));
        }
        if cell.has_collectible {
            events.push(TraversalEvent::new(
                step,
                TraversalEventData::CollectibleFound { cell: cell.id },
            ));
        }

        match stopped_phase(cell, &self.state, &self.config) {
            TraversalPhase::AtCorridor => {
                // Passage: overshoot carries into the only corridor
                self.state.active_corridor = Some(0);
            }
            TraversalPhase::AtFork => {
                // The car stops at a junction; overshoot is dropped
                self.state.distance_into_corridor = 0.0;
                self.state.pending_fork = Some(cell.id);
                self.state.phase = TraversalPhase::AtFork;
                events.push(TraversalEvent::new(
                    step,
                    TraversalEventData::ForkReached {
                        cell: cell.id,
                        choices: cell.corridors.len(),
                    },
                ));
            }
            terminal => {
                self.state.distance_into_corridor = 0.0;
                self.finish(terminal, events);
            }
        }
    }

    /// Enter a terminal phase.
    fn finish(&mut self, phase: TraversalPhase, events: &mut Vec<TraversalEvent>) {
        self.state.phase = phase;
        self.state.active_corridor = None;
        self.state.pending_fork = None;

        let step = self.step();
        let data = match phase.outcome() {
            Some(Outcome::Won) => TraversalEventData::Won {
                depth: step.saturating_sub(1),
                distance: self.state.total_distance(),
            },
            Some(Outcome::Lost(reason)) => TraversalEventData::Lost { reason },
            None => return,
        };

        info!(
            "Run ended {:?} after {} cells, {:.1} units",
            phase,
            self.state.visited.len(),
            self.state.total_distance()
        );
        events.push(TraversalEvent::new(step, data));
    }

    #[inline]
    fn step(&self) -> u32 {
        self.state.visited.len() as u32
    }
}

/// Fear and pickups for reaching `cell`.
fn apply_arrival(state: &mut TraversalState, cell: &Cell, config: &TraversalConfig) {
    let mut fear = state.fear + config.fear_per_cell;
    if cell.has_villain {
        fear += config.fear_per_villain;
    }
    if cell.has_collectible {
        fear = (fear - config.fear_relief_per_collectible).max(0.0);
        state.items_collected += 1;
        state.items_held += 1;
    }
    state.fear = fear.min(config.max_sanity);
}

/// Take one item for a blockade recorded in a snapshot.
fn spend_item(state: &mut TraversalState) -> Result<(), TraversalError> {
    state.items_held = state
        .items_held
        .checked_sub(1)
        .ok_or(TraversalError::SnapshotMismatch("blockade passed without an item"))?;
    Ok(())
}

/// Phase for a player standing on `cell` with the given totals.
///
/// Sanity loss beats a win, a win beats the cell's own classification.
fn stopped_phase(cell: &Cell, state: &TraversalState, config: &TraversalConfig) -> TraversalPhase {
    if state.fear >= config.max_sanity {
        return TraversalPhase::Lost(LossReason::SanityDepleted);
    }

    let deep_enough = cell.depth >= config.win_depth;
    let far_enough = config
        .win_distance
        .is_some_and(|target| state.completed_distance >= target);
    if deep_enough || far_enough {
        return TraversalPhase::Won;
    }

    match cell.kind() {
        CellKind::DeadEnd => TraversalPhase::AtDeadEnd,
        CellKind::Passage => TraversalPhase::AtCorridor,
        CellKind::Fork => TraversalPhase::AtFork,
    }
}

// =============================================================================
// TESTS
// =============================================================================
