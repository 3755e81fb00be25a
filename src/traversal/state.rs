//! Traversal State Definitions
//!
//! The player's position in the maze graph, and the persisted subset of it.

use serde::{Deserialize, Serialize};

use crate::core::hash::{compute_state_hash, StateHash};
use crate::core::seed::NumericSeed;
use crate::maze::cell::CellId;

// =============================================================================
// PHASE
// =============================================================================

/// Why a run was lost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum LossReason {
    /// Reached a cell with no way onward
    DeadEnd = 0,
    /// The maze grew past its configured bound
    GenerationExhausted = 1,
    /// Fear filled the sanity meter
    SanityDepleted = 2,
}

/// How a finished run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Crossed the win threshold
    Won,
    /// Did not make it out
    Lost(LossReason),
}

/// Traversal state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TraversalPhase {
    /// Riding along a corridor
    #[default]
    AtCorridor,
    /// Stopped at a junction, waiting for a choice
    AtFork,
    /// Stopped with nowhere to go (terminal)
    AtDeadEnd,
    /// Escaped (terminal)
    Won,
    /// Forced loss (terminal)
    Lost(LossReason),
}

impl TraversalPhase {
    /// True once the run cannot continue.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TraversalPhase::AtDeadEnd | TraversalPhase::Won | TraversalPhase::Lost(_)
        )
    }

    /// Terminal outcome, if any.
    pub fn outcome(self) -> Option<Outcome> {
        match self {
            TraversalPhase::AtCorridor | TraversalPhase::AtFork => None,
            TraversalPhase::AtDeadEnd => Some(Outcome::Lost(LossReason::DeadEnd)),
            TraversalPhase::Won => Some(Outcome::Won),
            TraversalPhase::Lost(reason) => Some(Outcome::Lost(reason)),
        }
    }

    /// Stable tag for the UI layer.
    pub fn tag(self) -> &'static str {
        match self {
            TraversalPhase::AtCorridor => "at_corridor",
            TraversalPhase::AtFork => "at_fork",
            TraversalPhase::AtDeadEnd => "at_dead_end",
            TraversalPhase::Won => "won",
            TraversalPhase::Lost(_) => "lost",
        }
    }

    fn code(self) -> u8 {
        match self {
            TraversalPhase::AtCorridor => 0,
            TraversalPhase::AtFork => 1,
            TraversalPhase::AtDeadEnd => 2,
            TraversalPhase::Won => 3,
            TraversalPhase::Lost(reason) => 4 + reason as u8,
        }
    }
}

// =============================================================================
// TRAVERSAL STATE
// =============================================================================

/// Complete traversal state of one run.
///
/// Owned by the traversal engine; only lever integration and fork
/// selection mutate it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraversalState {
    /// State machine phase
    pub phase: TraversalPhase,

    /// Cell most recently reached
    pub current_cell: CellId,

    /// Index of the corridor being ridden out of `current_cell`
    pub active_corridor: Option<u8>,

    /// Progress along the active corridor
    pub distance_into_corridor: f64,

    /// Every cell reached, in order, starting with the root
    pub visited: Vec<CellId>,

    /// Fork awaiting a choice
    pub pending_fork: Option<CellId>,

    /// Sum of the lengths of fully ridden corridors
    pub completed_distance: f64,

    /// Sanity meter (0 = calm)
    pub fear: f64,

    /// Items picked up so far
    pub items_collected: u32,

    /// Items still in hand (collected minus spent on blockades)
    pub items_held: u32,
}

impl TraversalState {
    /// Fresh run at the start of the root's first corridor.
    pub fn new(root: CellId) -> Self {
        Self {
            phase: TraversalPhase::AtCorridor,
            current_cell: root,
            active_corridor: Some(0),
            distance_into_corridor: 0.0,
            visited: vec![root],
            pending_fork: None,
            completed_distance: 0.0,
            fear: 0.0,
            items_collected: 0,
            items_held: 0,
        }
    }

    /// The "CELLS:" counter.
    #[inline]
    pub fn cells_visited(&self) -> usize {
        self.visited.len()
    }

    /// Odometer: completed corridors plus progress on the current one.
    #[inline]
    pub fn total_distance(&self) -> f64 {
        self.completed_distance + self.distance_into_corridor
    }

    /// Persistable subset of this state.
    pub fn snapshot(&self) -> TraversalSnapshot {
        TraversalSnapshot {
            current_cell: self.current_cell,
            visited: self.visited.clone(),
            pending_corridor_index: self.active_corridor,
            distance_into_corridor: self.distance_into_corridor,
            completed_distance: self.completed_distance,
            fear: self.fear,
            items_collected: self.items_collected,
            items_held: self.items_held,
        }
    }

    /// Hash this state for replay verification.
    pub fn compute_hash(&self, seed: NumericSeed) -> StateHash {
        compute_state_hash(seed.value(), self.visited.len() as u32, |hasher| {
            hasher.update_u8(self.phase.code());
            hasher.update_u64(self.current_cell.value());
            hasher.update_opt_u8(self.active_corridor);
            hasher.update_f64(self.distance_into_corridor);
            for id in &self.visited {
                hasher.update_u64(id.value());
            }
            hasher.update_bool(self.pending_fork.is_some());
            hasher.update_f64(self.completed_distance);
            hasher.update_f64(self.fear);
            hasher.update_u32(self.items_collected);
            hasher.update_u32(self.items_held);
        })
    }
}

/// Position and progress of a run, without any maze content.
///
/// Cells are regenerated from the seed on restore; only the path is kept.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraversalSnapshot {
    /// Cell most recently reached
    pub current_cell: CellId,
    /// Path from the root, inclusive
    pub visited: Vec<CellId>,
    /// Corridor being ridden, `None` when stopped at a fork
    pub pending_corridor_index: Option<u8>,
    /// Progress along that corridor
    pub distance_into_corridor: f64,
    /// Sum of fully ridden corridor lengths
    pub completed_distance: f64,
    /// Sanity meter
    pub fear: f64,
    /// Items picked up so far
    pub items_collected: u32,
    /// Items still in hand
    pub items_held: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let root = CellId(42);
        let state = TraversalState::new(root);
        assert_eq!(state.phase, TraversalPhase::AtCorridor);
        assert_eq!(state.visited, vec![root]);
        assert_eq!(state.cells_visited(), 1);
        assert_eq!(state.active_corridor, Some(0));
        assert_eq!(state.total_distance(), 0.0);
        assert_eq!((state.items_collected, state.items_held), (0, 0));
    }

    #[test]
    fn test_terminal_phases() {
        assert_eq!(TraversalPhase::default(), TraversalPhase::AtCorridor);
        assert!(!TraversalPhase::AtCorridor.is_terminal());
        assert!(!TraversalPhase::AtFork.is_terminal());
        assert!(TraversalPhase::AtDeadEnd.is_terminal());
        assert!(TraversalPhase::Won.is_terminal());
        assert!(TraversalPhase::Lost(LossReason::SanityDepleted).is_terminal());

        assert_eq!(TraversalPhase::AtFork.outcome(), None);
        assert_eq!(
            TraversalPhase::AtDeadEnd.outcome(),
            Some(Outcome::Lost(LossReason::DeadEnd))
        );
        assert_eq!(TraversalPhase::Won.outcome(), Some(Outcome::Won));
    }

    #[test]
    fn test_hash_tracks_progress() {
        let seed = NumericSeed(9);
        let mut state = TraversalState::new(CellId(1));
        let before = state.compute_hash(seed);
        assert_eq!(before, state.clone().compute_hash(seed));

        state.distance_into_corridor = 0.5;
        let moved = state.compute_hash(seed);
        assert_ne!(before, moved);

        state.items_held = 1;
        assert_ne!(moved, state.compute_hash(seed));
        assert_ne!(before, TraversalState::new(CellId(1)).compute_hash(NumericSeed(10)));
    }

    #[test]
    fn test_snapshot_keeps_path_and_progress() {
        let mut state = TraversalState::new(CellId(1));
        state.visited.push(CellId(2));
        state.current_cell = CellId(2);
        state.distance_into_corridor = 1.25;
        state.completed_distance = 4.0;
        state.fear = 3.0;
        state.items_collected = 2;
        state.items_held = 1;

        let snapshot = state.snapshot();
        assert_eq!(snapshot.visited, vec![CellId(1), CellId(2)]);
        assert_eq!(snapshot.current_cell, CellId(2));
        assert_eq!(snapshot.pending_corridor_index, Some(0));
        assert_eq!(snapshot.distance_into_corridor, 1.25);
        assert_eq!(snapshot.completed_distance, 4.0);
        assert_eq!(snapshot.fear, 3.0);
        assert_eq!((snapshot.items_collected, snapshot.items_held), (2, 1));
    }
}
