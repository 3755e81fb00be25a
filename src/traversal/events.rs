//! Traversal Events
//!
//! Emitted by the engine so the UI layer can react (sounds, prompts,
//! end-of-run screens) without polling state.

use serde::{Deserialize, Serialize};

use crate::maze::cell::{CellId, CellKind, Heading};
use crate::traversal::state::LossReason;

/// Traversal event data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TraversalEventData {
    /// Arrived at a cell
    CellReached {
        /// Cell reached
        cell: CellId,
        /// Its depth
        depth: u32,
        /// Its classification
        kind: CellKind,
    },

    /// Stopped at a junction
    ForkReached {
        /// Fork cell
        cell: CellId,
        /// Number of corridors on offer
        choices: usize,
    },

    /// Player picked a corridor at a junction
    ForkChosen {
        /// Fork cell
        cell: CellId,
        /// Corridor index taken
        index: usize,
        /// Corridor heading
        heading: Heading,
        /// An item was spent to pass a blockade
        item_spent: bool,
    },

    /// Picked up an item on arrival
    CollectibleFound {
        /// Cell holding the item
        cell: CellId,
    },

    /// Met something on arrival
    VillainEncountered {
        /// Cell it lurked in
        cell: CellId,
    },

    /// Run won
    Won {
        /// Depth of the winning cell
        depth: u32,
        /// Odometer at the win
        distance: f64,
    },

    /// Run lost
    Lost {
        /// Why
        reason: LossReason,
    },
}

/// An event stamped with the number of cells reached when it fired.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraversalEvent {
    /// `visited.len()` at emission
    pub step: u32,

    /// Event data
    pub data: TraversalEventData,
}

impl TraversalEvent {
    /// Create a new event.
    pub fn new(step: u32, data: TraversalEventData) -> Self {
        Self { step, data }
    }

    /// True for `Won` and `Lost`.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.data,
            TraversalEventData::Won { .. } | TraversalEventData::Lost { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_events() {
        let won = TraversalEvent::new(5, TraversalEventData::Won { depth: 4, distance: 17.0 });
        let lost = TraversalEvent::new(2, TraversalEventData::Lost { reason: LossReason::DeadEnd });
        let fork = TraversalEvent::new(2, TraversalEventData::ForkReached { cell: CellId(1), choices: 2 });

        assert!(won.is_terminal());
        assert!(lost.is_terminal());
        assert!(!fork.is_terminal());
    }

    #[test]
    fn test_event_json_shape() {
        let event = TraversalEvent::new(
            3,
            TraversalEventData::ForkChosen {
                cell: CellId(9),
                index: 1,
                heading: Heading::Right,
                item_spent: true,
            },
        );
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"step":3,"data":{"ForkChosen":{"cell":9,"index":1,"heading":"Right","item_spent":true}}}"#);
    }
}
