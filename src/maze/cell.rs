//! Maze Graph Types
//!
//! Cells, corridors and the UI-facing fork projection.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::rng::splitmix64;
use crate::core::seed::NumericSeed;

// =============================================================================
// CELL ID
// =============================================================================

/// Stable cell identifier.
///
/// Ids are derived, never allocated: the root id is a function of the
/// numeric seed and every child id is a function of its parent id and the
/// heading of the corridor leading to it. The same path therefore always
/// names the same cell, whatever order cells were generated in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellId(pub u64);

impl CellId {
    const ROOT_SALT: u64 = 0x4E49_4748_544D_4152; // "NIGHTMAR"

    /// Start cell for a seed.
    pub fn root(seed: NumericSeed) -> Self {
        let mut s = seed.value() ^ Self::ROOT_SALT;
        Self(splitmix64(&mut s))
    }

    /// Cell reached from this one by heading `heading`.
    pub fn child(self, heading: Heading) -> Self {
        let mut s = self.0 ^ (heading as u64 + 1).wrapping_mul(0xA24B_AED4_963E_E407);
        Self(splitmix64(&mut s))
    }

    /// Raw value.
    #[inline]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

// =============================================================================
// HEADING
// =============================================================================

/// Direction a corridor leaves its cell, relative to the direction of travel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Heading {
    /// Bear left
    Left = 0,
    /// Straight on
    Ahead = 1,
    /// Bear right
    Right = 2,
}

impl Heading {
    /// All headings in display order.
    pub const ALL: [Heading; 3] = [Heading::Left, Heading::Ahead, Heading::Right];

    /// Lowercase label for UI.
    pub fn label(self) -> &'static str {
        match self {
            Heading::Left => "left",
            Heading::Ahead => "ahead",
            Heading::Right => "right",
        }
    }
}

// =============================================================================
// CORRIDOR & CELL
// =============================================================================

/// Directed edge between two cells.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Corridor {
    /// Source cell
    pub from: CellId,
    /// Destination cell
    pub to: CellId,
    /// Traversal length in distance units (always positive)
    pub length: f64,
    /// Exit heading from the source cell
    pub heading: Heading,
    /// A blockade that costs one held item to pass
    pub blocked: bool,
}

/// Classification of a cell by its onward corridors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// No way onward
    DeadEnd,
    /// Exactly one way onward, the ride keeps going
    Passage,
    /// Two or more ways onward, the player must choose
    Fork,
}

/// A node of the maze graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Stable id
    pub id: CellId,
    /// Number of corridors between the start cell and this one
    pub depth: u32,
    /// Onward corridors, ordered Left, Ahead, Right
    pub corridors: Vec<Corridor>,
    /// An item lies here (eases fear when reached)
    pub has_collectible: bool,
    /// Something lurks here (spikes fear when reached)
    pub has_villain: bool,
}

impl Cell {
    /// Classify by number of onward corridors.
    pub fn kind(&self) -> CellKind {
        match self.corridors.len() {
            0 => CellKind::DeadEnd,
            1 => CellKind::Passage,
            _ => CellKind::Fork,
        }
    }

    /// True when the player has to pick a corridor here.
    #[inline]
    pub fn is_fork(&self) -> bool {
        self.kind() == CellKind::Fork
    }

    /// Corridor by index.
    pub fn corridor(&self, index: usize) -> Option<&Corridor> {
        self.corridors.get(index)
    }

    /// Project the onward corridors into selectable options.
    pub fn fork_choices(&self) -> Vec<ForkChoice> {
        self.corridors
            .iter()
            .enumerate()
            .map(|(index, corridor)| ForkChoice {
                index,
                heading: corridor.heading,
                length: corridor.length,
                destination: corridor.to,
                blocked: corridor.blocked,
            })
            .collect()
    }
}

/// One selectable option at a fork, as shown to the player.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ForkChoice {
    /// Index to pass to `choose_fork`
    pub index: usize,
    /// Which way the corridor leaves
    pub heading: Heading,
    /// Corridor length
    pub length: f64,
    /// Cell the corridor leads to
    pub destination: CellId,
    /// Passing costs one held item
    pub blocked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor(from: CellId, heading: Heading) -> Corridor {
        Corridor {
            from,
            to: from.child(heading),
            length: 3.0,
            heading,
            blocked: heading == Heading::Right,
        }
    }

    #[test]
    fn test_ids_are_path_derived() {
        let root = CellId::root(NumericSeed(99));
        assert_eq!(root, CellId::root(NumericSeed(99)));
        assert_ne!(root, CellId::root(NumericSeed(100)));

        let left = root.child(Heading::Left);
        let right = root.child(Heading::Right);
        assert_ne!(left, right);
        assert_eq!(left, root.child(Heading::Left));
        assert_ne!(left.child(Heading::Ahead), right.child(Heading::Ahead));
    }

    #[test]
    fn test_kind_from_corridor_count() {
        let id = CellId(1);
        let mut cell = Cell {
            id,
            depth: 0,
            corridors: Vec::new(),
            has_collectible: false,
            has_villain: false,
        };
        assert_eq!(cell.kind(), CellKind::DeadEnd);

        cell.corridors.push(corridor(id, Heading::Ahead));
        assert_eq!(cell.kind(), CellKind::Passage);
        assert!(!cell.is_fork());

        cell.corridors.push(corridor(id, Heading::Right));
        assert_eq!(cell.kind(), CellKind::Fork);
        assert!(cell.is_fork());
    }

    #[test]
    fn test_fork_choices_follow_corridor_order() {
        let id = CellId(7);
        let cell = Cell {
            id,
            depth: 2,
            corridors: vec![corridor(id, Heading::Left), corridor(id, Heading::Right)],
            has_collectible: false,
            has_villain: false,
        };

        let choices = cell.fork_choices();
        assert_eq!(choices.len(), 2);
        assert_eq!(choices[0].index, 0);
        assert_eq!(choices[0].heading, Heading::Left);
        assert_eq!(choices[1].heading, Heading::Right);
        assert_eq!(choices[1].destination, id.child(Heading::Right));
        assert!(!choices[0].blocked);
        assert!(choices[1].blocked);
    }
}
