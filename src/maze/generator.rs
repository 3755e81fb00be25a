//! Lazy Maze Generator
//!
//! Cells live in an arena indexed by a sparse id map. A cell is generated
//! the first time it is asked for, from its own RNG sub-stream keyed by
//! `(NumericSeed, CellId)`, so generation order never changes content.
//!
//! Only the root and destinations of already generated corridors can be
//! generated. Every cell in the arena is therefore reachable from the root
//! by construction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{trace, warn};

use crate::config::ConfigError;
use crate::core::rng::DeterministicRng;
use crate::core::seed::{NumericSeed, Seed};
use crate::maze::cell::{Cell, CellId, Corridor, Heading};

/// Maze generation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MazeError {
    /// Id is neither the root nor the destination of a generated corridor.
    #[error("cell {0} is not reachable from any generated cell")]
    UnknownCell(CellId),

    /// The arena is full.
    #[error("maze generation exhausted after {limit} cells")]
    GenerationExhausted {
        /// Configured cell bound
        limit: usize,
    },
}

/// Tuning knobs for maze shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeConfig {
    /// Relative weights for 0, 1, 2 and 3 onward corridors.
    pub branch_weights: [u32; 4],
    /// Shortest corridor, in whole distance units.
    pub min_corridor_length: u32,
    /// Longest corridor, in whole distance units (inclusive).
    pub max_corridor_length: u32,
    /// Cell count at which generation gives up.
    pub max_cells: usize,
    /// Chance that a cell holds a collectible.
    pub collectible_chance: f64,
    /// Chance that a cell holds a villain.
    pub villain_chance: f64,
    /// Chance that a fork corridor is blockaded.
    pub blockade_chance: f64,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            branch_weights: [1, 6, 3, 1],
            min_corridor_length: 2,
            max_corridor_length: 6,
            max_cells: 4096,
            collectible_chance: 0.15,
            villain_chance: 0.10,
            blockade_chance: 0.20,
        }
    }
}

impl MazeConfig {
    /// Check that every knob is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.branch_weights.iter().all(|w| *w == 0) {
            return Err(ConfigError::Invalid("branch_weights must not all be zero"));
        }
        if self.min_corridor_length == 0 {
            return Err(ConfigError::Invalid("min_corridor_length must be at least 1"));
        }
        if self.min_corridor_length > self.max_corridor_length {
            return Err(ConfigError::Invalid(
                "min_corridor_length must not exceed max_corridor_length",
            ));
        }
        if self.max_cells == 0 {
            return Err(ConfigError::Invalid("max_cells must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.collectible_chance) {
            return Err(ConfigError::Invalid("collectible_chance must be within [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.villain_chance) {
            return Err(ConfigError::Invalid("villain_chance must be within [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.blockade_chance) {
            return Err(ConfigError::Invalid("blockade_chance must be within [0, 1]"));
        }
        Ok(())
    }
}

/// Generation status of a known id.
#[derive(Clone, Copy, Debug)]
enum Slot {
    /// Reachable, not generated yet
    Pending { depth: u32 },
    /// Generated, index into the arena
    Generated(usize),
}

/// Lazily generated maze graph for one seed.
#[derive(Clone, Debug)]
pub struct MazeGenerator {
    seed: NumericSeed,
    root: CellId,
    config: MazeConfig,
    cells: Vec<Cell>,
    slots: BTreeMap<CellId, Slot>,
}

impl MazeGenerator {
    /// Create a generator with only the root known.
    pub fn new(seed: NumericSeed, config: MazeConfig) -> Self {
        let root = CellId::root(seed);
        let mut slots = BTreeMap::new();
        slots.insert(root, Slot::Pending { depth: 0 });

        Self {
            seed,
            root,
            config,
            cells: Vec::new(),
            slots,
        }
    }

    /// Create a generator for a canonical seed phrase.
    pub fn from_seed(seed: &Seed, config: MazeConfig) -> Self {
        Self::new(seed.to_numeric(), config)
    }

    /// Numeric seed.
    pub fn numeric_seed(&self) -> NumericSeed {
        self.seed
    }

    /// Start cell id.
    pub fn root(&self) -> CellId {
        self.root
    }

    /// Active configuration.
    pub fn config(&self) -> &MazeConfig {
        &self.config
    }

    /// Number of cells generated so far.
    pub fn generated_count(&self) -> usize {
        self.cells.len()
    }

    /// True if `id` is the root or the destination of a generated corridor.
    pub fn is_known(&self, id: CellId) -> bool {
        self.slots.contains_key(&id)
    }

    /// Look up an already generated cell without generating.
    pub fn get(&self, id: CellId) -> Option<&Cell> {
        match self.slots.get(&id) {
            Some(Slot::Generated(index)) => self.cells.get(*index),
            _ => None,
        }
    }

    /// Generated cells in generation order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Return the cell for `id`, generating it on first access.
    pub fn cell_at(&mut self, id: CellId) -> Result<&Cell, MazeError> {
        let depth = match self.slots.get(&id).copied() {
            Some(Slot::Generated(index)) => return Ok(&self.cells[index]),
            Some(Slot::Pending { depth }) => depth,
            None => return Err(MazeError::UnknownCell(id)),
        };

        let limit = self.config.max_cells;
        if self.cells.len() >= limit {
            warn!("Maze generation exhausted at {} cells", limit);
            return Err(MazeError::GenerationExhausted { limit });
        }

        let cell = self.generate(id, depth);
        trace!(
            "Generated cell {} at depth {} with {} corridors",
            id,
            depth,
            cell.corridors.len()
        );

        for corridor in &cell.corridors {
            self.slots
                .entry(corridor.to)
                .or_insert(Slot::Pending { depth: depth + 1 });
        }

        let index = self.cells.len();
        self.cells.push(cell);
        self.slots.insert(id, Slot::Generated(index));

        Ok(&self.cells[index])
    }

    /// Build one cell from its sub-stream.
    ///
    /// Draw order is fixed: branch count, heading shuffle, one length per
    /// corridor, collectible roll, villain roll, then one blockade roll per
    /// corridor of a fork.
    fn generate(&self, id: CellId, depth: u32) -> Cell {
        let mut rng = DeterministicRng::substream(self.seed.value(), id.value());
        let is_root = id == self.root;

        let mut weights = self.config.branch_weights;
        if is_root {
            // The ride never starts in a dead end
            weights[0] = 0;
        }
        let branches = rng.next_weighted(&weights).unwrap_or(1);

        let mut headings = Heading::ALL;
        rng.shuffle(&mut headings);
        let mut chosen = headings[..branches].to_vec();
        chosen.sort();

        // Corridors are never shorter than one unit
        let min_len = self.config.min_corridor_length.max(1);
        let max_len = self.config.max_corridor_length.max(min_len).saturating_add(1);
        let mut corridors: Vec<Corridor> = chosen
            .into_iter()
            .map(|heading| Corridor {
                from: id,
                to: id.child(heading),
                length: rng.next_range(min_len, max_len) as f64,
                heading,
                blocked: false,
            })
            .collect();

        let has_collectible = rng.next_bool(self.config.collectible_chance) && !is_root;
        let has_villain = rng.next_bool(self.config.villain_chance) && !is_root;

        if corridors.len() >= 2 && !is_root {
            for corridor in corridors.iter_mut() {
                corridor.blocked = rng.next_bool(self.config.blockade_chance);
            }
            // A fork always keeps one way open
            if corridors.iter().all(|c| c.blocked) {
                corridors[0].blocked = false;
            }
        }

        Cell {
            id,
            depth,
            corridors,
            has_collectible,
            has_villain,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
