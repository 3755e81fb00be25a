//! Maze Graph
//!
//! - `cell`: ids, cells, corridors, fork projection
//! - `generator`: lazy per-cell generation from the seed

pub mod cell;
pub mod generator;

pub use cell::{Cell, CellId, CellKind, Corridor, ForkChoice, Heading};
pub use generator::{MazeConfig, MazeError, MazeGenerator};
