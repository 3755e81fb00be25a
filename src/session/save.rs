//! Saved Session Codec
//!
//! What survives between runs of the host: the seed, the path through the
//! maze and the game-over flag. Maze content is never stored; it is
//! regenerated from the seed on continue.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::core::hash::{StateHash, StateHasher};
use crate::core::seed::Seed;
use crate::traversal::state::TraversalSnapshot;

/// Current save format version.
pub const SAVE_VERSION: u8 = 1;

/// Save codec error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveError {
    /// Serialization failed.
    #[error("failed to encode saved session: {0}")]
    Encode(String),

    /// Bytes or text are not a saved session.
    #[error("failed to decode saved session: {0}")]
    Decode(String),

    /// Content does not match its checksum.
    #[error("saved session checksum mismatch")]
    ChecksumMismatch,

    /// Written by an incompatible version.
    #[error("unsupported save version: expected {expected}, got {got}")]
    UnsupportedVersion {
        /// Version this build reads
        expected: u8,
        /// Version found in the data
        got: u8,
    },
}

/// Persisted session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedSession {
    /// Format version
    pub version: u8,
    /// Canonical seed phrase
    pub seed: Seed,
    /// Path and progress
    pub snapshot: TraversalSnapshot,
    /// Run already ended
    pub is_game_over: bool,
    /// SHA-256 over everything above
    pub checksum: StateHash,
}

impl SavedSession {
    /// Build a save and stamp its checksum.
    pub fn new(seed: Seed, snapshot: TraversalSnapshot, is_game_over: bool) -> Self {
        let mut save = Self {
            version: SAVE_VERSION,
            seed,
            snapshot,
            is_game_over,
            checksum: [0u8; 32],
        };
        save.checksum = save.compute_checksum();
        save
    }

    /// Checksum of the current contents.
    pub fn compute_checksum(&self) -> StateHash {
        let mut hasher = StateHasher::for_saved_session();
        hasher.update_u8(self.version);
        hasher.update_str(self.seed.as_str());

        let snapshot = &self.snapshot;
        hasher.update_u64(snapshot.current_cell.value());
        hasher.update_u32(snapshot.visited.len() as u32);
        for id in &snapshot.visited {
            hasher.update_u64(id.value());
        }
        hasher.update_opt_u8(snapshot.pending_corridor_index);
        hasher.update_f64(snapshot.distance_into_corridor);
        hasher.update_f64(snapshot.completed_distance);
        hasher.update_f64(snapshot.fear);
        hasher.update_u32(snapshot.items_collected);
        hasher.update_u32(snapshot.items_held);

        hasher.update_bool(self.is_game_over);
        hasher.finalize()
    }

    /// Check version and checksum.
    pub fn verify(&self) -> Result<(), SaveError> {
        if self.version != SAVE_VERSION {
            return Err(SaveError::UnsupportedVersion {
                expected: SAVE_VERSION,
                got: self.version,
            });
        }
        if self.compute_checksum() != self.checksum {
            warn!(
                "Saved session checksum mismatch (stored {})",
                hex::encode(&self.checksum[..8])
            );
            return Err(SaveError::ChecksumMismatch);
        }
        Ok(())
    }

    /// Serialize to bytes using bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SaveError> {
        bincode::serialize(self).map_err(|e| SaveError::Encode(e.to_string()))
    }

    /// Deserialize from bytes and verify.
    pub fn from_bytes(data: &[u8]) -> Result<Self, SaveError> {
        let save: Self =
            bincode::deserialize(data).map_err(|e| SaveError::Decode(e.to_string()))?;
        save.verify()?;
        Ok(save)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, SaveError> {
        serde_json::to_string_pretty(self).map_err(|e| SaveError::Encode(e.to_string()))
    }

    /// Deserialize from JSON and verify.
    pub fn from_json(json: &str) -> Result<Self, SaveError> {
        let save: Self =
            serde_json::from_str(json).map_err(|e| SaveError::Decode(e.to_string()))?;
        save.verify()?;
        Ok(save)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::cell::CellId;

    fn sample() -> SavedSession {
        let snapshot = TraversalSnapshot {
            current_cell: CellId(3),
            visited: vec![CellId(1), CellId(2), CellId(3)],
            pending_corridor_index: Some(1),
            distance_into_corridor: 1.0 / 3.0,
            completed_distance: 9.0,
            fear: 4.5,
            items_collected: 2,
            items_held: 1,
        };
        SavedSession::new(Seed::normalize("night maze ghost").unwrap(), snapshot, false)
    }

    #[test]
    fn test_bincode_roundtrip() {
        let save = sample();
        let bytes = save.to_bytes().unwrap();
        assert_eq!(SavedSession::from_bytes(&bytes).unwrap(), save);
    }

    #[test]
    fn test_json_roundtrip() {
        let save = sample();
        let json = save.to_json().unwrap();
        assert!(json.contains("night maze ghost"));
        assert_eq!(SavedSession::from_json(&json).unwrap(), save);
    }

    #[test]
    fn test_tampered_save_is_rejected() {
        let mut save = sample();
        save.snapshot.fear = 0.0;
        let bytes = save.to_bytes().unwrap();
        assert_eq!(
            SavedSession::from_bytes(&bytes),
            Err(SaveError::ChecksumMismatch)
        );
    }

    #[test]
    fn test_tampered_inventory_is_rejected() {
        let mut save = sample();
        save.snapshot.items_held = 5;
        let json = save.to_json().unwrap();
        assert_eq!(
            SavedSession::from_json(&json),
            Err(SaveError::ChecksumMismatch)
        );
    }

    #[test]
    fn test_unsupported_version() {
        let mut save = sample();
        save.version = 9;
        save.checksum = save.compute_checksum();
        assert_eq!(
            save.verify(),
            Err(SaveError::UnsupportedVersion {
                expected: SAVE_VERSION,
                got: 9
            })
        );
    }

    #[test]
    fn test_invalid_seed_in_json_is_a_decode_error() {
        let json = sample().to_json().unwrap().replace("night maze ghost", "not a valid seed");
        assert!(matches!(
            SavedSession::from_json(&json),
            Err(SaveError::Decode(_))
        ));
    }

    #[test]
    fn test_garbage_bytes() {
        assert!(matches!(
            SavedSession::from_bytes(&[0xFF, 0x01]),
            Err(SaveError::Decode(_))
        ));
    }
}
