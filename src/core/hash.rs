//! State Hashing for Verification
//!
//! Provides deterministic hashing of traversal state for:
//! - Replay validation (same seed + same inputs = same hash)
//! - Saved session integrity checks

use sha2::{Digest, Sha256};

/// Hash output type (256 bits / 32 bytes)
pub type StateHash = [u8; 32];

/// Deterministic hasher for engine state.
///
/// Wraps SHA-256 with typed little-endian helpers.
/// Order of updates is critical for determinism.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Create a new hasher with domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for traversal state.
    pub fn for_traversal_state() -> Self {
        Self::new(b"NIGHTMARE_MAZE_TRAVERSAL_V1")
    }

    /// Create hasher for saved sessions.
    pub fn for_saved_session() -> Self {
        Self::new(b"NIGHTMARE_MAZE_SAVE_V1")
    }

    /// Update with a length-prefixed string.
    #[inline]
    pub fn update_str(&mut self, value: &str) {
        self.update_u64(value.len() as u64);
        self.hasher.update(value.as_bytes());
    }

    /// Update with a u8 value.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Update with a u32 value (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a u64 value (little-endian).
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with an f64 value (IEEE-754 bits, little-endian).
    #[inline]
    pub fn update_f64(&mut self, value: f64) {
        self.update_u64(value.to_bits());
    }

    /// Update with a boolean.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(value as u8);
    }

    /// Update with an optional u8, tagging presence.
    #[inline]
    pub fn update_opt_u8(&mut self, value: Option<u8>) {
        match value {
            Some(v) => {
                self.update_u8(1);
                self.update_u8(v);
            }
            None => self.update_u8(0),
        }
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> StateHash {
        self.hasher.finalize().into()
    }
}

/// Compute traversal state hash.
///
/// The numeric seed and step count are always hashed first; the closure
/// adds the state-specific data.
pub fn compute_state_hash<F>(numeric_seed: u64, step: u32, add_state: F) -> StateHash
where
    F: FnOnce(&mut StateHasher),
{
    let mut hasher = StateHasher::for_traversal_state();

    hasher.update_u64(numeric_seed);
    hasher.update_u32(step);

    add_state(&mut hasher);

    hasher.finalize()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_hasher_determinism() {
        let make_hash = || {
            let mut hasher = StateHasher::for_traversal_state();
            hasher.update_u32(100);
            hasher.update_u64(12345);
            hasher.update_f64(5.5);
            hasher.update_str("dark blood shadow");
            hasher.update_opt_u8(Some(2));
            hasher.update_bool(true);
            hasher.finalize()
        };

        assert_eq!(make_hash(), make_hash());
    }

    #[test]
    fn test_hash_order_matters() {
        let hash1 = {
            let mut h = StateHasher::new(b"test");
            h.update_u32(1);
            h.update_u32(2);
            h.finalize()
        };

        let hash2 = {
            let mut h = StateHasher::new(b"test");
            h.update_u32(2);
            h.update_u32(1);
            h.finalize()
        };

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_optional_tagging() {
        let none = {
            let mut h = StateHasher::new(b"test");
            h.update_opt_u8(None);
            h.update_u8(0);
            h.finalize()
        };
        let some_zero = {
            let mut h = StateHasher::new(b"test");
            h.update_opt_u8(Some(0));
            h.finalize()
        };
        assert_ne!(none, some_zero);
    }

    #[test]
    fn test_domain_separation() {
        let mut traversal = StateHasher::for_traversal_state();
        let mut save = StateHasher::for_saved_session();
        traversal.update_u64(7);
        save.update_u64(7);

        assert_ne!(traversal.finalize(), save.finalize());
    }

    #[test]
    fn test_compute_state_hash() {
        let hash = compute_state_hash(12345, 3, |hasher| {
            hasher.update_f64(5.0);
            hasher.update_bool(true);
        });

        let hash2 = compute_state_hash(12345, 3, |hasher| {
            hasher.update_f64(5.0);
            hasher.update_bool(true);
        });

        assert_eq!(hash, hash2);

        let hash3 = compute_state_hash(12345, 4, |hasher| {
            hasher.update_f64(5.0);
            hasher.update_bool(true);
        });

        assert_ne!(hash, hash3);
    }
}
