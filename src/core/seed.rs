//! Seed Phrase Codec
//!
//! Turns whatever the player typed into a canonical three-word seed and
//! derives the numeric RNG seed from it.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Number of words in a seed phrase.
pub const SEED_WORD_COUNT: usize = 3;

/// Vocabulary used for randomized seed suggestions.
pub const SEED_VOCABULARY: &[&str] = &[
    "red", "clown", "laugh", "night", "maze", "ghost", "shadow",
];

/// Seed validation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeedError {
    /// Input does not reduce to three alphabetic words.
    #[error("seed must be three words made of letters, got {input:?}")]
    InvalidSeedFormat {
        /// The raw text as typed.
        input: String,
    },
}

/// Canonical seed phrase: three lowercase ASCII words joined by single spaces.
///
/// Can only be built through [`Seed::normalize`], so holding a `Seed`
/// proves the phrase is well formed.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Seed(String);

impl Seed {
    /// Normalize raw player input into a canonical seed.
    ///
    /// Trims, collapses internal whitespace and lowercases. Fails unless
    /// exactly three words remain and each is made of ASCII letters only.
    pub fn normalize(raw: &str) -> Result<Self, SeedError> {
        let words: Vec<String> = raw
            .split_whitespace()
            .map(|word| word.to_ascii_lowercase())
            .collect();

        let well_formed = words.len() == SEED_WORD_COUNT
            && words
                .iter()
                .all(|word| word.bytes().all(|b| b.is_ascii_lowercase()));

        if !well_formed {
            return Err(SeedError::InvalidSeedFormat {
                input: raw.to_string(),
            });
        }

        Ok(Self(words.join(" ")))
    }

    /// The canonical phrase.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate the three words.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.0.split(' ')
    }

    /// Derive the numeric RNG seed.
    pub fn to_numeric(&self) -> NumericSeed {
        NumericSeed::derive(self)
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Seed {
    type Error = SeedError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::normalize(&value)
    }
}

impl From<Seed> for String {
    fn from(seed: Seed) -> Self {
        seed.0
    }
}

impl std::str::FromStr for Seed {
    type Err = SeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::normalize(s)
    }
}

/// Numeric seed feeding [`DeterministicRng`](crate::core::rng::DeterministicRng).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NumericSeed(pub u64);

impl NumericSeed {
    /// Derive from a canonical seed.
    ///
    /// SHA-256 over a domain separator and the phrase bytes; the first
    /// 8 bytes, little-endian. Stable across platforms and runs.
    pub fn derive(seed: &Seed) -> Self {
        let mut hasher = Sha256::new();

        // Domain separator
        hasher.update(b"NIGHTMARE_MAZE_SEED_V1");
        hasher.update(seed.as_str().as_bytes());

        let hash = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash[0..8]);
        Self(u64::from_le_bytes(bytes))
    }

    /// Raw value.
    #[inline]
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Suggest a random three-word phrase from [`SEED_VOCABULARY`].
///
/// Words are drawn uniformly with replacement. This is a UI convenience
/// only and plays no part in maze determinism.
pub fn random_seed_text<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..SEED_WORD_COUNT)
        .map(|_| SEED_VOCABULARY[rng.gen_range(0..SEED_VOCABULARY.len())])
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_normalize_collapses_whitespace_and_case() {
        let seed = Seed::normalize("  Dark   Blood Shadow ").unwrap();
        assert_eq!(seed.as_str(), "dark blood shadow");

        let seed = Seed::normalize("dark\tblood\nshadow").unwrap();
        assert_eq!(seed.as_str(), "dark blood shadow");
    }

    #[test]
    fn test_normalize_rejects_wrong_word_count() {
        for raw in ["", "   ", "dark", "dark blood", "dark blood shadow moon"] {
            assert!(matches!(
                Seed::normalize(raw),
                Err(SeedError::InvalidSeedFormat { .. })
            ));
        }
    }

    #[test]
    fn test_normalize_rejects_non_letters() {
        for raw in ["dark bl00d shadow", "dark blood-red shadow", "dark blood shadow!", "café noir nuit"] {
            assert!(Seed::normalize(raw).is_err(), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn test_error_keeps_raw_input() {
        let err = Seed::normalize("only two").unwrap_err();
        assert_eq!(
            err,
            SeedError::InvalidSeedFormat {
                input: "only two".to_string()
            }
        );
    }

    #[test]
    fn test_numeric_seed_is_stable() {
        let a = Seed::normalize("test seed alpha").unwrap();
        let b = Seed::normalize("TEST  seed Alpha").unwrap();
        assert_eq!(a.to_numeric(), b.to_numeric());

        let c = Seed::normalize("test seed beta").unwrap();
        assert_ne!(a.to_numeric(), c.to_numeric());
    }

    #[test]
    fn test_seed_serde_validates() {
        let seed = Seed::normalize("red clown laugh").unwrap();
        let json = serde_json::to_string(&seed).unwrap();
        assert_eq!(json, "\"red clown laugh\"");

        let back: Seed = serde_json::from_str(&json).unwrap();
        assert_eq!(back, seed);

        assert!(serde_json::from_str::<Seed>("\"not a seed 42\"").is_err());
    }

    #[test]
    fn test_random_seed_text_is_valid_seed() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let text = random_seed_text(&mut rng);
            let seed = Seed::normalize(&text).unwrap();
            assert!(seed.words().all(|w| SEED_VOCABULARY.contains(&w)));
        }
    }

    proptest! {
        #[test]
        fn prop_normalize_ignores_spacing_and_case(
            words in prop::collection::vec("[a-zA-Z]{1,8}", 3),
            pads in prop::collection::vec(" {1,4}", 4),
        ) {
            let raw = format!("{}{}{}{}{}{}{}", pads[0], words[0], pads[1], words[1], pads[2], words[2], pads[3]);
            let seed = Seed::normalize(&raw).unwrap();
            let expected = words.iter().map(|w| w.to_ascii_lowercase()).collect::<Vec<_>>().join(" ");
            prop_assert_eq!(seed.as_str(), expected.as_str());
        }

        #[test]
        fn prop_wrong_word_count_is_rejected(
            words in prop::collection::vec("[a-z]{1,8}", 0..8usize)
                .prop_filter("not three words", |w| w.len() != 3),
        ) {
            let raw = words.join(" ");
            prop_assert!(Seed::normalize(&raw).is_err());
        }

        #[test]
        fn prop_digits_are_rejected(
            a in "[a-z]{1,5}",
            b in "[a-z]{0,3}[0-9][a-z]{0,3}",
            c in "[a-z]{1,5}",
        ) {
            let raw = format!("{a} {b} {c}");
            prop_assert!(Seed::normalize(&raw).is_err());
        }
    }
}
