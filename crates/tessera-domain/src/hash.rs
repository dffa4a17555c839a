//! Content hashes for downloaded assets
//!
//! Hashes are computed by the download layer; this crate only compares
//! them during deduplication.

use serde::{Deserialize, Serialize};

/// Hash of a record's downloaded asset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ContentHash {
    /// Cryptographic digest, hex encoded. Matches on exact equality.
    Sha256(String),
    /// 64-bit perceptual image hash. Matches within a bounded Hamming
    /// distance.
    Perceptual(u64),
}

impl ContentHash {
    /// Whether two hashes identify the same asset.
    ///
    /// Hashes of different kinds never match: a digest and a perceptual
    /// hash carry no comparable information.
    pub fn matches(&self, other: &ContentHash, max_hamming_distance: u32) -> bool {
        match (self, other) {
            (ContentHash::Sha256(a), ContentHash::Sha256(b)) => {
                a.eq_ignore_ascii_case(b)
            }
            (ContentHash::Perceptual(a), ContentHash::Perceptual(b)) => {
                (a ^ b).count_ones() <= max_hamming_distance
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_match_case_insensitive() {
        let a = ContentHash::Sha256("ABCDEF".to_string());
        let b = ContentHash::Sha256("abcdef".to_string());
        assert!(a.matches(&b, 0));
    }

    #[test]
    fn test_perceptual_within_hamming_bound() {
        let a = ContentHash::Perceptual(0b1010_1010);
        let b = ContentHash::Perceptual(0b1010_1000);
        assert!(a.matches(&b, 1));
        assert!(!a.matches(&b, 0));
    }

    #[test]
    fn test_mixed_kinds_never_match() {
        let a = ContentHash::Sha256("00".to_string());
        let b = ContentHash::Perceptual(0);
        assert!(!a.matches(&b, 64));
    }
}
