//! Similarity scoring between two records
//!
//! Combines independent signals, never a single brittle rule. A missing
//! field is neutral: signals that cannot be evaluated are left out of
//! the weighted sum entirely rather than counting against the pair.

use strsim::{jaro_winkler, normalized_levenshtein};
use tessera_domain::Record;

use crate::config::DedupConfig;
use crate::normalize::MatchKeys;

/// Result of comparing two records.
#[derive(Clone, Debug, PartialEq)]
pub struct SimilarityScore {
    /// Overall similarity in [0, 1].
    pub score: f64,
    /// Which strategies fired, human readable.
    pub reasons: Vec<String>,
}

impl SimilarityScore {
    fn exact_url() -> Self {
        Self {
            score: 1.0,
            reasons: vec!["exact URL match".to_string()],
        }
    }
}

/// Score a pair of records, computing matching keys on the fly.
pub fn similarity(a: &Record, b: &Record, config: &DedupConfig) -> SimilarityScore {
    similarity_with_keys(
        a,
        &MatchKeys::for_record(a),
        b,
        &MatchKeys::for_record(b),
        config,
    )
}

/// Score a pair of records with precomputed matching keys. The
/// orchestrator computes keys once per record and reuses them across all
/// intra-block comparisons.
pub fn similarity_with_keys(
    a: &Record,
    keys_a: &MatchKeys,
    b: &Record,
    keys_b: &MatchKeys,
    config: &DedupConfig,
) -> SimilarityScore {
    // Two entries pointing at the same asset are always duplicates,
    // whatever the rest of their metadata says.
    if let (Some(da), Some(db)) = (&keys_a.download_url_key, &keys_b.download_url_key) {
        if da == db {
            return SimilarityScore::exact_url();
        }
    }
    if !keys_a.source_url_key.is_empty() && keys_a.source_url_key == keys_b.source_url_key {
        return SimilarityScore::exact_url();
    }

    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    let mut reasons = Vec::new();
    let mut hash_matched = false;

    if !keys_a.title_key.is_empty() && !keys_b.title_key.is_empty() {
        let ratio = title_ratio(&keys_a.title_key, &keys_b.title_key);
        weighted_sum += config.title_weight * ratio;
        weight_total += config.title_weight;
        reasons.push(format!("title similarity {:.0}%", ratio * 100.0));
    }

    if let Some(overlap) = metadata_overlap(a, b) {
        weighted_sum += config.metadata_weight * overlap;
        weight_total += config.metadata_weight;
        reasons.push(format!("metadata overlap {:.0}%", overlap * 100.0));
    }

    if let (Some(ha), Some(hb)) = (&a.content_hash, &b.content_hash) {
        let matched = ha.matches(hb, config.max_hamming_distance);
        weighted_sum += config.hash_weight * if matched { 1.0 } else { 0.0 };
        weight_total += config.hash_weight;
        if matched {
            hash_matched = true;
            reasons.push("content hash match".to_string());
        } else {
            reasons.push("content hash mismatch".to_string());
        }
    }

    let mut score = if weight_total > 0.0 {
        weighted_sum / weight_total
    } else {
        0.0
    };

    // A hash match is strong evidence even alone; corroborating signals
    // may only raise the score above the floor, never below it.
    if hash_matched && score < config.hash_match_floor {
        score = config.hash_match_floor;
        reasons.push("hash floor applied".to_string());
    }

    SimilarityScore { score, reasons }
}

/// Title ratio over normalized titles, blending a prefix-sensitive and a
/// character-level edit metric.
fn title_ratio(a: &str, b: &str) -> f64 {
    jaro_winkler(a, b) * 0.6 + normalized_levenshtein(a, b) * 0.4
}

/// Jaccard over the union of subject and keyword terms, with a bonus
/// when archive, creator, and creation date all coincide. `None` when
/// neither component can be evaluated for the pair.
fn metadata_overlap(a: &Record, b: &Record) -> Option<f64> {
    let terms_a = a.term_set();
    let terms_b = b.term_set();
    let jaccard = if !terms_a.is_empty() && !terms_b.is_empty() {
        let intersection = terms_a.intersection(&terms_b).count();
        let union = terms_a.union(&terms_b).count();
        Some(intersection as f64 / union as f64)
    } else {
        None
    };

    let attribution_coincides = !a.creator.is_empty()
        && a.source_archive == b.source_archive
        && a.creator == b.creator
        && a.date_created.is_some()
        && a.date_created == b.date_created;

    match (jaccard, attribution_coincides) {
        (Some(j), true) => Some((j + 0.5).min(1.0)),
        (Some(j), false) => Some(j),
        (None, true) => Some(1.0),
        (None, false) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tessera_domain::ContentHash;

    fn record(id: &str, url: &str, title: &str) -> Record {
        let mut r = Record::new(id, "X", url);
        r.title = title.to_string();
        r
    }

    #[test]
    fn test_same_source_url_short_circuits() {
        let a = record("a1", "http://x.org/1", "Mosque Photo");
        let b = record("b7", "HTTP://X.ORG/1/", "Totally Different Title");
        let result = similarity(&a, &b, &DedupConfig::default());
        assert_eq!(result.score, 1.0);
        assert_eq!(result.reasons, vec!["exact URL match"]);
    }

    #[test]
    fn test_same_download_url_short_circuits() {
        let mut a = record("a1", "http://x.org/1", "A");
        let mut b = record("b7", "http://y.org/2", "B");
        a.download_url = Some("http://cdn.org/asset.jpg".to_string());
        b.download_url = Some("http://cdn.org/asset.jpg?utm_source=feed".to_string());
        let result = similarity(&a, &b, &DedupConfig::default());
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn test_similar_titles_score_high() {
        let a = record("a1", "http://x.org/1", "Habib-i Neccar Mosque");
        let b = record("b7", "http://y.org/2", "Habib-i Neccar Mosque, Antakya");
        let result = similarity(&a, &b, &DedupConfig::default());
        assert!(result.score > 0.75, "got {}", result.score);
    }

    #[test]
    fn test_unrelated_titles_score_low() {
        let a = record("a1", "http://x.org/1", "Habib-i Neccar Mosque");
        let b = record("b7", "http://y.org/2", "Roman aqueduct ruins");
        let result = similarity(&a, &b, &DedupConfig::default());
        assert!(result.score < 0.75, "got {}", result.score);
    }

    #[test]
    fn test_missing_fields_are_neutral() {
        // No titles, no hashes, no metadata: nothing evaluable
        let a = record("a1", "http://x.org/1", "");
        let b = record("b7", "http://y.org/2", "");
        let result = similarity(&a, &b, &DedupConfig::default());
        assert_eq!(result.score, 0.0);
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn test_hash_match_alone_reaches_floor() {
        let mut a = record("a1", "http://x.org/1", "");
        let mut b = record("b7", "http://y.org/2", "");
        a.content_hash = Some(ContentHash::Perceptual(0xff00));
        b.content_hash = Some(ContentHash::Perceptual(0xff01));
        let config = DedupConfig::default();
        let result = similarity(&a, &b, &config);
        assert!(result.score >= config.hash_match_floor, "got {}", result.score);
        assert!(config.is_candidate(result.score));
    }

    #[test]
    fn test_hash_mismatch_drags_score_down() {
        let mut a = record("a1", "http://x.org/1", "Mosque Photo");
        let mut b = record("b7", "http://y.org/2", "Mosque Photo");
        a.content_hash = Some(ContentHash::Sha256("aa".into()));
        b.content_hash = Some(ContentHash::Sha256("bb".into()));
        let with_hash = similarity(&a, &b, &DedupConfig::default());
        a.content_hash = None;
        b.content_hash = None;
        let without_hash = similarity(&a, &b, &DedupConfig::default());
        assert!(with_hash.score < without_hash.score);
    }

    #[test]
    fn test_metadata_overlap_with_attribution_bonus() {
        let mut a = record("a1", "http://x.org/1", "");
        let mut b = record("b7", "http://x.org/2", "");
        for r in [&mut a, &mut b] {
            r.creator = "G. Berggren".to_string();
            r.date_created = NaiveDate::from_ymd_opt(1890, 1, 1);
            r.subject.insert("mosque".to_string());
        }
        a.subject.insert("courtyard".to_string());
        let result = similarity(&a, &b, &DedupConfig::default());
        // jaccard 0.5 + bonus 0.5, single evaluable signal
        assert!(result.score > 0.99, "got {}", result.score);
    }

    #[test]
    fn test_score_at_exact_threshold_is_candidate() {
        // Only the metadata signal is evaluable: three shared terms out
        // of four, jaccard exactly 0.75.
        let mut a = record("a1", "http://x.org/1", "");
        let mut b = record("b7", "http://y.org/2", "");
        for term in ["mosque", "antakya", "ottoman"] {
            a.subject.insert(term.to_string());
            b.subject.insert(term.to_string());
        }
        b.subject.insert("postcard".to_string());
        let config = DedupConfig {
            title_weight: 0.0,
            hash_weight: 0.0,
            metadata_weight: 1.0,
            ..DedupConfig::default()
        };
        let result = similarity(&a, &b, &config);
        assert_eq!(result.score, 0.75);
        assert!(config.is_candidate(result.score));
    }
}
