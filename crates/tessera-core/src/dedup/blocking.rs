//! Blocking: cheap pre-partitioning to avoid all-pairs comparison

use std::collections::HashMap;

use crate::normalize::MatchKeys;

/// Group record indices into candidate blocks.
///
/// Two records land in the same block when they share a normalized
/// source-URL host, a 3-character normalized-title prefix, or the same
/// normalized download URL (so same-asset entries are always compared,
/// however different the rest of their metadata). Only blocks with at
/// least two members are returned; a record can appear in more than one
/// block, and the scoring stage deduplicates pairs.
pub fn build_blocks(keys: &[MatchKeys]) -> Vec<Vec<usize>> {
    let mut buckets: HashMap<String, Vec<usize>> = HashMap::new();

    for (index, key) in keys.iter().enumerate() {
        if let Some(host) = &key.host_key {
            buckets
                .entry(format!("host:{host}"))
                .or_default()
                .push(index);
        }
        if let Some(prefix) = key.title_prefix() {
            buckets
                .entry(format!("title:{prefix}"))
                .or_default()
                .push(index);
        }
        if let Some(asset) = &key.download_url_key {
            buckets
                .entry(format!("asset:{asset}"))
                .or_default()
                .push(index);
        }
    }

    let mut blocks: Vec<Vec<usize>> = buckets
        .into_values()
        .filter(|members| members.len() >= 2)
        .collect();
    // Deterministic block order regardless of hash-map iteration
    blocks.sort();
    blocks
}
