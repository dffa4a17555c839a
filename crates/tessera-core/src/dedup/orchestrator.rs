//! Batch deduplication orchestration

use std::collections::HashSet;

use serde::Serialize;
use tessera_domain::{validate_identity, Record};

use super::{blocking::build_blocks, cluster, cluster::Edge};
use crate::config::{ClusteringMode, DedupConfig};
use crate::merge::{merge_cluster, MergeOutcome};
use crate::normalize::MatchKeys;
use crate::similarity::similarity_with_keys;

/// Stages a batch moves through, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchPhase {
    Collecting,
    Blocking,
    Scoring,
    Merging,
    Done,
}

impl BatchPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchPhase::Collecting => "collecting",
            BatchPhase::Blocking => "blocking",
            BatchPhase::Scoring => "scoring",
            BatchPhase::Merging => "merging",
            BatchPhase::Done => "done",
        }
    }
}

/// A record excluded from the batch, with the reason on the record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub id: String,
    pub source_archive: String,
    pub reason: String,
}

/// Result of one deduplication pass over a batch.
#[derive(Clone, Debug, Default)]
pub struct BatchOutcome {
    /// Deduplicated records in canonical `(source_archive, id)` order.
    pub records: Vec<Record>,
    pub rejections: Vec<Rejection>,
    /// Clusters that merged into a representative record.
    pub merged_clusters: usize,
    /// Records that passed through a type-mismatched cluster, flagged.
    pub flagged: usize,
}

fn advance(phase: &mut BatchPhase, next: BatchPhase) {
    tracing::debug!(from = phase.as_str(), to = next.as_str(), "batch phase");
    *phase = next;
}

/// Run one full deduplication pass over a batch of records.
///
/// Records failing identity validation are excluded with a recorded
/// rejection; nothing in a batch can abort the whole pass. The output
/// ordering is canonical, so two passes over permutations of the same
/// input produce identical collections.
pub fn deduplicate_batch(records: Vec<Record>, config: &DedupConfig) -> BatchOutcome {
    let mut phase = BatchPhase::Collecting;
    let total = records.len();

    let mut accepted = Vec::with_capacity(records.len());
    let mut rejections = Vec::new();
    for record in records {
        match validate_identity(&record) {
            Ok(()) => accepted.push(record),
            Err(reason) => {
                tracing::warn!(id = %record.id, archive = %record.source_archive, %reason, "record rejected");
                rejections.push(Rejection {
                    id: record.id,
                    source_archive: record.source_archive,
                    reason: reason.to_string(),
                });
            }
        }
    }

    advance(&mut phase, BatchPhase::Blocking);
    let keys: Vec<MatchKeys> = accepted.iter().map(MatchKeys::for_record).collect();
    let blocks = build_blocks(&keys);

    advance(&mut phase, BatchPhase::Scoring);
    let mut seen_pairs: HashSet<(usize, usize)> = HashSet::new();
    let mut edges: Vec<Edge> = Vec::new();
    for block in &blocks {
        for (position, &a) in block.iter().enumerate() {
            for &b in &block[position + 1..] {
                let pair = (a.min(b), a.max(b));
                if !seen_pairs.insert(pair) {
                    continue;
                }
                let result =
                    similarity_with_keys(&accepted[a], &keys[a], &accepted[b], &keys[b], config);
                if config.is_candidate(result.score) {
                    edges.push(Edge {
                        a: pair.0,
                        b: pair.1,
                        score: result.score,
                    });
                }
            }
        }
    }

    let clusters = match config.clustering {
        ClusteringMode::Transitive => cluster::connected_components(accepted.len(), &edges),
        ClusteringMode::PairwiseOnly => cluster::greedy_pairwise(accepted.len(), &edges),
    };

    advance(&mut phase, BatchPhase::Merging);
    let clustered: HashSet<usize> = clusters.iter().flatten().copied().collect();
    let mut output = Vec::with_capacity(accepted.len());
    let mut merged_clusters = 0;
    let mut flagged = 0;

    for cluster_indices in &clusters {
        let members: Vec<Record> = cluster_indices
            .iter()
            .map(|&i| accepted[i].clone())
            .collect();
        match merge_cluster(members) {
            MergeOutcome::Merged(record) => {
                merged_clusters += 1;
                output.push(record);
            }
            MergeOutcome::TypeMismatch(records) => {
                flagged += records.len();
                output.extend(records);
            }
        }
    }
    for (index, record) in accepted.into_iter().enumerate() {
        if !clustered.contains(&index) {
            output.push(record);
        }
    }

    output.sort_by(|a, b| a.identity_key().cmp(&b.identity_key()));

    advance(&mut phase, BatchPhase::Done);
    tracing::info!(
        input = total,
        output = output.len(),
        rejected = rejections.len(),
        merged_clusters,
        flagged,
        "batch deduplicated"
    );

    BatchOutcome {
        records: output,
        rejections,
        merged_clusters,
        flagged,
    }
}
