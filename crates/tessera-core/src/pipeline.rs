//! End-to-end pipeline runs
//!
//! Independent per-archive batches run in parallel workers with no
//! shared mutable state; each worker owns its batch end-to-end. The
//! finished partial collections are concatenated and a final top-level
//! pass catches cross-archive duplicates.

use std::path::Path;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tessera_domain::Record;
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::dedup::{deduplicate_batch, Rejection};
use crate::export::{self, ExportError, ExportReport};

/// Counters and per-artifact results for one finished run. Always
/// produced — a run never ends in a bare crash with no summary.
#[derive(Debug)]
pub struct RunSummary {
    pub run_id: Uuid,
    /// Records in the canonical collection.
    pub accepted: usize,
    pub rejected: usize,
    /// Clusters folded into a representative record, across all passes.
    pub merged: usize,
    /// Records flagged by a type-mismatched cluster.
    pub flagged: usize,
    pub rejections: Vec<Rejection>,
    /// Per-artifact outcomes; empty when the run did not export.
    pub export: Option<ExportReport>,
}

impl RunSummary {
    pub fn render(&self) -> String {
        let mut lines = vec![
            format!("run {}", self.run_id),
            format!(
                "records: {} accepted, {} rejected, {} clusters merged, {} flagged",
                self.accepted, self.rejected, self.merged, self.flagged
            ),
        ];
        for rejection in &self.rejections {
            lines.push(format!(
                "  rejected {}:{} ({})",
                rejection.source_archive, rejection.id, rejection.reason
            ));
        }
        if let Some(report) = &self.export {
            for artifact in &report.artifacts {
                match &artifact.outcome {
                    Ok(()) => lines.push(format!(
                        "  artifact {}: ok ({})",
                        artifact.kind.as_str(),
                        artifact.path.display()
                    )),
                    Err(error) => lines.push(format!(
                        "  artifact {}: FAILED ({error})",
                        artifact.kind.as_str()
                    )),
                }
            }
        }
        lines.join("\n")
    }
}

/// The deduplicated collection plus its run summary.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub collection: Vec<Record>,
    pub summary: RunSummary,
}

/// Deduplicate a set of independent batches (typically one per source
/// archive) into one canonical collection.
///
/// Workers deduplicate their own batch in parallel; cross-archive
/// duplicates are resolved in a final pass over the concatenated
/// partial collections.
pub fn run(batches: Vec<Vec<Record>>, config: &PipelineConfig) -> PipelineOutcome {
    let run_id = Uuid::new_v4();
    let input: usize = batches.iter().map(Vec::len).sum();
    tracing::info!(%run_id, batches = batches.len(), records = input, "pipeline run started");

    let partials: Vec<_> = batches
        .into_par_iter()
        .map(|batch| deduplicate_batch(batch, &config.dedup))
        .collect();

    let mut rejections = Vec::new();
    let mut merged = 0;
    let mut concatenated = Vec::with_capacity(input);
    for partial in partials {
        rejections.extend(partial.rejections);
        merged += partial.merged_clusters;
        concatenated.extend(partial.records);
    }

    // Cross-archive duplicates only surface once the partial collections
    // meet, so the top level runs one more full pass.
    let final_pass = deduplicate_batch(concatenated, &config.dedup);
    rejections.extend(final_pass.rejections);
    merged += final_pass.merged_clusters;

    let summary = RunSummary {
        run_id,
        accepted: final_pass.records.len(),
        rejected: rejections.len(),
        merged,
        flagged: final_pass.flagged,
        rejections,
        export: None,
    };
    tracing::info!(%run_id, accepted = summary.accepted, rejected = summary.rejected, "pipeline run finished");

    PipelineOutcome {
        collection: final_pass.records,
        summary,
    }
}

/// Run the pipeline and export the canonical collection.
///
/// Only a failure to create the run directory aborts the export;
/// individual artifact failures are reported in the summary.
pub fn run_and_export(
    batches: Vec<Vec<Record>>,
    config: &PipelineConfig,
    out_root: &Path,
    timestamp: DateTime<Utc>,
) -> Result<PipelineOutcome, ExportError> {
    let mut outcome = run(batches, config);
    let report = export::write_all(&outcome.collection, out_root, timestamp, &config.export)?;
    outcome.summary.export = Some(report);
    Ok(outcome)
}
