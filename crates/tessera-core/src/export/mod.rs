//! Multi-format export of the canonical collection
//!
//! Each run writes one timestamped directory holding every artifact, so
//! re-runs never race a previous run's output. All artifacts project the
//! same collection; a failure in one format is contained and reported
//! while the remaining formats are still attempted.

mod document;
mod report;
mod snapshot;
mod workbook;

pub use document::{load_document, write_document};
pub use report::{render_report, write_report};
pub use snapshot::{load_snapshot, write_snapshot};
pub use workbook::{load_workbook, write_workbook, WorkbookRow};

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tessera_domain::Record;

use crate::config::ExportConfig;

/// Why an artifact failed to write.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The artifact formats a run can produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArtifactKind {
    Workbook,
    Document,
    Snapshot,
    Report,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Workbook => "workbook",
            ArtifactKind::Document => "document",
            ArtifactKind::Snapshot => "snapshot",
            ArtifactKind::Report => "report",
        }
    }
}

/// Per-artifact success or failure.
#[derive(Debug)]
pub struct ArtifactResult {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub outcome: Result<(), ExportError>,
}

impl ArtifactResult {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// All artifacts of one run.
#[derive(Debug)]
pub struct ExportReport {
    pub run_dir: PathBuf,
    pub artifacts: Vec<ArtifactResult>,
}

impl ExportReport {
    pub fn all_succeeded(&self) -> bool {
        self.artifacts.iter().all(ArtifactResult::is_ok)
    }
}

/// Deterministic run directory name for a timestamp.
pub fn run_dir_name(timestamp: DateTime<Utc>) -> String {
    timestamp.format("run-%Y%m%d-%H%M%S").to_string()
}

/// Write every enabled artifact into `<out_root>/run-<timestamp>/`.
///
/// Creating the run directory is the only step that fails the export as
/// a whole; artifact failures are contained in the returned report.
pub fn write_all(
    records: &[Record],
    out_root: &Path,
    timestamp: DateTime<Utc>,
    config: &ExportConfig,
) -> Result<ExportReport, ExportError> {
    let run_dir = out_root.join(run_dir_name(timestamp));
    std::fs::create_dir_all(&run_dir)?;

    let mut artifacts = Vec::new();
    if config.workbook {
        let path = run_dir.join("workbook");
        let outcome = write_workbook(&path, records);
        artifacts.push(ArtifactResult {
            kind: ArtifactKind::Workbook,
            path,
            outcome,
        });
    }
    if config.document {
        let path = run_dir.join("records.json");
        let outcome = write_document(&path, records);
        artifacts.push(ArtifactResult {
            kind: ArtifactKind::Document,
            path,
            outcome,
        });
    }
    if config.snapshot {
        let path = run_dir.join("records.sqlite");
        let outcome = write_snapshot(&path, records);
        artifacts.push(ArtifactResult {
            kind: ArtifactKind::Snapshot,
            path,
            outcome,
        });
    }
    if config.report {
        let path = run_dir.join("report.txt");
        let outcome = write_report(&path, records);
        artifacts.push(ArtifactResult {
            kind: ArtifactKind::Report,
            path,
            outcome,
        });
    }

    for artifact in &artifacts {
        match &artifact.outcome {
            Ok(()) => tracing::info!(
                kind = artifact.kind.as_str(),
                path = %artifact.path.display(),
                "artifact written"
            ),
            Err(error) => tracing::error!(
                kind = artifact.kind.as_str(),
                path = %artifact.path.display(),
                %error,
                "artifact failed"
            ),
        }
    }

    Ok(ExportReport { run_dir, artifacts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_run_dir_name_is_deterministic() {
        let ts = Utc.with_ymd_and_hms(2026, 2, 14, 9, 30, 0).unwrap();
        assert_eq!(run_dir_name(ts), "run-20260214-093000");
    }
}
