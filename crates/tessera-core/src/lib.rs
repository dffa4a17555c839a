//! tessera-core: record normalization and deduplication pipeline
//!
//! This library reconciles heterogeneous records harvested from many
//! independent heritage archives into a single deduplicated collection,
//! then projects that collection into multiple durable output formats:
//! - Field normalization (URLs, dates, text matching keys)
//! - Archive field mapping (schemaless raw input → canonical records)
//! - Multi-signal similarity scoring
//! - Blocking, clustering, and merge resolution
//! - Multi-format export (workbook, document, snapshot, report)
//!
//! Network fetching, HTML parsing, and all CLI surfaces live outside
//! this crate; it consumes raw key/value records and exposes the
//! canonical collection plus exported artifact paths.

pub mod config;
pub mod dedup;
pub mod export;
pub mod merge;
pub mod normalize;
pub mod pipeline;
pub mod similarity;
pub mod sources;

// Re-export main types for convenience
pub use config::{ClusteringMode, ConfigError, DedupConfig, ExportConfig, PipelineConfig};
pub use dedup::{deduplicate_batch, BatchOutcome, BatchPhase, Rejection};
pub use export::{ArtifactKind, ArtifactResult, ExportError, ExportReport};
pub use merge::{merge_cluster, MergeOutcome};
pub use normalize::MatchKeys;
pub use pipeline::{run, run_and_export, PipelineOutcome, RunSummary};
pub use similarity::{similarity, SimilarityScore};
pub use sources::{builtin_mappers, map_batch, mapper_for, ArchiveMapper, RawRecord};
