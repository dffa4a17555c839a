//! Deduplication: blocking, candidate scoring, clustering, merging
//!
//! A batch moves through `Collecting → Blocking → Scoring → Merging →
//! Done`. Only records sharing a cheap blocking key are ever compared
//! pairwise.

mod blocking;
mod cluster;
mod orchestrator;

pub use blocking::build_blocks;
pub use cluster::{connected_components, greedy_pairwise, Edge};
pub use orchestrator::{deduplicate_batch, BatchOutcome, BatchPhase, Rejection};
