//! Raw harvest input and the archive-mapper capability
//!
//! The scraping layer hands this crate schemaless key/value items with
//! no guaranteed field names. An [`ArchiveMapper`] turns one raw item
//! into a fully-populated [`Record`]-with-defaults — a total function:
//! missing or malformed fields degrade to the field's empty value and
//! the batch continues.

mod archives;
mod mapping;

pub use archives::{builtin_mappers, mapper_for};
pub use mapping::{CanonicalField, MappingProfile, ProfileMapper};

use std::collections::BTreeMap;

use tessera_domain::Record;

/// One raw item from a harvester: no fixed schema guaranteed.
pub type RawRecord = BTreeMap<String, serde_json::Value>;

/// Capability: given raw source data, produce a Record.
pub trait ArchiveMapper: Send + Sync {
    /// Archive identifier recorded as `source_archive`.
    fn archive(&self) -> &str;
    /// Base URL relative links are resolved against.
    fn base_url(&self) -> &str;
    /// Map one raw item. Total — never fails, never panics on missing
    /// fields; a record with an empty identity is rejected later by the
    /// orchestrator with a recorded reason.
    fn map(&self, raw: &RawRecord) -> Record;
}

/// Map a batch of raw items from one archive.
pub fn map_batch<M: ArchiveMapper + ?Sized>(mapper: &M, raws: &[RawRecord]) -> Vec<Record> {
    let records: Vec<Record> = raws.iter().map(|raw| mapper.map(raw)).collect();
    tracing::info!(
        archive = mapper.archive(),
        count = records.len(),
        "mapped raw batch"
    );
    records
}

/// Best-effort string coercion for raw values.
pub(crate) fn value_as_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Best-effort list coercion: a JSON array of scalars, or a delimited
/// string ("a; b" or "a, b").
pub(crate) fn value_as_list(value: &serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::Array(items) => items.iter().filter_map(value_as_string).collect(),
        serde_json::Value::String(s) => {
            let delimiter = if s.contains(';') { ';' } else { ',' };
            s.split(delimiter)
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect()
        }
        _ => Vec::new(),
    }
}

/// Best-effort float coercion for coordinate fields.
pub(crate) fn value_as_f64(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
