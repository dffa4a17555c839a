//! Structured document artifact: the full-fidelity JSON projection

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use tessera_domain::Record;

use super::ExportError;

/// Write the collection as a pretty-printed JSON array. This is the one
/// artifact capable of representing every record field.
pub fn write_document(path: &Path, records: &[Record]) -> Result<(), ExportError> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), records)?;
    Ok(())
}

/// Reload a document artifact.
pub fn load_document(path: &Path) -> Result<Vec<Record>, ExportError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}
