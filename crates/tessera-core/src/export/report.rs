//! Human-readable statistical summary

use std::collections::BTreeMap;
use std::path::Path;

use tessera_domain::Record;

use super::ExportError;

/// Render the summary text for a collection.
pub fn render_report(records: &[Record]) -> String {
    let mut lines = Vec::new();
    lines.push("=== HARVEST SUMMARY REPORT ===".to_string());
    lines.push(String::new());
    lines.push(format!("Total records: {}", records.len()));

    let mut by_archive: BTreeMap<&str, usize> = BTreeMap::new();
    let mut by_type: BTreeMap<&str, usize> = BTreeMap::new();
    let mut by_location: BTreeMap<&str, usize> = BTreeMap::new();
    let mut years: Vec<i32> = Vec::new();

    for record in records {
        *by_archive.entry(&record.source_archive).or_default() += 1;
        *by_type.entry(record.data_type.as_str()).or_default() += 1;
        if !record.location_text.is_empty() {
            *by_location.entry(&record.location_text).or_default() += 1;
        }
        if let Some(year) = record.content_year() {
            years.push(year);
        }
    }

    lines.push(String::new());
    lines.push("Records by archive:".to_string());
    for (archive, count) in &by_archive {
        lines.push(format!("  - {archive}: {count}"));
    }

    lines.push(String::new());
    lines.push("Records by data type:".to_string());
    for (data_type, count) in &by_type {
        lines.push(format!("  - {data_type}: {count}"));
    }

    if !by_location.is_empty() {
        let mut ranked: Vec<(&&str, &usize)> = by_location.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
        lines.push(String::new());
        lines.push("Geographic coverage:".to_string());
        for (location, count) in ranked.into_iter().take(10) {
            lines.push(format!("  - {location}: {count}"));
        }
    }

    if let (Some(min), Some(max)) = (years.iter().min(), years.iter().max()) {
        lines.push(String::new());
        lines.push(format!("Date range: {min} to {max}"));
    }

    lines.push(String::new());
    lines.join("\n")
}

/// Write the report artifact.
pub fn write_report(path: &Path, records: &[Record]) -> Result<(), ExportError> {
    std::fs::write(path, render_report(records))?;
    Ok(())
}
