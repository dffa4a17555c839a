//! Tabular workbook: a directory of per-sheet CSV files
//!
//! Sheet inventory: all records, one sheet per content type, a
//! per-archive summary, and a by-year count.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tessera_domain::{DataType, Record};

use super::ExportError;

/// One row of the all-records sheet: the flat projection of a record
/// this format is capable of representing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkbookRow {
    pub id: String,
    pub archive: String,
    pub source_url: String,
    pub title: String,
    pub description: String,
    pub date_created: String,
    pub date_range_start: String,
    pub date_range_end: String,
    pub date_uncertainty: String,
    pub data_type: String,
    pub mime_type: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub creator: String,
    pub subjects: String,
    pub keywords: String,
    pub download_url: String,
    pub thumbnail_url: String,
    pub rights: String,
    pub license: String,
    pub harvested_at: String,
}

impl WorkbookRow {
    fn from_record(record: &Record) -> Self {
        Self {
            id: record.id.clone(),
            archive: record.source_archive.clone(),
            source_url: record.source_url.clone(),
            title: record.title.clone(),
            description: record.description.clone(),
            date_created: format_date(record.date_created),
            date_range_start: format_date(record.date_range_start),
            date_range_end: format_date(record.date_range_end),
            date_uncertainty: record
                .date_uncertainty
                .map(|u| u.to_string())
                .unwrap_or_default(),
            data_type: record.data_type.to_string(),
            mime_type: record.mime_type.clone(),
            location: record.location_text.clone(),
            latitude: record.coordinates.map(|c| c.lat),
            longitude: record.coordinates.map(|c| c.lon),
            creator: record.creator.clone(),
            subjects: join_set(&record.subject),
            keywords: join_set(&record.keywords),
            download_url: record.download_url.clone().unwrap_or_default(),
            thumbnail_url: record.thumbnail_url.clone().unwrap_or_default(),
            rights: record.rights.clone(),
            license: record.license.clone(),
            harvested_at: record.harvested_at.to_rfc3339(),
        }
    }
}

fn format_date(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_default()
}

fn join_set(set: &std::collections::BTreeSet<String>) -> String {
    set.iter().cloned().collect::<Vec<_>>().join("; ")
}

fn write_sheet(path: &Path, rows: &[WorkbookRow]) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the workbook directory.
pub fn write_workbook(dir: &Path, records: &[Record]) -> Result<(), ExportError> {
    std::fs::create_dir_all(dir)?;

    let rows: Vec<WorkbookRow> = records.iter().map(WorkbookRow::from_record).collect();
    write_sheet(&dir.join("all_records.csv"), &rows)?;

    // One sheet per non-empty content type
    for data_type in DataType::ALL {
        let filtered: Vec<WorkbookRow> = records
            .iter()
            .zip(&rows)
            .filter(|(record, _)| record.data_type == data_type)
            .map(|(_, row)| row.clone())
            .collect();
        if !filtered.is_empty() {
            write_sheet(&dir.join(format!("{data_type}_records.csv")), &filtered)?;
        }
    }

    write_archive_summary(&dir.join("summary_by_archive.csv"), records)?;
    write_year_counts(&dir.join("records_by_year.csv"), records)?;
    Ok(())
}

fn write_archive_summary(path: &Path, records: &[Record]) -> Result<(), ExportError> {
    let mut per_archive: BTreeMap<&str, BTreeMap<DataType, usize>> = BTreeMap::new();
    for record in records {
        *per_archive
            .entry(&record.source_archive)
            .or_default()
            .entry(record.data_type)
            .or_default() += 1;
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["archive", "total_records", "top_types"])?;
    for (archive, type_counts) in per_archive {
        let total: usize = type_counts.values().sum();
        let mut ranked: Vec<(&DataType, &usize)> = type_counts.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(a.1).then(a.0.as_str().cmp(b.0.as_str())));
        let top_types = ranked
            .iter()
            .take(3)
            .map(|(dt, _)| dt.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        writer.write_record([archive, total.to_string().as_str(), top_types.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_year_counts(path: &Path, records: &[Record]) -> Result<(), ExportError> {
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for record in records {
        if let Some(year) = record.content_year() {
            *counts.entry(year).or_default() += 1;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["year", "count"])?;
    for (year, count) in counts {
        writer.write_record([year.to_string(), count.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Reload the all-records sheet for consistency verification.
pub fn load_workbook(dir: &Path) -> Result<Vec<WorkbookRow>, ExportError> {
    let mut reader = csv::Reader::from_path(dir.join("all_records.csv"))?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}
