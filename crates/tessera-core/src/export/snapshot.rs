//! Relational snapshot artifact
//!
//! SQLite database with a main `records` table, child tables for the
//! set-valued fields and provenance, and lookup indexes.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde_json::json;
use tessera_domain::{ContentHash, DataType, DateUncertainty, GeoPoint, Record};

use super::ExportError;
use crate::merge::DUPLICATE_SOURCES_KEY;

fn init_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS records (
            id TEXT PRIMARY KEY,
            source_archive TEXT NOT NULL,
            source_url TEXT NOT NULL,
            download_url TEXT,
            thumbnail_url TEXT,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            date_created TEXT,
            date_range_start TEXT,
            date_range_end TEXT,
            date_uncertainty TEXT,
            location_text TEXT NOT NULL,
            latitude REAL,
            longitude REAL,
            data_type TEXT NOT NULL,
            mime_type TEXT NOT NULL,
            creator TEXT NOT NULL,
            rights TEXT NOT NULL,
            license TEXT NOT NULL,
            content_hash TEXT,
            harvested_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS record_subjects (
            record_id TEXT NOT NULL REFERENCES records(id),
            subject TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS record_keywords (
            record_id TEXT NOT NULL REFERENCES records(id),
            keyword TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS record_duplicate_sources (
            record_id TEXT NOT NULL REFERENCES records(id),
            source_url TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_records_archive ON records(source_archive);
        CREATE INDEX IF NOT EXISTS idx_records_data_type ON records(data_type);
        CREATE INDEX IF NOT EXISTS idx_records_date ON records(date_created);
        ",
    )
}

/// Write the snapshot database.
pub fn write_snapshot(path: &Path, records: &[Record]) -> Result<(), ExportError> {
    let mut conn = Connection::open(path)?;
    write_into(&mut conn, records)?;
    Ok(())
}

fn write_into(conn: &mut Connection, records: &[Record]) -> Result<(), rusqlite::Error> {
    init_schema(conn)?;
    let tx = conn.transaction()?;
    {
        let mut insert_record = tx.prepare(
            "INSERT OR REPLACE INTO records VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11,
                ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21
            )",
        )?;
        let mut insert_subject =
            tx.prepare("INSERT INTO record_subjects VALUES (?1, ?2)")?;
        let mut insert_keyword =
            tx.prepare("INSERT INTO record_keywords VALUES (?1, ?2)")?;
        let mut insert_source =
            tx.prepare("INSERT INTO record_duplicate_sources VALUES (?1, ?2)")?;

        for record in records {
            insert_record.execute(params![
                record.id,
                record.source_archive,
                record.source_url,
                record.download_url,
                record.thumbnail_url,
                record.title,
                record.description,
                record.date_created.map(|d| d.to_string()),
                record.date_range_start.map(|d| d.to_string()),
                record.date_range_end.map(|d| d.to_string()),
                record.date_uncertainty.map(|u| u.to_string()),
                record.location_text,
                record.coordinates.map(|c| c.lat),
                record.coordinates.map(|c| c.lon),
                record.data_type.to_string(),
                record.mime_type,
                record.creator,
                record.rights,
                record.license,
                record
                    .content_hash
                    .as_ref()
                    .map(|h| serde_json::to_string(h).unwrap_or_default()),
                record.harvested_at.to_rfc3339(),
            ])?;
            for subject in &record.subject {
                insert_subject.execute(params![record.id, subject])?;
            }
            for keyword in &record.keywords {
                insert_keyword.execute(params![record.id, keyword])?;
            }
            if let Some(sources) = record
                .extra
                .get(DUPLICATE_SOURCES_KEY)
                .and_then(|v| v.as_array())
            {
                for source in sources.iter().filter_map(|v| v.as_str()) {
                    insert_source.execute(params![record.id, source])?;
                }
            }
        }
    }
    tx.commit()
}

/// Reload a snapshot into records carrying the fields this format
/// represents. `extra` holds only the provenance table.
pub fn load_snapshot(path: &Path) -> Result<Vec<Record>, ExportError> {
    let conn = Connection::open(path)?;
    load_from(&conn).map_err(ExportError::from)
}

fn load_from(conn: &Connection) -> Result<Vec<Record>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT id, source_archive, source_url, download_url, thumbnail_url,
                title, description, date_created, date_range_start,
                date_range_end, date_uncertainty, location_text, latitude,
                longitude, data_type, mime_type, creator, rights, license,
                content_hash, harvested_at
         FROM records ORDER BY source_archive, id",
    )?;
    let mut records: Vec<Record> = stmt
        .query_map([], |row| {
            let mut record = Record::new(
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            );
            record.download_url = row.get(3)?;
            record.thumbnail_url = row.get(4)?;
            record.title = row.get(5)?;
            record.description = row.get(6)?;
            record.date_created = parse_date(row.get::<_, Option<String>>(7)?);
            record.date_range_start = parse_date(row.get::<_, Option<String>>(8)?);
            record.date_range_end = parse_date(row.get::<_, Option<String>>(9)?);
            record.date_uncertainty =
                row.get::<_, Option<String>>(10)?.and_then(parse_uncertainty);
            record.location_text = row.get(11)?;
            let lat: Option<f64> = row.get(12)?;
            let lon: Option<f64> = row.get(13)?;
            if let (Some(lat), Some(lon)) = (lat, lon) {
                record.coordinates = Some(GeoPoint::new(lat, lon));
            }
            record.data_type = DataType::parse_lenient(&row.get::<_, String>(14)?);
            record.mime_type = row.get(15)?;
            record.creator = row.get(16)?;
            record.rights = row.get(17)?;
            record.license = row.get(18)?;
            record.content_hash = row
                .get::<_, Option<String>>(19)?
                .and_then(|s| serde_json::from_str::<ContentHash>(&s).ok());
            if let Ok(ts) = DateTime::parse_from_rfc3339(&row.get::<_, String>(20)?) {
                record.harvested_at = ts.with_timezone(&Utc);
            }
            Ok(record)
        })?
        .collect::<Result<_, _>>()?;

    let mut load_children = |table: &str, column: &str| -> Result<
        std::collections::HashMap<String, Vec<String>>,
        rusqlite::Error,
    > {
        let mut stmt =
            conn.prepare(&format!("SELECT record_id, {column} FROM {table}"))?;
        let mut map: std::collections::HashMap<String, Vec<String>> =
            std::collections::HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (id, value) = row?;
            map.entry(id).or_default().push(value);
        }
        Ok(map)
    };

    let subjects = load_children("record_subjects", "subject")?;
    let keywords = load_children("record_keywords", "keyword")?;
    let sources = load_children("record_duplicate_sources", "source_url")?;

    for record in &mut records {
        if let Some(values) = subjects.get(&record.id) {
            record.subject = values.iter().cloned().collect();
        }
        if let Some(values) = keywords.get(&record.id) {
            record.keywords = values.iter().cloned().collect();
        }
        if let Some(values) = sources.get(&record.id) {
            let mut sorted = values.clone();
            sorted.sort_unstable();
            record
                .extra
                .insert(DUPLICATE_SOURCES_KEY.to_string(), json!(sorted));
        }
    }

    Ok(records)
}

fn parse_date(value: Option<String>) -> Option<chrono::NaiveDate> {
    value.and_then(|s| s.parse().ok())
}

fn parse_uncertainty(value: String) -> Option<DateUncertainty> {
    match value.as_str() {
        "circa" => Some(DateUncertainty::Circa),
        "before" => Some(DateUncertainty::Before),
        "after" => Some(DateUncertainty::After),
        "century" => Some(DateUncertainty::Century),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> Record {
        let mut record = Record::new("a1", "archnet", "https://archnet.org/sites/1");
        record.title = "Courtyard elevation".to_string();
        record.data_type = DataType::Image;
        record.date_created = NaiveDate::from_ymd_opt(1912, 3, 12);
        record.date_uncertainty = Some(DateUncertainty::Circa);
        record.coordinates = Some(GeoPoint::new(36.2, 36.16));
        record.subject.insert("mosque".to_string());
        record.keywords.insert("ottoman".to_string());
        record.extra.insert(
            DUPLICATE_SOURCES_KEY.to_string(),
            json!(["https://archnet.org/sites/1", "https://x.org/1"]),
        );
        record
    }

    #[test]
    fn test_snapshot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.sqlite");
        write_snapshot(&path, &[sample()]).unwrap();

        let loaded = load_snapshot(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        let record = &loaded[0];
        assert_eq!(record.id, "a1");
        assert_eq!(record.title, "Courtyard elevation");
        assert_eq!(record.data_type, DataType::Image);
        assert_eq!(record.date_created, NaiveDate::from_ymd_opt(1912, 3, 12));
        assert_eq!(record.date_uncertainty, Some(DateUncertainty::Circa));
        assert_eq!(record.coordinates, Some(GeoPoint::new(36.2, 36.16)));
        assert!(record.subject.contains("mosque"));
        assert_eq!(
            record.extra.get(DUPLICATE_SOURCES_KEY),
            Some(&json!(["https://archnet.org/sites/1", "https://x.org/1"]))
        );
    }

    #[test]
    fn test_snapshot_preserves_ordering() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.sqlite");
        let mut b = Record::new("b7", "wikimedia", "http://y.org/2");
        b.title = "Second".to_string();
        write_snapshot(&path, &[b, sample()]).unwrap();

        let loaded = load_snapshot(&path).unwrap();
        assert_eq!(loaded[0].source_archive, "archnet");
        assert_eq!(loaded[1].source_archive, "wikimedia");
    }
}
