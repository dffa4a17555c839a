//! Record domain model

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{ContentHash, DataType, DateUncertainty, GeoPoint};

/// One harvested heritage item.
///
/// `id`, `source_archive` and `source_url` are always present and
/// non-empty for any record that enters the pipeline; every other field
/// defaults to empty/unknown. A record is treated as immutable once
/// normalized — merging produces a new record rather than mutating
/// cluster members.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    // Identity
    pub id: String,
    pub source_archive: String,
    pub source_url: String,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,

    // Descriptive
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub subject: BTreeSet<String>,
    #[serde(default)]
    pub keywords: BTreeSet<String>,

    // Temporal
    #[serde(default)]
    pub date_created: Option<NaiveDate>,
    #[serde(default)]
    pub date_range_start: Option<NaiveDate>,
    #[serde(default)]
    pub date_range_end: Option<NaiveDate>,
    #[serde(default)]
    pub date_uncertainty: Option<DateUncertainty>,

    // Spatial
    #[serde(default)]
    pub location_text: String,
    #[serde(default)]
    pub coordinates: Option<GeoPoint>,

    // Classification
    #[serde(default)]
    pub data_type: DataType,
    #[serde(default)]
    pub mime_type: String,

    // Attribution and rights
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub rights: String,
    #[serde(default)]
    pub license: String,

    // Asset hash from the download layer, when available
    #[serde(default)]
    pub content_hash: Option<ContentHash>,

    // Processing metadata
    pub harvested_at: DateTime<Utc>,

    /// Archive-specific metadata with no canonical field. Never consulted
    /// for identity or dedup matching.
    #[serde(default)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Record {
    /// Create a record with the mandatory identity fields; everything
    /// else starts empty.
    pub fn new(
        id: impl Into<String>,
        source_archive: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source_archive: source_archive.into(),
            source_url: source_url.into(),
            download_url: None,
            thumbnail_url: None,
            title: String::new(),
            description: String::new(),
            subject: BTreeSet::new(),
            keywords: BTreeSet::new(),
            date_created: None,
            date_range_start: None,
            date_range_end: None,
            date_uncertainty: None,
            location_text: String::new(),
            coordinates: None,
            data_type: DataType::default(),
            mime_type: String::new(),
            creator: String::new(),
            rights: String::new(),
            license: String::new(),
            content_hash: None,
            harvested_at: Utc::now(),
            extra: BTreeMap::new(),
        }
    }

    /// Year the record's content is dated to, if any date information
    /// was parsed. Used for the by-year export sheet.
    pub fn content_year(&self) -> Option<i32> {
        use chrono::Datelike;
        self.date_created
            .or(self.date_range_start)
            .map(|d| d.year())
    }

    /// Union of `subject` and `keywords`, the term set used for
    /// metadata-overlap scoring.
    pub fn term_set(&self) -> BTreeSet<&str> {
        self.subject
            .iter()
            .chain(self.keywords.iter())
            .map(String::as_str)
            .collect()
    }

    /// Ordering key used wherever the pipeline needs a deterministic
    /// record order: primary-donor election and canonical output order.
    pub fn identity_key(&self) -> (&str, &str) {
        (&self.source_archive, &self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_defaults_empty() {
        let r = Record::new("a1", "wikimedia", "https://commons.wikimedia.org/x");
        assert!(r.title.is_empty());
        assert!(r.download_url.is_none());
        assert!(r.subject.is_empty());
        assert_eq!(r.data_type, DataType::Other);
    }

    #[test]
    fn test_content_year_prefers_point_date() {
        let mut r = Record::new("a1", "x", "http://x.org/1");
        r.date_range_start = NaiveDate::from_ymd_opt(1301, 1, 1);
        r.date_created = NaiveDate::from_ymd_opt(1912, 3, 12);
        assert_eq!(r.content_year(), Some(1912));
    }

    #[test]
    fn test_term_set_unions_subject_and_keywords() {
        let mut r = Record::new("a1", "x", "http://x.org/1");
        r.subject.insert("mosque".to_string());
        r.keywords.insert("ottoman".to_string());
        r.keywords.insert("mosque".to_string());
        let terms = r.term_set();
        assert_eq!(terms.len(), 2);
        assert!(terms.contains("mosque"));
        assert!(terms.contains("ottoman"));
    }

    #[test]
    fn test_json_round_trip() {
        let mut r = Record::new("a1", "europeana", "http://x.org/1");
        r.title = "Habib-i Neccar Mosque".to_string();
        r.coordinates = Some(GeoPoint::new(36.2, 36.16));
        r.content_hash = Some(ContentHash::Perceptual(0xdead_beef));
        let json = serde_json::to_string(&r).unwrap();
        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(r, back);
    }
}
