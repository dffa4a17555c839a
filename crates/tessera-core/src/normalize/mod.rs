//! Per-field canonicalization
//!
//! Every function here is total: malformed input degrades to the field's
//! empty value (or a best-effort fallback key) instead of failing the
//! batch. Normalization produces separate matching keys; display fields
//! on the record are never overwritten.

mod dates;
mod text;
mod urls;

pub use dates::{parse_date_text, ParsedDate};
pub use text::{clean_display_text, normalize_matching_text, title_matching_key};
pub use urls::normalize_url;

use tessera_domain::Record;

/// Precomputed matching keys for one record.
///
/// Computed once per record when a batch enters the Blocking phase and
/// carried alongside the immutable record through Scoring.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchKeys {
    /// Normalized `source_url`, the primary key for exact-duplicate
    /// detection.
    pub source_url_key: String,
    /// Normalized `download_url`, when the record has one.
    pub download_url_key: Option<String>,
    /// Host component of the normalized source URL, a blocking key.
    pub host_key: Option<String>,
    /// Casefolded title with file-extension suffixes stripped.
    pub title_key: String,
}

impl MatchKeys {
    pub fn for_record(record: &Record) -> Self {
        let source_url_key = normalize_url(&record.source_url, None);
        let download_url_key = record
            .download_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .map(|u| normalize_url(u, None));
        let host_key = url::Url::parse(&record.source_url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_lowercase()));
        Self {
            source_url_key,
            download_url_key,
            host_key,
            title_key: title_matching_key(&record.title),
        }
    }

    /// First three characters of the normalized title, the cheap
    /// blocking key for records without a shared host.
    pub fn title_prefix(&self) -> Option<&str> {
        if self.title_key.len() >= 3 {
            // title_key is ASCII after normalization, byte slicing is safe
            Some(&self.title_key[..3])
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_keys_for_record() {
        let mut record = Record::new("a1", "X", "HTTP://X.ORG/items/1/");
        record.title = "Mosque Photo.JPG".to_string();
        record.download_url = Some("http://cdn.x.org/1.jpg".to_string());

        let keys = MatchKeys::for_record(&record);
        assert_eq!(keys.source_url_key, "http://x.org/items/1");
        assert_eq!(keys.host_key.as_deref(), Some("x.org"));
        assert_eq!(keys.title_key, "mosque photo");
        assert_eq!(keys.title_prefix(), Some("mos"));
        assert!(keys.download_url_key.is_some());
    }

    #[test]
    fn test_blank_download_url_ignored() {
        let mut record = Record::new("a1", "X", "http://x.org/1");
        record.download_url = Some("   ".to_string());
        let keys = MatchKeys::for_record(&record);
        assert!(keys.download_url_key.is_none());
    }

    #[test]
    fn test_short_title_has_no_prefix() {
        let mut record = Record::new("a1", "X", "http://x.org/1");
        record.title = "ab".to_string();
        let keys = MatchKeys::for_record(&record);
        assert_eq!(keys.title_prefix(), None);
    }
}
