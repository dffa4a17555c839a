//! Table-driven field mapping
//!
//! Each archive is described by an alias table (raw field name →
//! canonical field) plus at most one override hook for structure the
//! table cannot express (nested objects, composed URLs).

use tessera_domain::{DataType, GeoPoint, Record};

use super::{value_as_f64, value_as_list, value_as_string, ArchiveMapper, RawRecord};
use crate::normalize::{clean_display_text, parse_date_text};

/// Canonical fields an alias can map onto.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CanonicalField {
    Id,
    Title,
    Description,
    Subject,
    Keywords,
    Creator,
    Rights,
    License,
    DateText,
    LocationText,
    Latitude,
    Longitude,
    SourceUrl,
    DownloadUrl,
    ThumbnailUrl,
    MimeType,
    DataTypeHint,
}

/// Declarative description of one archive's field layout.
pub struct MappingProfile {
    pub archive: &'static str,
    pub base_url: &'static str,
    /// Prepended to the raw id, keeping ids source-scoped
    /// ("wikimedia:12345").
    pub id_prefix: &'static str,
    pub aliases: &'static [(CanonicalField, &'static [&'static str])],
}

impl MappingProfile {
    fn lookup<'a>(&self, raw: &'a RawRecord, field: CanonicalField) -> Option<&'a serde_json::Value> {
        let (_, names) = self.aliases.iter().find(|(f, _)| *f == field)?;
        names.iter().find_map(|name| {
            raw.iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value)
        })
    }

    fn lookup_string(&self, raw: &RawRecord, field: CanonicalField) -> Option<String> {
        self.lookup(raw, field).and_then(value_as_string)
    }

    fn is_mapped_key(&self, key: &str) -> bool {
        self.aliases
            .iter()
            .any(|(_, names)| names.iter().any(|name| name.eq_ignore_ascii_case(key)))
    }
}

/// An archive mapper built from a profile plus an optional override
/// hook, applied after the table pass.
pub struct ProfileMapper {
    pub profile: MappingProfile,
    pub override_fn: Option<fn(&RawRecord, &mut Record)>,
}

impl ArchiveMapper for ProfileMapper {
    fn archive(&self) -> &str {
        self.profile.archive
    }

    fn base_url(&self) -> &str {
        self.profile.base_url
    }

    fn map(&self, raw: &RawRecord) -> Record {
        let profile = &self.profile;

        let raw_id = profile.lookup_string(raw, CanonicalField::Id).unwrap_or_default();
        let id = if raw_id.is_empty() {
            String::new()
        } else {
            format!("{}{}", profile.id_prefix, raw_id)
        };

        let source_url = profile
            .lookup_string(raw, CanonicalField::SourceUrl)
            .map(|u| resolve_against_base(&u, profile.base_url))
            .unwrap_or_default();

        let mut record = Record::new(id, profile.archive, source_url);

        if let Some(title) = profile.lookup_string(raw, CanonicalField::Title) {
            record.title = clean_display_text(&title);
        }
        if let Some(description) = profile.lookup_string(raw, CanonicalField::Description) {
            record.description = clean_display_text(&description);
        }
        if let Some(creator) = profile.lookup_string(raw, CanonicalField::Creator) {
            record.creator = clean_display_text(&creator);
        }
        if let Some(rights) = profile.lookup_string(raw, CanonicalField::Rights) {
            record.rights = clean_display_text(&rights);
        }
        if let Some(license) = profile.lookup_string(raw, CanonicalField::License) {
            record.license = clean_display_text(&license);
        }
        if let Some(location) = profile.lookup_string(raw, CanonicalField::LocationText) {
            record.location_text = clean_display_text(&location);
        }
        if let Some(mime) = profile.lookup_string(raw, CanonicalField::MimeType) {
            record.mime_type = mime.trim().to_lowercase();
        }

        if let Some(value) = profile.lookup(raw, CanonicalField::Subject) {
            record.subject = value_as_list(value)
                .into_iter()
                .map(|s| clean_display_text(&s))
                .collect();
        }
        if let Some(value) = profile.lookup(raw, CanonicalField::Keywords) {
            record.keywords = value_as_list(value)
                .into_iter()
                .map(|s| clean_display_text(&s))
                .collect();
        }

        if let Some(date_text) = profile.lookup_string(raw, CanonicalField::DateText) {
            let parsed = parse_date_text(&date_text);
            record.date_created = parsed.date_created;
            record.date_range_start = parsed.date_range_start;
            record.date_range_end = parsed.date_range_end;
            record.date_uncertainty = parsed.uncertainty;
        }

        let lat = profile.lookup(raw, CanonicalField::Latitude).and_then(value_as_f64);
        let lon = profile.lookup(raw, CanonicalField::Longitude).and_then(value_as_f64);
        if let (Some(lat), Some(lon)) = (lat, lon) {
            let point = GeoPoint::new(lat, lon);
            if point.is_valid() {
                record.coordinates = Some(point);
            }
        }

        if let Some(url) = profile.lookup_string(raw, CanonicalField::DownloadUrl) {
            record.download_url = Some(resolve_against_base(&url, profile.base_url));
        }
        if let Some(url) = profile.lookup_string(raw, CanonicalField::ThumbnailUrl) {
            record.thumbnail_url = Some(resolve_against_base(&url, profile.base_url));
        }

        let hint = profile.lookup_string(raw, CanonicalField::DataTypeHint);
        record.data_type = classify(
            hint.as_deref(),
            &record.mime_type,
            record.download_url.as_deref(),
        );

        // Archive-specific metadata with no canonical field is preserved
        // as-is, never dropped.
        for (key, value) in raw {
            if !profile.is_mapped_key(key) {
                record.extra.insert(key.clone(), value.clone());
            }
        }

        if let Some(hook) = self.override_fn {
            hook(raw, &mut record);
        }

        record
    }
}

/// Resolve a possibly-relative URL against the archive base, keeping the
/// original text when resolution is impossible.
fn resolve_against_base(raw: &str, base: &str) -> String {
    let trimmed = raw.trim();
    match url::Url::parse(trimmed) {
        Ok(u) => u.to_string(),
        Err(url::ParseError::RelativeUrlWithoutBase) => url::Url::parse(base)
            .ok()
            .and_then(|b| b.join(trimmed).ok())
            .map(|u| u.to_string())
            .unwrap_or_else(|| trimmed.to_string()),
        Err(_) => trimmed.to_string(),
    }
}

/// Classify content from the archive's own type hint, the MIME type, or
/// the download URL extension, in that order.
pub(crate) fn classify(hint: Option<&str>, mime: &str, download_url: Option<&str>) -> DataType {
    if let Some(hint) = hint {
        let parsed = DataType::parse_lenient(hint);
        if parsed != DataType::Other {
            return parsed;
        }
    }
    if !mime.is_empty() {
        if mime == "application/pdf" {
            return DataType::Pdf;
        }
        if let Some(prefix) = mime.split('/').next() {
            match prefix {
                "image" => return DataType::Image,
                "audio" => return DataType::Audio,
                "text" => return DataType::Text,
                _ => {}
            }
        }
    }
    if let Some(url) = download_url {
        let lower = url.to_lowercase();
        let ext = lower.rsplit('.').next().unwrap_or_default();
        match ext {
            "jpg" | "jpeg" | "png" | "tif" | "tiff" | "gif" => return DataType::Image,
            "pdf" => return DataType::Pdf,
            "mp3" | "wav" | "ogg" | "flac" => return DataType::Audio,
            "txt" => return DataType::Text,
            _ => {}
        }
    }
    DataType::Other
}
