//! Built-in archive profiles
//!
//! Field aliases follow what each archive's API actually returns.

use tessera_domain::{DataType, Record};

use super::mapping::{CanonicalField, MappingProfile, ProfileMapper};
use super::{value_as_list, value_as_string, RawRecord};
use crate::normalize::{clean_display_text, parse_date_text};

const WIKIMEDIA: MappingProfile = MappingProfile {
    archive: "wikimedia",
    base_url: "https://commons.wikimedia.org/",
    id_prefix: "wikimedia:",
    aliases: &[
        (CanonicalField::Id, &["pageid"]),
        (CanonicalField::Title, &["title"]),
        (CanonicalField::Description, &["imagedescription", "description"]),
        (CanonicalField::Keywords, &["categories"]),
        (CanonicalField::Creator, &["artist", "author"]),
        (CanonicalField::Rights, &["credit"]),
        (CanonicalField::License, &["licenseshortname", "license"]),
        (CanonicalField::DateText, &["datetimeoriginal", "date"]),
        (CanonicalField::SourceUrl, &["descriptionurl"]),
        (CanonicalField::DownloadUrl, &["url"]),
        (CanonicalField::ThumbnailUrl, &["thumburl"]),
        (CanonicalField::MimeType, &["mime"]),
        (CanonicalField::Latitude, &["gpslatitude"]),
        (CanonicalField::Longitude, &["gpslongitude"]),
    ],
};

const EUROPEANA: MappingProfile = MappingProfile {
    archive: "europeana",
    base_url: "https://www.europeana.eu/",
    id_prefix: "europeana:",
    aliases: &[
        (CanonicalField::Id, &["id"]),
        (CanonicalField::Title, &["title", "dcTitle"]),
        (CanonicalField::Description, &["dcDescription"]),
        (CanonicalField::Subject, &["dcSubject"]),
        (CanonicalField::Creator, &["dcCreator"]),
        (CanonicalField::Rights, &["rights", "edmRights"]),
        (CanonicalField::DateText, &["year", "dcDate"]),
        (CanonicalField::LocationText, &["country", "dcCoverage"]),
        (CanonicalField::SourceUrl, &["guid", "edmIsShownAt"]),
        (CanonicalField::DownloadUrl, &["edmIsShownBy"]),
        (CanonicalField::ThumbnailUrl, &["edmPreview"]),
        (CanonicalField::DataTypeHint, &["type"]),
        (CanonicalField::Latitude, &["edmPlaceLatitude"]),
        (CanonicalField::Longitude, &["edmPlaceLongitude"]),
    ],
};

const DPLA: MappingProfile = MappingProfile {
    archive: "dpla",
    base_url: "https://dp.la/",
    id_prefix: "dpla:",
    aliases: &[
        (CanonicalField::Id, &["id"]),
        (CanonicalField::SourceUrl, &["isShownAt"]),
        (CanonicalField::DownloadUrl, &["object"]),
        (CanonicalField::DataTypeHint, &["type"]),
    ],
};

const ARCHNET: MappingProfile = MappingProfile {
    archive: "archnet",
    base_url: "https://archnet.org/",
    id_prefix: "archnet:",
    aliases: &[
        (CanonicalField::Id, &["id"]),
        (CanonicalField::Title, &["title"]),
        (CanonicalField::Description, &["description"]),
        (CanonicalField::Creator, &["creator"]),
        (CanonicalField::Rights, &["license"]),
        (CanonicalField::DateText, &["date_captured"]),
        (CanonicalField::LocationText, &["site_name", "place_name"]),
        (CanonicalField::SourceUrl, &["url"]),
        (CanonicalField::DataTypeHint, &["type"]),
        (CanonicalField::Latitude, &["latitude"]),
        (CanonicalField::Longitude, &["longitude"]),
    ],
};

const MANAR_AL_ATHAR: MappingProfile = MappingProfile {
    archive: "manar-al-athar",
    base_url: "https://www.manar-al-athar.ox.ac.uk/",
    id_prefix: "manar:",
    aliases: &[
        (CanonicalField::Id, &["id", "ref"]),
        (CanonicalField::Title, &["title"]),
        (CanonicalField::Description, &["caption", "description"]),
        (CanonicalField::Keywords, &["keywords"]),
        (CanonicalField::LocationText, &["site", "country"]),
        (CanonicalField::DateText, &["date"]),
        (CanonicalField::SourceUrl, &["url", "page_url"]),
        (CanonicalField::DownloadUrl, &["original_url", "image_url"]),
    ],
};

/// DPLA nests its descriptive metadata under `sourceResource`.
fn dpla_override(raw: &RawRecord, record: &mut Record) {
    let Some(serde_json::Value::Object(resource)) = raw.get("sourceResource") else {
        return;
    };
    if let Some(title) = resource.get("title").and_then(|v| value_as_string(v)) {
        record.title = clean_display_text(&title);
    }
    if let Some(description) = resource.get("description").and_then(|v| value_as_string(v)) {
        record.description = clean_display_text(&description);
    }
    if let Some(creator) = resource.get("creator").and_then(|v| value_as_string(v)) {
        record.creator = clean_display_text(&creator);
    }
    if let Some(rights) = resource.get("rights").and_then(|v| value_as_string(v)) {
        record.rights = clean_display_text(&rights);
    }
    if let Some(subject) = resource.get("subject") {
        // DPLA subjects are objects with a "name" key
        let names: Vec<String> = match subject {
            serde_json::Value::Array(items) => items
                .iter()
                .filter_map(|item| item.get("name").and_then(|v| value_as_string(v)))
                .collect(),
            other => value_as_list(other),
        };
        record.subject = names.iter().map(|s| clean_display_text(s)).collect();
    }
    if let Some(date) = resource.get("date").and_then(|d| {
        d.get("displayDate")
            .and_then(|v| value_as_string(v))
            .or_else(|| value_as_string(d))
    }) {
        let parsed = parse_date_text(&date);
        record.date_created = parsed.date_created;
        record.date_range_start = parsed.date_range_start;
        record.date_range_end = parsed.date_range_end;
        record.date_uncertainty = parsed.uncertainty;
    }
    if let Some(spatial) = resource.get("spatial") {
        let place = match spatial {
            serde_json::Value::Array(items) => items
                .first()
                .and_then(|item| item.get("name"))
                .and_then(|v| value_as_string(v)),
            other => value_as_string(other),
        };
        if let Some(place) = place {
            record.location_text = clean_display_text(&place);
        }
    }
}

/// Archnet serves asset URLs nested under `images`.
fn archnet_override(raw: &RawRecord, record: &mut Record) {
    if let Some(images) = raw.get("images") {
        if let Some(full) = images.get("full").and_then(|v| value_as_string(v)) {
            record.download_url = Some(full);
        }
        if let Some(thumb) = images.get("thumb").and_then(|v| value_as_string(v)) {
            record.thumbnail_url = Some(thumb);
        }
        if record.data_type == DataType::Other && record.download_url.is_some() {
            record.data_type = DataType::Image;
        }
    }
}

/// All archives with built-in profiles, one mapper per archive.
pub fn builtin_mappers() -> Vec<ProfileMapper> {
    vec![
        ProfileMapper {
            profile: WIKIMEDIA,
            override_fn: None,
        },
        ProfileMapper {
            profile: EUROPEANA,
            override_fn: None,
        },
        ProfileMapper {
            profile: DPLA,
            override_fn: Some(dpla_override),
        },
        ProfileMapper {
            profile: ARCHNET,
            override_fn: Some(archnet_override),
        },
        ProfileMapper {
            profile: MANAR_AL_ATHAR,
            override_fn: None,
        },
    ]
}

/// Look up the built-in mapper for an archive name.
pub fn mapper_for(archive: &str) -> Option<ProfileMapper> {
    builtin_mappers()
        .into_iter()
        .find(|m| m.profile.archive.eq_ignore_ascii_case(archive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::ArchiveMapper;
    use serde_json::json;

    fn raw(entries: &[(&str, serde_json::Value)]) -> RawRecord {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_wikimedia_mapping() {
        let mapper = mapper_for("wikimedia").unwrap();
        let record = mapper.map(&raw(&[
            ("pageid", json!(8675309)),
            ("title", json!("File:Habib-i Neccar Mosque.jpg")),
            ("descriptionurl", json!("https://commons.wikimedia.org/wiki/File:X.jpg")),
            ("url", json!("https://upload.wikimedia.org/x.jpg")),
            ("mime", json!("image/jpeg")),
            ("categories", json!(["Mosques in Antakya", "1912 photographs"])),
        ]));
        assert_eq!(record.id, "wikimedia:8675309");
        assert_eq!(record.source_archive, "wikimedia");
        assert_eq!(record.data_type, DataType::Image);
        assert_eq!(record.keywords.len(), 2);
    }

    #[test]
    fn test_dpla_nested_source_resource() {
        let mapper = mapper_for("dpla").unwrap();
        let record = mapper.map(&raw(&[
            ("id", json!("abc123")),
            ("isShownAt", json!("https://example.org/item/abc123")),
            (
                "sourceResource",
                json!({
                    "title": "Antioch street scene",
                    "creator": "Unknown photographer",
                    "subject": [{"name": "Street photography"}, {"name": "Antioch"}],
                    "date": {"displayDate": "circa 1920"},
                    "spatial": [{"name": "Antakya, Turkey"}]
                }),
            ),
        ]));
        assert_eq!(record.id, "dpla:abc123");
        assert_eq!(record.title, "Antioch street scene");
        assert_eq!(record.creator, "Unknown photographer");
        assert_eq!(record.subject.len(), 2);
        assert_eq!(record.location_text, "Antakya, Turkey");
        assert!(record.date_created.is_some());
    }

    #[test]
    fn test_archnet_nested_images() {
        let mapper = mapper_for("archnet").unwrap();
        let record = mapper.map(&raw(&[
            ("id", json!(77)),
            ("title", json!("Courtyard elevation")),
            ("url", json!("https://archnet.org/sites/77")),
            ("images", json!({"full": "https://archnet.org/media/77-full.jpg", "thumb": "https://archnet.org/media/77-thumb.jpg"})),
            ("latitude", json!(36.2)),
            ("longitude", json!(36.16)),
        ]));
        assert_eq!(record.id, "archnet:77");
        assert_eq!(
            record.download_url.as_deref(),
            Some("https://archnet.org/media/77-full.jpg")
        );
        assert_eq!(record.data_type, DataType::Image);
        assert!(record.coordinates.is_some());
    }

    #[test]
    fn test_unknown_archive() {
        assert!(mapper_for("library-of-babel").is_none());
    }
}
