//! Merge resolution for duplicate clusters
//!
//! Deterministic and commutative: members are sorted by
//! `(source_archive, id)` before any policy runs, so the result never
//! depends on input ordering. Inputs are not mutated; the resolver
//! builds a new record.

use serde_json::json;
use tessera_domain::Record;

/// Key under which every cluster member's source URL is preserved.
pub const DUPLICATE_SOURCES_KEY: &str = "duplicate_sources";
/// Annotation key set on records that survived an unmergeable cluster.
pub const DEDUP_FLAG_KEY: &str = "dedup_flag";

/// What became of a cluster.
#[derive(Clone, Debug, PartialEq)]
pub enum MergeOutcome {
    /// One representative record with provenance folded in.
    Merged(Record),
    /// The cluster mixed content types, which signals a likely
    /// false-positive grouping. Members pass through unmerged, each
    /// flagged.
    TypeMismatch(Vec<Record>),
}

/// Merge a cluster of duplicate records into one representative record.
///
/// The lexicographically smallest `(source_archive, id)` member is the
/// primary donor for identity fields; scalar fields prefer the longest
/// non-empty value with ties broken by donor order; set fields union;
/// temporal and spatial fields prefer the most specific value.
pub fn merge_cluster(mut members: Vec<Record>) -> MergeOutcome {
    debug_assert!(members.len() >= 2, "clusters have at least two members");
    members.sort_by(|a, b| a.identity_key().cmp(&b.identity_key()));

    let first_type = members[0].data_type;
    if members.iter().any(|m| m.data_type != first_type) {
        tracing::warn!(
            primary = %members[0].id,
            size = members.len(),
            "cluster mixes content types, passing through unmerged"
        );
        let flagged = members
            .into_iter()
            .map(|mut record| {
                record
                    .extra
                    .insert(DEDUP_FLAG_KEY.to_string(), json!("type_mismatch"));
                record
            })
            .collect();
        return MergeOutcome::TypeMismatch(flagged);
    }

    let mut merged = members[0].clone();

    for donor in &members[1..] {
        take_longer(&mut merged.title, &donor.title);
        take_longer(&mut merged.description, &donor.description);
        take_longer(&mut merged.creator, &donor.creator);
        take_longer(&mut merged.rights, &donor.rights);
        take_longer(&mut merged.license, &donor.license);
        take_longer(&mut merged.location_text, &donor.location_text);

        merged.subject.extend(donor.subject.iter().cloned());
        merged.keywords.extend(donor.keywords.iter().cloned());

        if merged.download_url.is_none() {
            merged.download_url = donor.download_url.clone();
        }
        if merged.thumbnail_url.is_none() {
            merged.thumbnail_url = donor.thumbnail_url.clone();
        }
        if merged.content_hash.is_none() {
            merged.content_hash = donor.content_hash.clone();
        }
        if merged.mime_type.is_empty() {
            merged.mime_type = donor.mime_type.clone();
        }

        // A present coordinate beats a place-name-only location
        if merged.coordinates.is_none() {
            merged.coordinates = donor.coordinates;
        }

        if temporal_width(donor) < temporal_width(&merged) {
            merged.date_created = donor.date_created;
            merged.date_range_start = donor.date_range_start;
            merged.date_range_end = donor.date_range_end;
            merged.date_uncertainty = donor.date_uncertainty;
        }

        // Shallow merge: the primary donor's keys win on conflict
        for (key, value) in &donor.extra {
            merged
                .extra
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }

    // Provenance is never discarded
    let mut sources: Vec<&str> = members.iter().map(|m| m.source_url.as_str()).collect();
    sources.sort_unstable();
    sources.dedup();
    merged
        .extra
        .insert(DUPLICATE_SOURCES_KEY.to_string(), json!(sources));
    merged
        .extra
        .insert("merged_count".to_string(), json!(members.len()));
    let ids: Vec<&str> = members.iter().map(|m| m.id.as_str()).collect();
    merged.extra.insert("merged_ids".to_string(), json!(ids));

    MergeOutcome::Merged(merged)
}

/// Replace `current` when the donor value is strictly longer; the
/// earlier (primary-first) donor wins ties.
fn take_longer(current: &mut String, donor: &str) {
    if donor.len() > current.len() {
        *current = donor.to_string();
    }
}

/// Width in days of a record's temporal claim. A point date is exact
/// (width 0); a range is its span; no date information is unbounded.
fn temporal_width(record: &Record) -> i64 {
    if record.date_created.is_some() {
        return 0;
    }
    match (record.date_range_start, record.date_range_end) {
        (Some(start), Some(end)) => (end - start).num_days().abs(),
        _ => i64::MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tessera_domain::{DataType, GeoPoint};

    fn record(archive: &str, id: &str, title: &str) -> Record {
        let mut r = Record::new(id, archive, format!("http://{archive}.org/{id}"));
        r.title = title.to_string();
        r.data_type = DataType::Image;
        r
    }

    fn expect_merged(outcome: MergeOutcome) -> Record {
        match outcome {
            MergeOutcome::Merged(r) => r,
            MergeOutcome::TypeMismatch(_) => panic!("expected a merged record"),
        }
    }

    #[test]
    fn test_primary_donor_is_smallest_archive_then_id() {
        let merged = expect_merged(merge_cluster(vec![
            record("Y", "b7", "Title"),
            record("X", "a1", "Title"),
        ]));
        assert_eq!(merged.id, "a1");
        assert_eq!(merged.source_archive, "X");
        assert_eq!(merged.source_url, "http://X.org/a1");
    }

    #[test]
    fn test_longest_scalar_wins() {
        let mut a = record("X", "a1", "Mosque");
        a.description = "short".to_string();
        let mut b = record("Y", "b7", "Mosque Photograph");
        b.description = "a considerably longer description".to_string();
        let merged = expect_merged(merge_cluster(vec![a, b]));
        assert_eq!(merged.title, "Mosque Photograph");
        assert_eq!(merged.description, "a considerably longer description");
    }

    #[test]
    fn test_sets_are_unioned() {
        let mut a = record("X", "a1", "T");
        a.subject.insert("mosque".to_string());
        let mut b = record("Y", "b7", "T");
        b.subject.insert("ottoman".to_string());
        b.keywords.insert("postcard".to_string());
        let merged = expect_merged(merge_cluster(vec![a, b]));
        assert!(merged.subject.contains("mosque"));
        assert!(merged.subject.contains("ottoman"));
        assert!(merged.keywords.contains("postcard"));
    }

    #[test]
    fn test_narrower_date_range_wins() {
        let mut a = record("X", "a1", "T");
        a.date_range_start = NaiveDate::from_ymd_opt(1301, 1, 1);
        a.date_range_end = NaiveDate::from_ymd_opt(1400, 12, 31);
        let mut b = record("Y", "b7", "T");
        b.date_range_start = NaiveDate::from_ymd_opt(1320, 1, 1);
        b.date_range_end = NaiveDate::from_ymd_opt(1340, 12, 31);
        let merged = expect_merged(merge_cluster(vec![a, b]));
        assert_eq!(merged.date_range_start, NaiveDate::from_ymd_opt(1320, 1, 1));
        assert_eq!(merged.date_range_end, NaiveDate::from_ymd_opt(1340, 12, 31));
    }

    #[test]
    fn test_point_date_beats_range() {
        let mut a = record("X", "a1", "T");
        a.date_range_start = NaiveDate::from_ymd_opt(1900, 1, 1);
        a.date_range_end = NaiveDate::from_ymd_opt(1950, 12, 31);
        let mut b = record("Y", "b7", "T");
        b.date_created = NaiveDate::from_ymd_opt(1912, 3, 12);
        let merged = expect_merged(merge_cluster(vec![a, b]));
        assert_eq!(merged.date_created, NaiveDate::from_ymd_opt(1912, 3, 12));
    }

    #[test]
    fn test_coordinates_beat_place_name_only() {
        let mut a = record("X", "a1", "T");
        a.location_text = "Antakya, Hatay Province, Turkey".to_string();
        let mut b = record("Y", "b7", "T");
        b.coordinates = Some(GeoPoint::new(36.2, 36.16));
        let merged = expect_merged(merge_cluster(vec![a, b]));
        assert_eq!(merged.coordinates, Some(GeoPoint::new(36.2, 36.16)));
        assert_eq!(merged.location_text, "Antakya, Hatay Province, Turkey");
    }

    #[test]
    fn test_provenance_records_every_source_url() {
        let merged = expect_merged(merge_cluster(vec![
            record("X", "a1", "T"),
            record("Y", "b7", "T"),
        ]));
        let sources = merged.extra.get(DUPLICATE_SOURCES_KEY).unwrap();
        assert_eq!(sources, &json!(["http://X.org/a1", "http://Y.org/b7"]));
        assert_eq!(merged.extra.get("merged_count"), Some(&json!(2)));
    }

    #[test]
    fn test_primary_extra_keys_win_on_conflict() {
        let mut a = record("X", "a1", "T");
        a.extra.insert("iiif".to_string(), json!("from-primary"));
        let mut b = record("Y", "b7", "T");
        b.extra.insert("iiif".to_string(), json!("from-donor"));
        b.extra.insert("only_donor".to_string(), json!(1));
        let merged = expect_merged(merge_cluster(vec![a, b]));
        assert_eq!(merged.extra.get("iiif"), Some(&json!("from-primary")));
        assert_eq!(merged.extra.get("only_donor"), Some(&json!(1)));
    }

    #[test]
    fn test_type_mismatch_passes_through_flagged() {
        let a = record("X", "a1", "Same Title");
        let mut b = record("Y", "b7", "Same Title");
        b.data_type = DataType::Manuscript;
        match merge_cluster(vec![a, b]) {
            MergeOutcome::TypeMismatch(records) => {
                assert_eq!(records.len(), 2);
                for r in &records {
                    assert_eq!(r.extra.get(DEDUP_FLAG_KEY), Some(&json!("type_mismatch")));
                }
            }
            MergeOutcome::Merged(_) => panic!("type mismatch must not merge"),
        }
    }

    #[test]
    fn test_merge_is_order_independent() {
        let mut a = record("X", "a1", "Short");
        a.subject.insert("mosque".to_string());
        let mut b = record("Y", "b7", "A Longer Title");
        b.date_created = NaiveDate::from_ymd_opt(1912, 1, 1);
        let mut c = record("Z", "c3", "Mid Title");
        c.coordinates = Some(GeoPoint::new(36.2, 36.16));

        let abc = expect_merged(merge_cluster(vec![a.clone(), b.clone(), c.clone()]));
        let cba = expect_merged(merge_cluster(vec![c, b, a]));
        assert_eq!(abc, cba);
    }
}
