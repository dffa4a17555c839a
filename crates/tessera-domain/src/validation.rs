//! Identity validation for records entering the pipeline

use crate::Record;

/// Why a record was refused admission to a batch.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("record has an empty id")]
    EmptyId,
    #[error("record {0} has an empty source archive")]
    EmptyArchive(String),
    #[error("record {0} has an empty source url")]
    EmptyUrl(String),
}

/// Check the mandatory identity fields. Everything else is optional by
/// design and never rejected.
pub fn validate_identity(record: &Record) -> Result<(), IdentityError> {
    if record.id.trim().is_empty() {
        return Err(IdentityError::EmptyId);
    }
    if record.source_archive.trim().is_empty() {
        return Err(IdentityError::EmptyArchive(record.id.clone()));
    }
    if record.source_url.trim().is_empty() {
        return Err(IdentityError::EmptyUrl(record.id.clone()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_record_passes() {
        let r = Record::new("a1", "dpla", "http://dp.la/item/1");
        assert!(validate_identity(&r).is_ok());
    }

    #[test]
    fn test_blank_fields_rejected() {
        let r = Record::new("  ", "dpla", "http://dp.la/item/1");
        assert_eq!(validate_identity(&r), Err(IdentityError::EmptyId));

        let r = Record::new("a1", "", "http://dp.la/item/1");
        assert!(matches!(
            validate_identity(&r),
            Err(IdentityError::EmptyArchive(_))
        ));

        let r = Record::new("a1", "dpla", " ");
        assert!(matches!(
            validate_identity(&r),
            Err(IdentityError::EmptyUrl(_))
        ));
    }
}
