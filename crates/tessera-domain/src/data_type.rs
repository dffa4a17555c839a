//! Content classification for harvested items

use serde::{Deserialize, Serialize};

/// Closed set of content types a record can carry.
///
/// Anything an archive reports that does not map onto one of the
/// specific variants lands in `Other` rather than failing the record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Image,
    Text,
    Manuscript,
    Pdf,
    Audio,
    Other,
}

impl DataType {
    /// All variants, in export order.
    pub const ALL: [DataType; 6] = [
        DataType::Image,
        DataType::Text,
        DataType::Manuscript,
        DataType::Pdf,
        DataType::Audio,
        DataType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Image => "image",
            DataType::Text => "text",
            DataType::Manuscript => "manuscript",
            DataType::Pdf => "pdf",
            DataType::Audio => "audio",
            DataType::Other => "other",
        }
    }

    /// Parse an archive-reported type string, falling back to `Other`.
    pub fn parse_lenient(value: &str) -> DataType {
        match value.trim().to_lowercase().as_str() {
            "image" | "photo" | "photograph" | "drawing" | "map" => DataType::Image,
            "text" => DataType::Text,
            "manuscript" | "handwritten" => DataType::Manuscript,
            "pdf" => DataType::Pdf,
            "audio" | "sound" => DataType::Audio,
            _ => DataType::Other,
        }
    }
}

impl Default for DataType {
    fn default() -> Self {
        DataType::Other
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lenient() {
        assert_eq!(DataType::parse_lenient("Photograph"), DataType::Image);
        assert_eq!(DataType::parse_lenient("handwritten"), DataType::Manuscript);
        assert_eq!(DataType::parse_lenient("video"), DataType::Other);
        assert_eq!(DataType::parse_lenient(""), DataType::Other);
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&DataType::Manuscript).unwrap(),
            "\"manuscript\""
        );
    }
}
