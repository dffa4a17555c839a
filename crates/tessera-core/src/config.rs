//! Pipeline configuration
//!
//! Thresholds and weights are first-class configuration, loadable from a
//! TOML file. Invalid values are fatal at startup — never mid-batch.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// How candidate-duplicate edges are grown into clusters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusteringMode {
    /// Connected components over candidate edges: if A~B and B~C then
    /// A, B, C cluster together even when A and C were never directly
    /// compared above threshold. Favors recall; risks chaining.
    Transitive,
    /// Greedy seed grouping: a record joins a cluster only on a direct
    /// above-threshold edge to the cluster seed. Favors precision.
    PairwiseOnly,
}

/// Deduplication tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// A pair is a candidate duplicate when its score reaches this value.
    pub similarity_threshold: f64,
    /// Weight of the title-similarity signal.
    pub title_weight: f64,
    /// Weight of the metadata-overlap signal.
    pub metadata_weight: f64,
    /// Weight of the content-hash signal.
    pub hash_weight: f64,
    /// A hash match alone guarantees at least this total score.
    pub hash_match_floor: f64,
    /// Maximum Hamming distance for perceptual hashes to count as equal.
    pub max_hamming_distance: u32,
    pub clustering: ClusteringMode,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.75,
            title_weight: 0.4,
            metadata_weight: 0.35,
            hash_weight: 0.25,
            hash_match_floor: 0.8,
            max_hamming_distance: 6,
            clustering: ClusteringMode::Transitive,
        }
    }
}

impl DedupConfig {
    /// The threshold comparison, in one place: the boundary value itself
    /// is a candidate.
    pub fn is_candidate(&self, score: f64) -> bool {
        score >= self.similarity_threshold
    }
}

/// Which artifacts a run produces.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub workbook: bool,
    pub document: bool,
    pub snapshot: bool,
    pub report: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            workbook: true,
            document: true,
            snapshot: true,
            report: true,
        }
    }
}

/// Top-level pipeline configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub dedup: DedupConfig,
    pub export: ExportConfig,
}

/// Configuration problems. All fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("similarity_threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),
    #[error("{name} must be a finite non-negative number, got {value}")]
    InvalidWeight { name: &'static str, value: f64 },
    #[error("signal weights must not all be zero")]
    ZeroWeights,
    #[error("hash_match_floor must be within [0, 1], got {0}")]
    InvalidHashFloor(f64),
}

impl PipelineConfig {
    /// Parse and validate a TOML configuration string.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_toml_str(&input)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.dedup;
        if !d.similarity_threshold.is_finite()
            || !(0.0..=1.0).contains(&d.similarity_threshold)
        {
            return Err(ConfigError::InvalidThreshold(d.similarity_threshold));
        }
        for (name, value) in [
            ("title_weight", d.title_weight),
            ("metadata_weight", d.metadata_weight),
            ("hash_weight", d.hash_weight),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight { name, value });
            }
        }
        if d.title_weight + d.metadata_weight + d.hash_weight == 0.0 {
            return Err(ConfigError::ZeroWeights);
        }
        if !d.hash_match_floor.is_finite() || !(0.0..=1.0).contains(&d.hash_match_floor) {
            return Err(ConfigError::InvalidHashFloor(d.hash_match_floor));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_threshold_boundary_is_candidate() {
        let config = DedupConfig::default();
        assert!(config.is_candidate(0.75));
        assert!(!config.is_candidate(0.7499));
    }

    #[test]
    fn test_toml_round_trip_with_overrides() {
        let config = PipelineConfig::from_toml_str(
            r#"
            [dedup]
            similarity_threshold = 0.9
            clustering = "pairwise_only"

            [export]
            snapshot = false
            "#,
        )
        .unwrap();
        assert_eq!(config.dedup.similarity_threshold, 0.9);
        assert_eq!(config.dedup.clustering, ClusteringMode::PairwiseOnly);
        assert!(!config.export.snapshot);
        // Unspecified values keep their defaults
        assert_eq!(config.dedup.title_weight, 0.4);
        assert!(config.export.workbook);
    }

    #[test]
    fn test_invalid_threshold_is_fatal() {
        let result = PipelineConfig::from_toml_str("[dedup]\nsimilarity_threshold = 1.5\n");
        assert!(matches!(result, Err(ConfigError::InvalidThreshold(_))));
    }

    #[test]
    fn test_all_zero_weights_rejected() {
        let result = PipelineConfig::from_toml_str(
            "[dedup]\ntitle_weight = 0.0\nmetadata_weight = 0.0\nhash_weight = 0.0\n",
        );
        assert!(matches!(result, Err(ConfigError::ZeroWeights)));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let result = PipelineConfig::from_toml_str("[dedup]\ntitle_weight = -0.4\n");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidWeight { name: "title_weight", .. })
        ));
    }
}
