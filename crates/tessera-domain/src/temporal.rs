//! Temporal qualifiers for archive dates

use serde::{Deserialize, Serialize};

/// Qualifier attached to a parsed date or date range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateUncertainty {
    Circa,
    Before,
    After,
    Century,
}

impl DateUncertainty {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateUncertainty::Circa => "circa",
            DateUncertainty::Before => "before",
            DateUncertainty::After => "after",
            DateUncertainty::Century => "century",
        }
    }
}

impl std::fmt::Display for DateUncertainty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
