//! Text normalization
//!
//! Display fields keep their original casing; matching keys are a
//! separate, casefolded projection.

use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref FILE_EXT_SUFFIX: Regex =
        Regex::new(r"\s*(jpg|jpeg|png|tif|tiff|pdf)$").unwrap();
}

/// Clean a display value: trim and collapse internal whitespace runs.
/// Casing and punctuation are preserved.
pub fn clean_display_text(text: &str) -> String {
    collapse_whitespace(text.trim())
}

/// Produce the casefolded matching key for a text field: NFKD
/// decomposition, ASCII alphanumerics and spaces only, lowercased,
/// whitespace collapsed.
pub fn normalize_matching_text(text: &str) -> String {
    let filtered: String = text
        .nfkd()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_ascii_whitespace())
        .collect();
    collapse_whitespace(filtered.to_lowercase().trim())
}

/// Matching key for titles. Archives routinely title an asset after its
/// file name, so a trailing file extension is stripped before matching.
pub fn title_matching_key(title: &str) -> String {
    let normalized = normalize_matching_text(title);
    FILE_EXT_SUFFIX.replace(&normalized, "").into_owned()
}

fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_was_space = false;
    for c in s.chars() {
        if c.is_whitespace() {
            if !prev_was_space {
                result.push(' ');
                prev_was_space = true;
            }
        } else {
            result.push(c);
            prev_was_space = false;
        }
    }
    result
}
