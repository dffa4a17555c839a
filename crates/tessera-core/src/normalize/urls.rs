//! URL canonicalization
//!
//! Two URLs that differ only in scheme/host case, default ports,
//! tracking parameters, or a trailing slash must normalize identically:
//! the normalized URL is the primary key for exact-duplicate detection.

use url::Url;

/// Query parameters that carry tracking state, not identity.
fn is_tracking_param(name: &str) -> bool {
    name.starts_with("utm_") || name == "fbclid" || name == "gclid"
}

/// Produce the canonical matching key for a URL.
///
/// Relative URLs are resolved against `base` when one is supplied.
/// Unparseable input degrades to a trimmed, lowercased fallback key
/// rather than an error: a malformed URL still gets a stable key and the
/// batch continues.
pub fn normalize_url(raw: &str, base: Option<&str>) -> String {
    let trimmed = raw.trim();
    let parsed = match Url::parse(trimmed) {
        Ok(u) => Some(u),
        Err(url::ParseError::RelativeUrlWithoutBase) => base
            .and_then(|b| Url::parse(b).ok())
            .and_then(|b| b.join(trimmed).ok()),
        Err(_) => None,
    };

    let Some(mut url) = parsed else {
        return trimmed.to_lowercase();
    };

    // The url crate already lowercases scheme and host and drops default
    // ports; tracking parameters and fragments are ours to strip.
    url.set_fragment(None);
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(name, _)| !is_tracking_param(name))
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();
    if kept.is_empty() {
        url.set_query(None);
    } else {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        serializer.extend_pairs(kept);
        url.set_query(Some(&serializer.finish()));
    }

    let mut out = url.to_string();
    while out.ends_with('/') && url.path() != "/" {
        out.pop();
    }
    // A bare authority keeps no trailing slash either
    if out.ends_with('/') {
        out.pop();
    }
    out
}
