//! URN helpers.
//!
//! URNs are opaque keys. The only structure relied upon is the shared
//! `urn:li:` prefix, the segment after the last colon, and a few fixed
//! literal prefixes.

use std::sync::LazyLock;

use regex::Regex;

/// Prefix shared by every provider URN.
pub const URN_PREFIX: &str = "urn:li:";

/// Prefix of dash profile URNs.
pub const FSD_PROFILE_PREFIX: &str = "urn:li:fsd_profile:";

/// Prefix of dash company URNs.
pub const FSD_COMPANY_PREFIX: &str = "urn:li:fsd_company:";

static TRAILING_NUMERIC_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(\d+)/?$").unwrap());

/// Whether a string looks like a URN (used for array-of-reference detection).
pub fn is_urn(s: &str) -> bool {
    s.starts_with(URN_PREFIX)
}

/// Stricter check: the prefix plus at least four colon-separated parts.
pub fn is_entity_urn(s: &str) -> bool {
    is_urn(s) && s.split(':').count() >= 4
}

/// The segment after the last colon.
pub fn id_from_urn(urn: &str) -> Option<&str> {
    urn.rsplit(':').next().filter(|id| !id.is_empty())
}

/// Strip a fixed literal prefix, returning the input unchanged when absent.
pub fn strip_urn_prefix<'a>(urn: &'a str, prefix: &str) -> &'a str {
    urn.strip_prefix(prefix).unwrap_or(urn)
}

/// Pull the inner URN out of a wrapped update URN.
///
/// `urn:li:fsd_entityResultViewModel:(urn:li:fsd_profile:ACo,SEARCH_SRP,DEFAULT)`
/// yields `urn:li:fsd_profile:ACo`.
pub fn urn_from_raw_update(update: &str) -> Option<&str> {
    let inner = update.split('(').nth(1)?;
    let first = inner.split(',').next()?.trim();
    let first = first.trim_end_matches(')');
    (!first.is_empty()).then_some(first)
}

/// Trailing numeric path segment of a URL (`.../company/1441/` yields `1441`).
pub fn numeric_suffix_from_url(url: &str) -> Option<&str> {
    TRAILING_NUMERIC_ID
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}
