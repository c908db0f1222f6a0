//! Host pattern matching
//!
//! Tests whether a host or URL is already covered by one of the host
//! patterns the platform has granted. Matching is deliberately loose: a
//! granted pattern covers a host when it contains the normalized host as a
//! substring, which is how wildcard patterns like `*://example.com/*` end up
//! matching `example.com`. Callers rely on this behavior when deciding
//! whether a grant prompt can be skipped, so it must not be tightened into
//! real origin-pattern evaluation.

/// Reduce a URL or host string to a bare lowercase host.
///
/// Strips everything up to and including a `"://"` scheme separator, then
/// truncates at the first `/`. Pure and total; idempotent, and an empty
/// input yields an empty output.
pub fn normalize_host(host: &str) -> String {
    let mut corrected = host;
    if let Some((_, rest)) = corrected.split_once("://") {
        corrected = rest;
    }
    if let Some((bare, _)) = corrected.split_once('/') {
        corrected = bare;
    }
    corrected.to_lowercase()
}

/// Whether any granted pattern covers the given host.
///
/// Each pattern is lowercased and checked for the normalized host as a
/// substring. The check is asymmetric: the host is normalized, the stored
/// patterns are not.
pub fn contains_host_permission(granted_hosts: &[String], host: &str) -> bool {
    let normalized = normalize_host(host);
    granted_hosts
        .iter()
        .any(|granted| granted.to_lowercase().contains(&normalized))
}
