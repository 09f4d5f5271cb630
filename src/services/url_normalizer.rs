//! URL canonicalization for duplicate detection.
//!
//! [`normalize_url`] rewrites an http(s) URL so that variants a person would call
//! "the same page" compare equal: scheme and host case, default ports, doubled or
//! trailing slashes, fragments, tracking parameters and query parameter order.

use url::form_urlencoded;
use url::Url;

use crate::types::errors::ValidationError;

/// Query keys dropped during normalization, compared case-insensitively.
const TRACKING_KEYS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "utm_name",
    "utm_id",
    "utm_reader",
    "utm_viz_id",
    "utm_pubreferrer",
    "fbclid",
    "gclid",
    "igshid",
    "mc_cid",
    "mc_eid",
];

/// Returns true when `key` names a tracking parameter.
pub fn is_tracking_param(key: &str) -> bool {
    let lowered = key.to_lowercase();
    TRACKING_KEYS.iter().any(|k| *k == lowered)
}

/// Canonical form of `url`. Never fails: unparseable input and non-http(s) schemes
/// come back unchanged.
pub fn normalize_url(url: &str) -> String {
    try_normalize(url).unwrap_or_else(|| url.to_string())
}

fn try_normalize(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let scheme = parsed.scheme();
    if scheme != "http" && scheme != "https" {
        return None;
    }

    // `Url` already lowercases the host and reports default ports as `None`.
    let mut authority = parsed.host_str()?.to_lowercase();
    if let Some(port) = parsed.port() {
        authority.push(':');
        authority.push_str(&port.to_string());
    }

    let path = normalize_path(parsed.path());

    let mut params: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(k, v)| !k.is_empty() && !v.is_empty() && !is_tracking_param(k))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    params.sort();

    let mut out = format!("{}://{}{}", scheme, authority, path);
    if !params.is_empty() {
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params.iter())
            .finish();
        out.push('?');
        out.push_str(&query);
    }
    Some(out)
}

/// Collapses runs of `/`, defaults to `/`, and drops one trailing slash off non-root paths.
fn normalize_path(raw: &str) -> String {
    let mut path = String::with_capacity(raw.len());
    let mut prev_slash = false;
    for c in raw.chars() {
        if c == '/' {
            if prev_slash {
                continue;
            }
            prev_slash = true;
        } else {
            prev_slash = false;
        }
        path.push(c);
    }
    if path.is_empty() {
        path.push('/');
    }
    if path != "/" && path.ends_with('/') {
        path.pop();
    }
    path
}

/// Quick check used by the clipboard watcher: does the text look like an http(s) URL?
pub fn is_url(text: &str) -> bool {
    let text = text.trim_start();
    let lowered = text.get(..8).unwrap_or(text).to_ascii_lowercase();
    lowered.starts_with("http://") || lowered.starts_with("https://")
}

/// Manual-entry gate. Returns the trimmed URL when it is an http(s) URL with a host.
pub fn validate_url(text: &str) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::InvalidUrl("empty input".to_string()));
    }
    let parsed = Url::parse(trimmed)
        .map_err(|e| ValidationError::InvalidUrl(format!("{}: {}", trimmed, e)))?;
    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(ValidationError::UnsupportedScheme(scheme.to_string())),
    }
    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(trimmed.to_string()),
        _ => Err(ValidationError::MissingHost(trimmed.to_string())),
    }
}

/// `host[:port]` of `url`, or `url` itself when it cannot be parsed.
pub fn extract_domain(url: &str) -> String {
    let Ok(parsed) = Url::parse(url.trim()) else {
        return url.to_string();
    };
    match (parsed.host_str(), parsed.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        (None, _) => url.to_string(),
    }
}
