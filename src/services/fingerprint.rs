use ring::digest::{digest, SHA256};

use super::url_normalizer::normalize_url;

/// Length of a fingerprint in hex characters.
pub const FINGERPRINT_HEX_LENGTH: usize = 64;

/// Deduplication key for `url`: lowercase hex SHA-256 of its normalized form.
pub fn fingerprint(url: &str) -> String {
    let normalized = normalize_url(url);
    hex::encode(digest(&SHA256, normalized.as_bytes()))
}
