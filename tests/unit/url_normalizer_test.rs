//! Unit tests for URL normalization, validation and fingerprinting.

use rstest::rstest;
use secretmarks::services::fingerprint::{fingerprint, FINGERPRINT_HEX_LENGTH};
use secretmarks::services::url_normalizer::{extract_domain, is_url, normalize_url, validate_url};
use secretmarks::types::errors::ValidationError;

#[rstest]
#[case("HTTPS://Example.COM/Path", "https://example.com/Path")]
#[case("https://example.com:443/a", "https://example.com/a")]
#[case("http://example.com:80/a", "http://example.com/a")]
#[case("http://example.com:8080/a", "http://example.com:8080/a")]
#[case("https://example.com", "https://example.com/")]
#[case("https://example.com//a///b/", "https://example.com/a/b")]
#[case("https://example.com/a#section", "https://example.com/a")]
#[case("https://example.com/a?b=2&a=1", "https://example.com/a?a=1&b=2")]
#[case(
    "https://example.com/a?utm_source=x&id=5&fbclid=abc&UTM_MEDIUM=y",
    "https://example.com/a?id=5"
)]
#[case("https://example.com/a?empty=&k=v", "https://example.com/a?k=v")]
#[case(
    "http://Example.com:80/path/?utm_source=x&b=2&a=1#frag",
    "http://example.com/path?a=1&b=2"
)]
fn test_normalize_url(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(normalize_url(input), expected);
}

/// Path case is significant.
#[test]
fn test_path_case_preserved() {
    assert_ne!(
        normalize_url("https://example.com/Docs"),
        normalize_url("https://example.com/docs")
    );
}

#[rstest]
#[case("ftp://example.com/file")]
#[case("mailto:someone@example.com")]
#[case("not a url")]
#[case("")]
fn test_non_http_input_returned_unchanged(#[case] input: &str) {
    assert_eq!(normalize_url(input), input);
}

#[test]
fn test_trivial_variants_share_fingerprint() {
    let base = fingerprint("https://example.com/page?a=1&b=2");
    for variant in [
        "HTTPS://EXAMPLE.COM/page?b=2&a=1",
        "https://example.com:443/page/?a=1&b=2#frag",
        "https://example.com//page?a=1&utm_campaign=spring&b=2",
    ] {
        assert_eq!(fingerprint(variant), base, "variant {}", variant);
    }
}

#[test]
fn test_scheme_is_significant() {
    assert_ne!(
        fingerprint("http://example.com/"),
        fingerprint("https://example.com/")
    );
    assert_ne!(
        fingerprint("http://Example.com:80/path/?utm_source=x&b=2&a=1#frag"),
        fingerprint("https://example.com/path/?a=1&b=2")
    );
}

/// URL parsing resolves dot segments, turns `\` into `/` and percent-encodes
/// spaces, so these spellings count as the same page.
#[rstest]
#[case("http://x.com/a/../b", "http://x.com/b")]
#[case("http://x.com/a/./b", "http://x.com/a/b")]
#[case("http://x.com\\a\\b", "http://x.com/a/b")]
#[case("http://x.com/a b", "http://x.com/a%20b")]
fn test_parser_level_equivalences(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(normalize_url(input), expected);
    assert_eq!(fingerprint(input), fingerprint(expected));
}

#[test]
fn test_fingerprint_shape() {
    let fp = fingerprint("https://example.com/");
    assert_eq!(fp.len(), FINGERPRINT_HEX_LENGTH);
    assert!(fp.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[rstest]
#[case("https://example.com", true)]
#[case("  HTTP://example.com", true)]
#[case("ftp://example.com", false)]
#[case("example.com", false)]
fn test_is_url(#[case] input: &str, #[case] expected: bool) {
    assert_eq!(is_url(input), expected);
}

#[test]
fn test_validate_url() {
    assert_eq!(
        validate_url("  https://example.com/x  ").unwrap(),
        "https://example.com/x"
    );
    assert!(matches!(
        validate_url("ftp://example.com"),
        Err(ValidationError::UnsupportedScheme(_))
    ));
    assert!(matches!(validate_url("nope"), Err(ValidationError::InvalidUrl(_))));
    assert!(matches!(validate_url("   "), Err(ValidationError::InvalidUrl(_))));
}

#[rstest]
#[case("https://www.Example.com/a", "www.example.com")]
#[case("http://localhost:3000/", "localhost:3000")]
#[case("garbage", "garbage")]
fn test_extract_domain(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(extract_domain(input), expected);
}
