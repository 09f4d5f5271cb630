//! Property-based tests for URL normalization and fingerprints.
//!
//! Trivial variants of a URL (case of scheme and host, default port, fragment,
//! trailing slash, tracking parameters, parameter order) share one fingerprint,
//! and normalization is idempotent.

use proptest::prelude::*;
use secretmarks::services::fingerprint::fingerprint;
use secretmarks::services::url_normalizer::normalize_url;

/// A base URL plus its ordered query parameters.
fn arb_parts() -> impl Strategy<Value = (String, String, String, Vec<(String, String)>)> {
    (
        prop_oneof![Just("http".to_string()), Just("https".to_string())],
        "[a-z][a-z0-9]{1,10}\\.(com|org|io)",
        "(/[a-z0-9]{1,8}){0,3}",
        proptest::collection::vec(("[a-z]{1,5}", "[a-z0-9]{1,5}"), 0..4),
    )
}

fn build(scheme: &str, host: &str, path: &str, params: &[(String, String)]) -> String {
    let mut url = format!("{}://{}{}", scheme, host, path);
    if !params.is_empty() {
        let query: Vec<String> = params.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        url.push('?');
        url.push_str(&query.join("&"));
    }
    url
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn trivial_variants_share_fingerprint(
        (scheme, host, path, params) in arb_parts(),
        fragment in "[a-z]{1,6}",
    ) {
        let base = build(&scheme, &host, &path, &params);

        let default_port = if scheme == "https" { 443 } else { 80 };
        let mut reversed = params.clone();
        reversed.reverse();
        reversed.push(("utm_source".to_string(), "mail".to_string()));
        let variant = format!(
            "{}#{}",
            build(
                &scheme.to_uppercase(),
                &format!("{}:{}", host.to_uppercase(), default_port),
                &format!("{}/", path),
                &reversed,
            ),
            fragment
        );

        prop_assert_eq!(fingerprint(&base), fingerprint(&variant));
    }

    #[test]
    fn scheme_changes_fingerprint((_, host, path, params) in arb_parts()) {
        prop_assert_ne!(
            fingerprint(&build("http", &host, &path, &params)),
            fingerprint(&build("https", &host, &path, &params))
        );
    }

    #[test]
    fn normalization_is_idempotent((scheme, host, path, params) in arb_parts()) {
        let once = normalize_url(&build(&scheme, &host, &path, &params));
        prop_assert_eq!(normalize_url(&once), once.clone());
    }

    #[test]
    fn normalize_never_panics(input in any::<String>()) {
        let _ = normalize_url(&input);
    }
}
