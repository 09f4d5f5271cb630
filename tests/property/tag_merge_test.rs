//! Property-based tests for tag merging.
//!
//! The case-insensitive union keeps every existing tag in order, adds each
//! incoming tag at most once, and never holds two tags equal ignoring case.

use std::collections::HashSet;

use proptest::prelude::*;
use secretmarks::services::tags::{merge_case_insensitive, merge_tag_strings, parse_tags};

fn arb_tags() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[a-zA-Z]{1,4}", 0..6)
}

fn dedup_ci(tags: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.into_iter()
        .filter(|t| seen.insert(t.to_lowercase()))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn union_keeps_existing_prefix(existing in arb_tags(), incoming in arb_tags()) {
        let existing = dedup_ci(existing);
        let merged = merge_case_insensitive(&existing, &incoming);
        prop_assert_eq!(&merged[..existing.len()], &existing[..]);
    }

    #[test]
    fn union_has_no_case_insensitive_repeats(existing in arb_tags(), incoming in arb_tags()) {
        let merged = merge_case_insensitive(&existing, &incoming);
        let lowered: HashSet<String> = merged.iter().map(|t| t.to_lowercase()).collect();
        prop_assert_eq!(lowered.len(), merged.len());

        for tag in existing.iter().chain(incoming.iter()) {
            prop_assert!(lowered.contains(&tag.to_lowercase()));
        }
    }

    #[test]
    fn merge_strings_is_idempotent(existing in arb_tags()) {
        let stored = existing.join(", ");
        let merged = merge_tag_strings(&stored, &stored);
        prop_assert_eq!(parse_tags(&merged), dedup_ci(existing));
    }
}
