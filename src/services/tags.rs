// Tag list helpers.
// Tags are stored as one comma-joined string; identity is case-sensitive, but merging
// treats tags that differ only by case as the same tag.

use std::collections::HashSet;

use crate::types::reconcile::TagEditMode;

/// Separator used when joining tags for storage.
pub const TAG_SEPARATOR: &str = ", ";

/// Splits a stored tag string on commas, trimming and dropping empty entries.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Joins tags for storage, dropping exact repeats while keeping first-seen order.
pub fn join_unique<S: AsRef<str>>(tags: &[S]) -> String {
    let mut seen = HashSet::new();
    let mut out: Vec<&str> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.as_ref();
        if seen.insert(tag) {
            out.push(tag);
        }
    }
    out.join(TAG_SEPARATOR)
}

/// Case-insensitive union: `current` first, then each of `to_add` that has no
/// case-insensitive match yet. The first casing seen wins.
pub fn merge_case_insensitive<S: AsRef<str>>(current: &[S], to_add: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(current.len() + to_add.len());
    for tag in current.iter().chain(to_add.iter()) {
        let tag = tag.as_ref();
        if seen.insert(tag.to_lowercase()) {
            out.push(tag.to_string());
        }
    }
    out
}

/// Merges two stored tag strings, returning the stored form of the union.
pub fn merge_tag_strings(existing: &str, incoming: &str) -> String {
    join_unique(&merge_case_insensitive(
        &parse_tags(existing),
        &parse_tags(incoming),
    ))
}

/// Applies a bulk edit to one record's stored tag string.
pub fn apply_tag_edit(current: &str, mode: TagEditMode, inputs: &[String]) -> String {
    let current = parse_tags(current);
    let edited = match mode {
        TagEditMode::Replace => inputs.to_vec(),
        TagEditMode::Add => merge_case_insensitive(&current, inputs),
        TagEditMode::Remove => {
            let remove: HashSet<&str> = inputs.iter().map(String::as_str).collect();
            current
                .into_iter()
                .filter(|t| !remove.contains(t.as_str()))
                .collect()
        }
    };
    join_unique(&edited)
}
