// Bookmark search, ordering and grouping over a decrypted listing.
// Encrypted columns cannot be matched in SQL, so filtering runs in memory.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::types::bookmark::BookmarkRecord;
use crate::types::query::{BookmarkQuery, SortOrder};

/// Filters and orders `records` according to `query`.
pub fn apply_query(records: Vec<BookmarkRecord>, query: &BookmarkQuery) -> Vec<BookmarkRecord> {
    let keyword = query.keyword.trim().to_lowercase();
    let terms: Vec<&str> = keyword.split_whitespace().collect();
    let tag = query
        .tag
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase);

    let mut filtered: Vec<BookmarkRecord> = records
        .into_iter()
        .filter(|bm| match &tag {
            Some(tag) => bm.tags.to_lowercase().contains(tag.as_str()),
            None => true,
        })
        .filter(|bm| {
            if terms.is_empty() {
                return true;
            }
            let haystack =
                format!("{} {} {} {}", bm.title, bm.url, bm.domain, bm.tags).to_lowercase();
            terms.iter().all(|t| haystack.contains(t))
        })
        .collect();

    sort_records(&mut filtered, query.sort);
    filtered
}

/// Sorts in place. Title orders use natural comparison.
pub fn sort_records(records: &mut [BookmarkRecord], order: SortOrder) {
    match order {
        SortOrder::NewestFirst => records.sort_by(|a, b| b.id.cmp(&a.id)),
        SortOrder::OldestFirst => records.sort_by(|a, b| a.id.cmp(&b.id)),
        SortOrder::TitleAsc => records.sort_by(|a, b| natural_cmp(&a.title, &b.title)),
        SortOrder::TitleDesc => records.sort_by(|a, b| natural_cmp(&b.title, &a.title)),
    }
}

/// Buckets records by group (falling back to domain), preserving their order inside each bucket.
pub fn group_records(records: Vec<BookmarkRecord>) -> BTreeMap<String, Vec<BookmarkRecord>> {
    let mut groups: BTreeMap<String, Vec<BookmarkRecord>> = BTreeMap::new();
    for bm in records {
        let key = if bm.group.is_empty() {
            bm.domain.clone()
        } else {
            bm.group.clone()
        };
        groups.entry(key).or_default().push(bm);
    }
    groups
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Chunk {
    // Variant order matters: text chunks sort before numeric ones at the same position.
    Text(String),
    Number(u128, usize),
}

fn chunks(s: &str) -> Vec<Chunk> {
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut in_digits = false;
    for c in s.chars() {
        let is_digit = c.is_ascii_digit();
        if !buf.is_empty() && is_digit != in_digits {
            out.push(make_chunk(std::mem::take(&mut buf), in_digits));
        }
        in_digits = is_digit;
        buf.push(c);
    }
    if !buf.is_empty() {
        out.push(make_chunk(buf, in_digits));
    }
    out
}

fn make_chunk(buf: String, digits: bool) -> Chunk {
    if digits {
        let len = buf.len();
        match buf.parse::<u128>() {
            Ok(n) => Chunk::Number(n, len),
            Err(_) => Chunk::Text(buf),
        }
    } else {
        Chunk::Text(buf.to_lowercase())
    }
}

/// Case-insensitive comparison that orders embedded numbers by value ("2" < "10").
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    chunks(a)
        .cmp(&chunks(b))
        .then_with(|| a.cmp(b))
}
