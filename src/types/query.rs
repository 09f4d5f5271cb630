use serde::{Deserialize, Serialize};

/// Listing order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Most recently added first (id descending).
    #[default]
    NewestFirst,
    OldestFirst,
    /// Natural order on titles, so "Part 2" sorts before "Part 10".
    TitleAsc,
    TitleDesc,
}

/// Filter and ordering applied to a decrypted listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkQuery {
    /// Whitespace-separated terms; every term must appear in title, url, domain or tags.
    pub keyword: String,
    /// Case-insensitive substring match against the tag string.
    pub tag: Option<String>,
    pub sort: SortOrder,
}
