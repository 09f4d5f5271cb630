use serde::{Deserialize, Serialize};

use crate::services::url_normalizer::extract_domain;

/// A decrypted bookmark as held in the vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkRecord {
    pub id: i64,
    pub domain: String,
    pub title: String,
    pub url: String,
    /// Comma-joined tag list.
    pub tags: String,
    pub group: String,
    /// `None` only for legacy rows that backfill could not fingerprint.
    pub url_fingerprint: Option<String>,
}

impl BookmarkRecord {
    /// The record's editable fields, detached from its id and fingerprint.
    pub fn fields(&self) -> BookmarkFields {
        BookmarkFields {
            domain: self.domain.clone(),
            title: self.title.clone(),
            url: self.url.clone(),
            tags: self.tags.clone(),
            group: self.group.clone(),
        }
    }
}

/// A candidate bookmark coming from an add or edit dialog, or the clipboard watcher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkFields {
    pub domain: String,
    pub title: String,
    pub url: String,
    pub tags: String,
    pub group: String,
}

impl BookmarkFields {
    /// Builds a candidate from a URL, deriving the domain and defaulting the group to it.
    pub fn from_url(url: &str, title: &str, tags: &str) -> Self {
        let domain = extract_domain(url);
        Self {
            group: domain.clone(),
            domain,
            title: title.to_string(),
            url: url.to_string(),
            tags: tags.to_string(),
        }
    }

    /// Group as persisted: an empty group falls back to the domain.
    pub fn effective_group(&self) -> &str {
        if self.group.is_empty() {
            &self.domain
        } else {
            &self.group
        }
    }
}

/// Result of listing the vault.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookmarkListing {
    pub records: Vec<BookmarkRecord>,
    /// Rows left out because at least one field failed to decrypt.
    pub skipped: usize,
}

impl BookmarkListing {
    /// True when rows exist but none could be opened, which usually means a wrong key.
    pub fn all_undecryptable(&self) -> bool {
        self.records.is_empty() && self.skipped > 0
    }
}

/// Why a legacy row kept a NULL fingerprint during backfill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackfillFailure {
    /// The stored URL did not decrypt under the session key.
    Undecryptable,
    /// Another row already owns the computed fingerprint.
    DuplicateOf(i64),
}

/// Outcome of a fingerprint backfill pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackfillReport {
    pub updated: usize,
    pub failed: Vec<(i64, BackfillFailure)>,
}
