//! Duplicate reconciliation for SecretMarks.
//!
//! Every add or edit first looks up the candidate's URL fingerprint. When another record
//! already owns it, a [`DecisionStrategy`] picks merge, overwrite or skip and the
//! [`Reconciler`] applies that choice to the store.

use rusqlite::Connection;

use crate::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use crate::services::crypto_service::SessionKey;
use crate::services::fingerprint::fingerprint;
use crate::services::tags::merge_tag_strings;
use crate::services::url_normalizer::{extract_domain, validate_url};
use crate::types::bookmark::{BookmarkFields, BookmarkRecord};
use crate::types::errors::BookmarkError;
use crate::types::reconcile::{ReconcileDecision, ReconcileOutcome};

/// Supplies the user's answer when a candidate collides with an existing record.
pub trait DecisionStrategy {
    fn decide(&mut self, existing: &BookmarkRecord, candidate: &BookmarkFields)
        -> ReconcileDecision;
}

impl<F> DecisionStrategy for F
where
    F: FnMut(&BookmarkRecord, &BookmarkFields) -> ReconcileDecision,
{
    fn decide(
        &mut self,
        existing: &BookmarkRecord,
        candidate: &BookmarkFields,
    ) -> ReconcileDecision {
        self(existing, candidate)
    }
}

/// Answers every collision the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDecision(pub ReconcileDecision);

impl DecisionStrategy for FixedDecision {
    fn decide(&mut self, _: &BookmarkRecord, _: &BookmarkFields) -> ReconcileDecision {
        self.0
    }
}

/// Combines an existing record with an incoming candidate.
///
/// Tags are unioned case-insensitively, existing tags first. The longer title wins
/// (ties keep the existing one) and brings its domain and group along. The URL is always
/// the incoming one.
pub fn merge_fields(existing: &BookmarkRecord, candidate: &BookmarkFields) -> BookmarkFields {
    let tags = merge_tag_strings(&existing.tags, &candidate.tags);
    let candidate_wins = candidate.title.chars().count() > existing.title.chars().count();

    let (domain, title, group) = if candidate_wins {
        (
            candidate.domain.clone(),
            candidate.title.clone(),
            candidate.effective_group().to_string(),
        )
    } else {
        let group = if existing.group.is_empty() {
            candidate.group.clone()
        } else {
            existing.group.clone()
        };
        (existing.domain.clone(), existing.title.clone(), group)
    };

    BookmarkFields {
        domain,
        title,
        url: candidate.url.clone(),
        tags,
        group,
    }
}

/// Runs adds and edits through the duplicate check.
pub struct Reconciler<'a> {
    store: BookmarkManager<'a>,
}

impl<'a> Reconciler<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self {
            store: BookmarkManager::new(conn),
        }
    }

    /// The underlying record store, for listing and tag queries.
    pub fn store(&self) -> &BookmarkManager<'a> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut BookmarkManager<'a> {
        &mut self.store
    }

    /// Returns the record whose fingerprint matches `url`, if any.
    pub fn check_duplicate(
        &self,
        url: &str,
        key: &SessionKey,
    ) -> Result<Option<BookmarkRecord>, BookmarkError> {
        self.store.find_by_fingerprint(&fingerprint(url), key)
    }

    /// Applies `decision` to `existing` for a newly added candidate.
    ///
    /// The candidate is validated like any other add, and its URL must share
    /// `existing`'s fingerprint.
    pub fn apply_reconciliation(
        &mut self,
        decision: ReconcileDecision,
        existing: &BookmarkRecord,
        candidate: &BookmarkFields,
        key: &SessionKey,
    ) -> Result<ReconcileOutcome, BookmarkError> {
        let candidate = prepare(candidate)?;
        let existing_fp = existing
            .url_fingerprint
            .clone()
            .unwrap_or_else(|| fingerprint(&existing.url));
        if fingerprint(&candidate.url) != existing_fp {
            return Err(BookmarkError::NotADuplicate(existing.id));
        }

        let outcome = match decision {
            ReconcileDecision::Merge => {
                let merged = merge_fields(existing, &candidate);
                self.store.update_full(existing.id, &merged, key)?;
                ReconcileOutcome::Merged(existing.id)
            }
            ReconcileDecision::Overwrite => {
                self.store.update_full(existing.id, &candidate, key)?;
                ReconcileOutcome::Overwritten(existing.id)
            }
            ReconcileDecision::Skip => ReconcileOutcome::Skipped(existing.id),
        };
        tracing::debug!(?outcome, "reconciled duplicate bookmark");
        Ok(outcome)
    }

    /// Adds `candidate`, consulting `strategy` only when its URL is already stored.
    pub fn add<S: DecisionStrategy + ?Sized>(
        &mut self,
        candidate: &BookmarkFields,
        key: &SessionKey,
        strategy: &mut S,
    ) -> Result<ReconcileOutcome, BookmarkError> {
        let candidate = prepare(candidate)?;
        match self.check_duplicate(&candidate.url, key)? {
            None => Ok(ReconcileOutcome::Inserted(self.store.insert(&candidate, key)?)),
            Some(existing) => {
                let decision = strategy.decide(&existing, &candidate);
                self.apply_reconciliation(decision, &existing, &candidate, key)
            }
        }
    }

    /// Saves an edit of record `id`.
    ///
    /// If the new URL belongs to a different record, that record absorbs the merge or
    /// overwrite and `id` is deleted in the same transaction. A collision with `id`
    /// itself is a plain update.
    pub fn edit<S: DecisionStrategy + ?Sized>(
        &mut self,
        id: i64,
        candidate: &BookmarkFields,
        key: &SessionKey,
        strategy: &mut S,
    ) -> Result<ReconcileOutcome, BookmarkError> {
        let candidate = prepare(candidate)?;
        self.store.get_by_id(id, key)?;

        let existing = match self.check_duplicate(&candidate.url, key)? {
            Some(existing) if existing.id != id => existing,
            _ => {
                self.store.update_full(id, &candidate, key)?;
                return Ok(ReconcileOutcome::Updated(id));
            }
        };

        let outcome = match strategy.decide(&existing, &candidate) {
            ReconcileDecision::Merge => {
                let merged = merge_fields(&existing, &candidate);
                self.store.replace_and_delete(existing.id, &merged, id, key)?;
                ReconcileOutcome::Merged(existing.id)
            }
            ReconcileDecision::Overwrite => {
                self.store
                    .replace_and_delete(existing.id, &candidate, id, key)?;
                ReconcileOutcome::Overwritten(existing.id)
            }
            ReconcileDecision::Skip => ReconcileOutcome::Skipped(existing.id),
        };
        tracing::debug!(edited = id, ?outcome, "reconciled edited bookmark");
        Ok(outcome)
    }
}

/// Validates the candidate URL and fills in a missing domain.
fn prepare(candidate: &BookmarkFields) -> Result<BookmarkFields, BookmarkError> {
    let url = validate_url(&candidate.url)?;
    let mut prepared = candidate.clone();
    if prepared.domain.is_empty() {
        prepared.domain = extract_domain(&url);
    }
    prepared.url = url;
    Ok(prepared)
}
