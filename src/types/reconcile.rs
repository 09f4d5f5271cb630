use serde::{Deserialize, Serialize};

/// The caller's answer when a candidate collides with an existing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconcileDecision {
    Merge,
    Overwrite,
    Skip,
}

/// What a reconciliation run did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum ReconcileOutcome {
    /// No collision; a new record was created.
    Inserted(i64),
    /// No collision (or the collision was the edited record itself); updated in place.
    Updated(i64),
    /// The existing record absorbed the candidate.
    Merged(i64),
    /// The existing record was replaced by the candidate.
    Overwritten(i64),
    /// The candidate was discarded; the existing record is untouched.
    Skipped(i64),
}

impl ReconcileOutcome {
    /// Id of the record that now holds the candidate's URL (or kept its own, on skip).
    pub fn id(&self) -> i64 {
        match *self {
            ReconcileOutcome::Inserted(id)
            | ReconcileOutcome::Updated(id)
            | ReconcileOutcome::Merged(id)
            | ReconcileOutcome::Overwritten(id)
            | ReconcileOutcome::Skipped(id) => id,
        }
    }
}

/// How a bulk tag edit combines the input tags with each record's tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagEditMode {
    Replace,
    /// Case-insensitive union, existing tags first.
    Add,
    /// Case-sensitive removal.
    Remove,
}
