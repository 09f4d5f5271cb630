// SecretMarks state managers
// Managers own a database connection: the record store, reconciliation, and vault unlock.

pub mod bookmark_manager;
pub mod reconciliation;
pub mod session_manager;
