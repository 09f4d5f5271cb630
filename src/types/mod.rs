// SecretMarks shared type definitions

pub mod bookmark;
pub mod credential;
pub mod errors;
pub mod query;
pub mod reconcile;
pub mod settings;
