//! SecretMarks: a password-gated bookmark vault.
//!
//! Every bookmark field is encrypted on its own with AES-256-GCM under a key derived
//! from the user's password. URLs are deduplicated through a SHA-256 fingerprint of
//! their normalized form, and collisions go through a merge / overwrite / skip step.

pub mod database;
pub mod logging;
pub mod managers;
pub mod platform;
pub mod services;
pub mod types;
