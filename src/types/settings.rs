use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::platform;

/// Default PBKDF2 rounds for newly created vaults.
pub const DEFAULT_KDF_ITERATIONS: u32 = 100_000;

/// Default datastore file name inside the data directory.
pub const DEFAULT_DATABASE_FILE: &str = "secret_bookmarks.db";

/// Vault configuration, persisted as JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VaultSettings {
    pub database_path: PathBuf,
    /// Only consulted when a vault is created; existing vaults keep their stored count.
    pub kdf_iterations: u32,
    /// `tracing_subscriber::EnvFilter` directive, overridden by `RUST_LOG`.
    pub log_filter: String,
}

impl Default for VaultSettings {
    fn default() -> Self {
        Self {
            database_path: platform::get_data_dir().join(DEFAULT_DATABASE_FILE),
            kdf_iterations: DEFAULT_KDF_ITERATIONS,
            log_filter: "info".to_string(),
        }
    }
}
