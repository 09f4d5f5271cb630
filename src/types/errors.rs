use thiserror::Error;

// === CryptoError ===

/// Errors related to cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Failed to derive encryption key from password.
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),
    /// Encryption operation failed.
    #[error("Encryption failed: {0}")]
    Encryption(String),
    /// Wrong key, tampered ciphertext, or a malformed token.
    #[error("Decryption failed: {0}")]
    Decryption(String),
    /// Failed to generate random bytes.
    #[error("Random generation failed: {0}")]
    RandomGeneration(String),
    /// The provided key is invalid.
    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

// === ValidationError ===

/// Rejections for manually entered URLs. Raised before anything reaches the store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The text could not be parsed as a URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// Only http and https are accepted.
    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
    /// The URL parsed but carries no host.
    #[error("URL has no host: {0}")]
    MissingHost(String),
}

// === BookmarkError ===

/// Errors related to bookmark store operations.
#[derive(Debug, Error)]
pub enum BookmarkError {
    /// Bookmark with the given ID was not found.
    #[error("Bookmark not found: {0}")]
    NotFound(i64),
    /// Another bookmark already owns this URL fingerprint.
    #[error("Duplicate bookmark fingerprint: {0}")]
    DuplicateFingerprint(String),
    /// The candidate's URL does not share a fingerprint with the given record.
    #[error("Candidate URL is not a duplicate of bookmark {0}")]
    NotADuplicate(i64),
    /// A stored field of the given record failed to decrypt.
    #[error("Bookmark {id} could not be decrypted: {source}")]
    Decryption {
        id: i64,
        #[source]
        source: CryptoError,
    },
    /// Database operation failed.
    #[error("Bookmark database error: {0}")]
    DatabaseError(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

impl From<rusqlite::Error> for BookmarkError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(ref failure, ref msg) = err {
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE {
                return BookmarkError::DuplicateFingerprint(
                    msg.clone().unwrap_or_else(|| failure.to_string()),
                );
            }
        }
        BookmarkError::DatabaseError(err.to_string())
    }
}

// === SessionError ===

/// Errors related to unlocking the vault.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The password does not open this vault.
    #[error("Wrong password")]
    WrongPassword,
    /// Database operation failed.
    #[error("Session database error: {0}")]
    DatabaseError(String),
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

impl From<rusqlite::Error> for SessionError {
    fn from(err: rusqlite::Error) -> Self {
        SessionError::DatabaseError(err.to_string())
    }
}

// === SettingsError ===

/// Errors related to configuration management.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// Failed to serialize or deserialize settings.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    /// The provided settings value is invalid.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}
