//! Session Manager for SecretMarks.
//!
//! Turns a password into the session key. The PBKDF2 salt and iteration count are
//! stored unencrypted in `vault_meta` when the vault is first unlocked, together with a
//! verification token (a known plaintext encrypted under the key) so that a wrong
//! password is rejected up front instead of surfacing as an unreadable listing.

use rusqlite::{params, Connection, OptionalExtension};

use crate::services::crypto_service::{CryptoService, CryptoServiceTrait, SessionKey};
use crate::types::errors::{CryptoError, SessionError};

const META_SALT: &str = "kdf_salt";
const META_ITERATIONS: &str = "kdf_iterations";
const META_VERIFY: &str = "verify_token";
const VERIFY_PLAINTEXT: &str = "secretmarks-verify-v1";

/// Trait defining vault unlock operations.
pub trait SessionManagerTrait {
    /// True once a password has been set for this vault.
    fn is_initialized(&self) -> Result<bool, SessionError>;
    /// Derives the session key, creating salt and verification token on first use.
    /// `new_vault_iterations` only applies when the vault has no stored iteration count.
    fn authenticate(
        &self,
        password: &str,
        new_vault_iterations: u32,
    ) -> Result<SessionKey, SessionError>;
}

/// Session manager backed by the vault's `vault_meta` table.
pub struct SessionManager<'a> {
    conn: &'a Connection,
    crypto: CryptoService,
}

impl<'a> SessionManager<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self {
            conn,
            crypto: CryptoService::new(),
        }
    }

    fn read_meta(&self, key: &str) -> Result<Option<Vec<u8>>, SessionError> {
        Ok(self
            .conn
            .query_row(
                "SELECT value FROM vault_meta WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn write_meta(conn: &Connection, key: &str, value: &[u8]) -> Result<(), SessionError> {
        conn.execute(
            "INSERT OR REPLACE INTO vault_meta (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn stored_iterations(&self) -> Result<Option<u32>, SessionError> {
        match self.read_meta(META_ITERATIONS)? {
            None => Ok(None),
            Some(bytes) => {
                let raw: [u8; 4] = bytes.as_slice().try_into().map_err(|_| {
                    SessionError::DatabaseError("Corrupt kdf_iterations entry".to_string())
                })?;
                Ok(Some(u32::from_be_bytes(raw)))
            }
        }
    }

    fn create_vault(
        &self,
        password: &str,
        iterations: u32,
    ) -> Result<SessionKey, SessionError> {
        let salt = self.crypto.generate_salt()?;
        let key = self.crypto.derive_key(password, &salt, iterations)?;
        let token = self.crypto.encrypt_field(VERIFY_PLAINTEXT, &key)?;

        let tx = self.conn.unchecked_transaction()?;
        Self::write_meta(&tx, META_SALT, &salt)?;
        Self::write_meta(&tx, META_ITERATIONS, &iterations.to_be_bytes())?;
        Self::write_meta(&tx, META_VERIFY, token.as_bytes())?;
        tx.commit()?;

        tracing::info!(iterations, "initialized new vault");
        Ok(key)
    }
}

impl<'a> SessionManagerTrait for SessionManager<'a> {
    fn is_initialized(&self) -> Result<bool, SessionError> {
        Ok(self.read_meta(META_VERIFY)?.is_some())
    }

    fn authenticate(
        &self,
        password: &str,
        new_vault_iterations: u32,
    ) -> Result<SessionKey, SessionError> {
        if password.is_empty() {
            return Err(CryptoError::KeyDerivation("Password must not be empty".to_string()).into());
        }

        let (salt, token) = match (self.read_meta(META_SALT)?, self.read_meta(META_VERIFY)?) {
            (Some(salt), Some(token)) => (salt, token),
            _ => return self.create_vault(password, new_vault_iterations),
        };
        let iterations = self.stored_iterations()?.unwrap_or(new_vault_iterations);
        let key = self.crypto.derive_key(password, &salt, iterations)?;

        let token = String::from_utf8(token)
            .map_err(|_| SessionError::DatabaseError("Corrupt verify_token entry".to_string()))?;
        match self.crypto.decrypt_field(&token, &key) {
            Ok(plain) if plain == VERIFY_PLAINTEXT => {
                tracing::info!("vault unlocked");
                Ok(key)
            }
            _ => {
                tracing::warn!("vault unlock rejected");
                Err(SessionError::WrongPassword)
            }
        }
    }
}
