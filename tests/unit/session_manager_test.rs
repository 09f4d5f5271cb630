//! Unit tests for vault unlock through `SessionManagerTrait`.

use secretmarks::database::Database;
use secretmarks::managers::session_manager::{SessionManager, SessionManagerTrait};
use secretmarks::services::crypto_service::{CryptoService, CryptoServiceTrait};
use secretmarks::types::errors::{CryptoError, SessionError};
use tempfile::TempDir;

const TEST_ITERATIONS: u32 = 1_000;

#[test]
fn test_first_unlock_creates_vault() {
    let db = Database::open_in_memory().unwrap();
    let session = SessionManager::new(db.connection());

    assert!(!session.is_initialized().unwrap());
    session.authenticate("correct horse", TEST_ITERATIONS).unwrap();
    assert!(session.is_initialized().unwrap());
}

#[test]
fn test_same_password_yields_same_key() {
    let db = Database::open_in_memory().unwrap();
    let session = SessionManager::new(db.connection());

    let first = session.authenticate("correct horse", TEST_ITERATIONS).unwrap();
    let second = session.authenticate("correct horse", TEST_ITERATIONS).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_wrong_password_rejected() {
    let db = Database::open_in_memory().unwrap();
    let session = SessionManager::new(db.connection());

    session.authenticate("correct horse", TEST_ITERATIONS).unwrap();
    assert!(matches!(
        session.authenticate("battery staple", TEST_ITERATIONS),
        Err(SessionError::WrongPassword)
    ));
}

#[test]
fn test_empty_password_rejected() {
    let db = Database::open_in_memory().unwrap();
    let session = SessionManager::new(db.connection());

    assert!(matches!(
        session.authenticate("", TEST_ITERATIONS),
        Err(SessionError::Crypto(CryptoError::KeyDerivation(_)))
    ));
    assert!(!session.is_initialized().unwrap());
}

/// The iteration count chosen at creation wins over later configuration.
#[test]
fn test_stored_iterations_survive_config_change() {
    let db = Database::open_in_memory().unwrap();
    let session = SessionManager::new(db.connection());

    let created = session.authenticate("pw", TEST_ITERATIONS).unwrap();
    let reopened = session.authenticate("pw", TEST_ITERATIONS * 2).unwrap();
    assert_eq!(created, reopened);
}

/// Data written under the derived key is readable after reopening the file.
#[test]
fn test_key_reproducible_across_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("vault.db");
    let crypto = CryptoService::new();

    let token = {
        let db = Database::open(&path).unwrap();
        let key = SessionManager::new(db.connection())
            .authenticate("pw", TEST_ITERATIONS)
            .unwrap();
        crypto.encrypt_field("payload", &key).unwrap()
    };

    let db = Database::open(&path).unwrap();
    let key = SessionManager::new(db.connection())
        .authenticate("pw", TEST_ITERATIONS)
        .unwrap();
    assert_eq!(crypto.decrypt_field(&token, &key).unwrap(), "payload");
}

/// Two vaults with the same password get different salts and therefore different keys.
#[test]
fn test_salt_is_per_vault() {
    let a = Database::open_in_memory().unwrap();
    let b = Database::open_in_memory().unwrap();
    let ka = SessionManager::new(a.connection())
        .authenticate("pw", TEST_ITERATIONS)
        .unwrap();
    let kb = SessionManager::new(b.connection())
        .authenticate("pw", TEST_ITERATIONS)
        .unwrap();
    assert_ne!(ka, kb);
}
