use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use ring::aead::{self, Aad, BoundKey, Nonce, NonceSequence, UnboundKey, AES_256_GCM};
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use std::fmt;
use std::num::NonZeroU32;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::types::credential::EncryptedData;
use crate::types::errors::CryptoError;

/// Salt length in bytes for PBKDF2.
pub const SALT_LENGTH: usize = 16;

/// AES-256-GCM key length in bytes.
pub const KEY_LENGTH: usize = 32;

/// AES-256-GCM nonce/IV length in bytes.
const NONCE_LENGTH: usize = 12;

/// AES-256-GCM authentication tag length in bytes.
const TAG_LENGTH: usize = 16;

/// Key material for one unlocked session. Wiped from memory on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SessionKey {
    bytes: [u8; KEY_LENGTH],
}

impl SessionKey {
    /// Wraps raw key bytes; anything but exactly 32 bytes is rejected.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let bytes: [u8; KEY_LENGTH] = bytes.try_into().map_err(|_| {
            CryptoError::InvalidKey(format!(
                "Key must be {} bytes, got {}",
                KEY_LENGTH,
                bytes.len()
            ))
        })?;
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionKey(<redacted>)")
    }
}

/// Trait defining cryptographic operations for the vault.
pub trait CryptoServiceTrait {
    /// Derives a session key from a password and salt using PBKDF2-HMAC-SHA256.
    fn derive_key(
        &self,
        password: &str,
        salt: &[u8],
        iterations: u32,
    ) -> Result<SessionKey, CryptoError>;

    /// Encrypts plaintext using AES-256-GCM, returning ciphertext, IV, and auth tag.
    fn encrypt_aes256gcm(
        &self,
        plaintext: &[u8],
        key: &SessionKey,
    ) -> Result<EncryptedData, CryptoError>;

    /// Decrypts data encrypted with AES-256-GCM.
    fn decrypt_aes256gcm(
        &self,
        encrypted: &EncryptedData,
        key: &SessionKey,
    ) -> Result<Vec<u8>, CryptoError>;

    /// Encrypts one text field into the base64 token stored in a column.
    fn encrypt_field(&self, value: &str, key: &SessionKey) -> Result<String, CryptoError>;

    /// Reverses [`CryptoServiceTrait::encrypt_field`].
    fn decrypt_field(&self, token: &str, key: &SessionKey) -> Result<String, CryptoError>;

    /// Generates a cryptographically secure random salt.
    fn generate_salt(&self) -> Result<Vec<u8>, CryptoError>;

    /// Generates cryptographically secure random bytes of the specified length.
    fn generate_random_bytes(&self, length: usize) -> Result<Vec<u8>, CryptoError>;
}

/// A nonce sequence that uses a single nonce value.
/// Used for one-shot encryption/decryption operations.
struct SingleNonce {
    nonce: Option<[u8; NONCE_LENGTH]>,
}

impl SingleNonce {
    fn new(nonce_bytes: [u8; NONCE_LENGTH]) -> Self {
        Self {
            nonce: Some(nonce_bytes),
        }
    }
}

impl NonceSequence for SingleNonce {
    fn advance(&mut self) -> Result<Nonce, ring::error::Unspecified> {
        self.nonce
            .take()
            .map(Nonce::assume_unique_for_key)
            .ok_or(ring::error::Unspecified)
    }
}

/// Implementation of cryptographic services using the `ring` crate.
pub struct CryptoService {
    rng: SystemRandom,
}

impl CryptoService {
    /// Creates a new CryptoService instance.
    pub fn new() -> Self {
        Self {
            rng: SystemRandom::new(),
        }
    }
}

impl Default for CryptoService {
    fn default() -> Self {
        Self::new()
    }
}

impl CryptoServiceTrait for CryptoService {
    fn derive_key(
        &self,
        password: &str,
        salt: &[u8],
        iterations: u32,
    ) -> Result<SessionKey, CryptoError> {
        let iterations = NonZeroU32::new(iterations)
            .ok_or_else(|| CryptoError::KeyDerivation("Invalid iteration count".to_string()))?;
        if salt.is_empty() {
            return Err(CryptoError::KeyDerivation("Salt must not be empty".to_string()));
        }

        let mut key = [0u8; KEY_LENGTH];
        pbkdf2::derive(
            pbkdf2::PBKDF2_HMAC_SHA256,
            iterations,
            salt,
            password.as_bytes(),
            &mut key,
        );

        let session_key = SessionKey::from_slice(&key);
        key.zeroize();
        session_key
    }

    fn encrypt_aes256gcm(
        &self,
        plaintext: &[u8],
        key: &SessionKey,
    ) -> Result<EncryptedData, CryptoError> {
        let mut nonce_bytes = [0u8; NONCE_LENGTH];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| CryptoError::RandomGeneration("Failed to generate nonce".to_string()))?;

        let unbound_key = UnboundKey::new(&AES_256_GCM, key.as_bytes())
            .map_err(|_| CryptoError::Encryption("Failed to create encryption key".to_string()))?;

        let nonce_sequence = SingleNonce::new(nonce_bytes);
        let mut sealing_key = aead::SealingKey::new(unbound_key, nonce_sequence);

        let mut in_out = plaintext.to_vec();
        sealing_key
            .seal_in_place_append_tag(Aad::empty(), &mut in_out)
            .map_err(|_| CryptoError::Encryption("Encryption operation failed".to_string()))?;

        // ring appends the tag; the last TAG_LENGTH bytes are split off.
        let tag_start = in_out.len() - TAG_LENGTH;
        let auth_tag = in_out[tag_start..].to_vec();
        in_out.truncate(tag_start);

        Ok(EncryptedData {
            ciphertext: in_out,
            iv: nonce_bytes.to_vec(),
            auth_tag,
        })
    }

    fn decrypt_aes256gcm(
        &self,
        encrypted: &EncryptedData,
        key: &SessionKey,
    ) -> Result<Vec<u8>, CryptoError> {
        let nonce_bytes: [u8; NONCE_LENGTH] =
            encrypted.iv.as_slice().try_into().map_err(|_| {
                CryptoError::Decryption(format!(
                    "IV must be {} bytes, got {}",
                    NONCE_LENGTH,
                    encrypted.iv.len()
                ))
            })?;

        if encrypted.auth_tag.len() != TAG_LENGTH {
            return Err(CryptoError::Decryption(format!(
                "Auth tag must be {} bytes, got {}",
                TAG_LENGTH,
                encrypted.auth_tag.len()
            )));
        }

        let unbound_key = UnboundKey::new(&AES_256_GCM, key.as_bytes())
            .map_err(|_| CryptoError::Decryption("Failed to create decryption key".to_string()))?;

        let nonce_sequence = SingleNonce::new(nonce_bytes);
        let mut opening_key = aead::OpeningKey::new(unbound_key, nonce_sequence);

        let mut in_out = Vec::with_capacity(encrypted.ciphertext.len() + TAG_LENGTH);
        in_out.extend_from_slice(&encrypted.ciphertext);
        in_out.extend_from_slice(&encrypted.auth_tag);

        let plaintext = opening_key
            .open_in_place(Aad::empty(), &mut in_out)
            .map_err(|_| {
                CryptoError::Decryption(
                    "Decryption failed: invalid key or corrupted data".to_string(),
                )
            })?;

        Ok(plaintext.to_vec())
    }

    fn encrypt_field(&self, value: &str, key: &SessionKey) -> Result<String, CryptoError> {
        let encrypted = self.encrypt_aes256gcm(value.as_bytes(), key)?;
        Ok(URL_SAFE.encode(encrypted.to_bytes()))
    }

    fn decrypt_field(&self, token: &str, key: &SessionKey) -> Result<String, CryptoError> {
        let raw = URL_SAFE
            .decode(token.as_bytes())
            .map_err(|e| CryptoError::Decryption(format!("Malformed field token: {}", e)))?;
        let encrypted = EncryptedData::from_bytes(&raw, NONCE_LENGTH, TAG_LENGTH)
            .ok_or_else(|| CryptoError::Decryption("Field token too short".to_string()))?;
        let plaintext = self.decrypt_aes256gcm(&encrypted, key)?;
        String::from_utf8(plaintext)
            .map_err(|_| CryptoError::Decryption("Field is not valid UTF-8".to_string()))
    }

    fn generate_salt(&self) -> Result<Vec<u8>, CryptoError> {
        self.generate_random_bytes(SALT_LENGTH)
    }

    fn generate_random_bytes(&self, length: usize) -> Result<Vec<u8>, CryptoError> {
        let mut bytes = vec![0u8; length];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| CryptoError::RandomGeneration("Failed to generate random bytes".to_string()))?;
        Ok(bytes)
    }
}
