use serde::{Deserialize, Serialize};

/// Encrypted data container used by CryptoService.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedData {
    pub ciphertext: Vec<u8>,
    pub iv: Vec<u8>,
    pub auth_tag: Vec<u8>,
}

impl EncryptedData {
    /// Concatenates `iv || ciphertext || auth_tag`, the layout stored in a field token.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out =
            Vec::with_capacity(self.iv.len() + self.ciphertext.len() + self.auth_tag.len());
        out.extend_from_slice(&self.iv);
        out.extend_from_slice(&self.ciphertext);
        out.extend_from_slice(&self.auth_tag);
        out
    }

    /// Splits a stored token back into its parts. Returns `None` when it is too short.
    pub fn from_bytes(bytes: &[u8], iv_len: usize, tag_len: usize) -> Option<Self> {
        if bytes.len() < iv_len + tag_len {
            return None;
        }
        let tag_start = bytes.len() - tag_len;
        Some(Self {
            iv: bytes[..iv_len].to_vec(),
            ciphertext: bytes[iv_len..tag_start].to_vec(),
            auth_tag: bytes[tag_start..].to_vec(),
        })
    }
}
