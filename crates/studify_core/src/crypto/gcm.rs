//! AES-256-GCM implementation of [`SnapshotCipher`].

use super::{CipherError, CipherResult, SnapshotCipher};
use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use std::fmt::{Debug, Formatter};

/// Required key length in bytes.
pub const KEY_LEN: usize = 32;
/// Nonce length prepended to every ciphertext.
pub const NONCE_LEN: usize = 12;

/// AES-256-GCM cipher bound to one key.
#[derive(Clone)]
pub struct AesGcmCipher {
    aead: Aes256Gcm,
}

impl AesGcmCipher {
    /// Creates a cipher from raw key bytes.
    ///
    /// # Errors
    /// - `InvalidKeyLength` unless `key` is exactly [`KEY_LEN`] bytes.
    pub fn new(key: &[u8]) -> CipherResult<Self> {
        if key.len() != KEY_LEN {
            return Err(CipherError::InvalidKeyLength(key.len()));
        }
        let aead = Aes256Gcm::new_from_slice(key)
            .map_err(|_| CipherError::InvalidKeyLength(key.len()))?;
        Ok(Self { aead })
    }
}

impl Debug for AesGcmCipher {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AesGcmCipher")
            .field("key", &"<redacted>")
            .finish()
    }
}

impl SnapshotCipher for AesGcmCipher {
    fn encrypt(&self, plaintext: &[u8]) -> CipherResult<Vec<u8>> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let sealed = self
            .aead
            .encrypt(&nonce, plaintext)
            .map_err(|_| CipherError::EncryptFailed)?;

        let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
        out.extend_from_slice(nonce.as_slice());
        out.extend_from_slice(&sealed);
        Ok(out)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> CipherResult<Vec<u8>> {
        if ciphertext.len() < NONCE_LEN {
            return Err(CipherError::CorruptedPayload);
        }
        let (nonce, sealed) = ciphertext.split_at(NONCE_LEN);
        self.aead
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| CipherError::CorruptedPayload)
    }
}
