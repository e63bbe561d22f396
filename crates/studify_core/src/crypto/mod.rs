//! Authenticated encryption for snapshot payloads.
//!
//! # Responsibility
//! - Encrypt/decrypt opaque byte payloads with a 256-bit symmetric key.
//! - Produce self-describing ciphertext (`nonce || ciphertext+tag`).
//!
//! # Invariants
//! - Decryption either returns the exact plaintext or an error; never
//!   partial data.
//! - Encryption output is non-deterministic (fresh random nonce per call).

use std::error::Error;
use std::fmt::{Display, Formatter};

mod gcm;

pub use gcm::{AesGcmCipher, KEY_LEN, NONCE_LEN};

pub type CipherResult<T> = Result<T, CipherError>;

/// Cipher construction and payload errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CipherError {
    /// Key length differs from [`KEY_LEN`].
    InvalidKeyLength(usize),
    EncryptFailed,
    /// Payload too short, tag mismatch, wrong key or tampered bytes.
    CorruptedPayload,
}

impl Display for CipherError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKeyLength(actual) => write!(
                f,
                "invalid encryption key: expected {KEY_LEN} bytes, got {actual}"
            ),
            Self::EncryptFailed => write!(f, "encrypt failed"),
            Self::CorruptedPayload => write!(
                f,
                "ciphertext/auth tag is invalid or payload is corrupted"
            ),
        }
    }
}

impl Error for CipherError {}

/// Symmetric cipher used by snapshot persisters.
pub trait SnapshotCipher: Send + Sync {
    fn encrypt(&self, plaintext: &[u8]) -> CipherResult<Vec<u8>>;
    fn decrypt(&self, ciphertext: &[u8]) -> CipherResult<Vec<u8>>;
}
