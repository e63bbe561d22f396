//! Snapshot persistence for the student repository.
//!
//! # Responsibility
//! - Define the persister contract used by the repository.
//! - Keep file layout, encryption and atomic-write details out of the
//!   repository.
//!
//! # Invariants
//! - A snapshot is always a full replacement of the stored record set.
//! - Readers never observe a partially written snapshot file.

use crate::crypto::CipherError;
use crate::model::student::Student;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

mod snapshot;

pub use snapshot::EncryptedJsonPersister;

pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by snapshot save/load.
#[derive(Debug)]
pub enum StorageError {
    /// No cipher configured; nothing is read or written in plaintext.
    InvalidCipher,
    /// Filesystem failure; `stage` names the failed step.
    Io {
        stage: &'static str,
        path: PathBuf,
        source: io::Error,
    },
    /// The OS accepted fewer bytes than the payload length.
    ShortWrite { expected: usize, written: usize },
    Crypto(CipherError),
    Json(serde_json::Error),
}

impl StorageError {
    pub(crate) fn io(stage: &'static str, path: &Path, source: io::Error) -> Self {
        Self::Io {
            stage,
            path: path.to_path_buf(),
            source,
        }
    }
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCipher => write!(f, "invalid cipher provided"),
            Self::Io {
                stage,
                path,
                source,
            } => write!(f, "snapshot {stage} failed for `{}`: {source}", path.display()),
            Self::ShortWrite { expected, written } => write!(
                f,
                "mismatch between payload length and write length: expected {expected}, wrote {written}"
            ),
            Self::Crypto(err) => write!(f, "snapshot crypto error: {err}"),
            Self::Json(err) => write!(f, "snapshot json error: {err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Crypto(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::InvalidCipher | Self::ShortWrite { .. } => None,
        }
    }
}

impl From<CipherError> for StorageError {
    fn from(value: CipherError) -> Self {
        Self::Crypto(value)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Full-snapshot persistence contract for student records.
pub trait StudentPersister: Send + Sync {
    /// Durably replaces the stored snapshot with `students`.
    fn save(&self, students: &[Student]) -> StorageResult<()>;
    /// Returns the stored records, or an empty list when nothing was saved yet.
    fn load(&self) -> StorageResult<Vec<Student>>;
}
