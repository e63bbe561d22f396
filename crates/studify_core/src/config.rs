//! Store configuration consumed by the core.
//!
//! # Responsibility
//! - Validate the snapshot path and cipher key before anything is opened.
//! - Name the environment variables front-ends read them from.
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `STUDIFY_DATA_PATH` | Encrypted snapshot file | `students_data.json` |
//! | `STUDIFY_CIPHER_KEY` | AES-256-GCM key, exactly 32 bytes | required |
//! | `STUDIFY_LOG_LEVEL` | `trace`..`error` | build-mode default |
//! | `STUDIFY_LOG_DIR` | Rolling log directory | logging disabled |

use crate::crypto::KEY_LEN;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::path::{Path, PathBuf};

pub const DATA_PATH_ENV: &str = "STUDIFY_DATA_PATH";
pub const CIPHER_KEY_ENV: &str = "STUDIFY_CIPHER_KEY";
pub const LOG_LEVEL_ENV: &str = "STUDIFY_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "STUDIFY_LOG_DIR";

pub const DEFAULT_DATA_PATH: &str = "students_data.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyDataPath,
    /// The path names a directory (`foo/`, `.`, `..`, or an existing
    /// directory) instead of a file.
    DataPathNotAFile(PathBuf),
    InvalidKeyLength(usize),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDataPath => write!(f, "data path is required"),
            Self::DataPathNotAFile(path) => {
                write!(f, "data path `{}` must name a file", path.display())
            }
            Self::InvalidKeyLength(actual) => write!(
                f,
                "cipher key must be exactly {KEY_LEN} bytes long, got {actual}"
            ),
        }
    }
}

impl Error for ConfigError {}

/// Validated snapshot location and encryption key.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreConfig {
    data_path: PathBuf,
    cipher_key: String,
}

impl StoreConfig {
    pub fn new(
        data_path: impl Into<PathBuf>,
        cipher_key: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let data_path = data_path.into();
        let cipher_key = cipher_key.into();

        let (blank, trailing_separator) = {
            let raw = data_path.as_os_str().to_string_lossy();
            (
                raw.trim().is_empty(),
                raw.ends_with('/') || raw.ends_with(std::path::MAIN_SEPARATOR),
            )
        };
        if blank {
            return Err(ConfigError::EmptyDataPath);
        }
        if trailing_separator || data_path.file_name().is_none() || data_path.is_dir() {
            return Err(ConfigError::DataPathNotAFile(data_path));
        }
        if cipher_key.len() != KEY_LEN {
            return Err(ConfigError::InvalidKeyLength(cipher_key.len()));
        }

        Ok(Self {
            data_path,
            cipher_key,
        })
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn cipher_key(&self) -> &[u8] {
        self.cipher_key.as_bytes()
    }
}

impl Debug for StoreConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("data_path", &self.data_path)
            .field("cipher_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, StoreConfig, DEFAULT_DATA_PATH};
    use std::path::PathBuf;

    const KEY: &str = "abcdefghijklmnopqrstuvwxyz123456";

    #[test]
    fn accepts_file_path_and_32_byte_key() {
        let config = StoreConfig::new(DEFAULT_DATA_PATH, KEY).unwrap();
        assert_eq!(config.data_path(), PathBuf::from("students_data.json"));
        assert_eq!(config.cipher_key().len(), 32);
    }

    #[test]
    fn rejects_empty_or_directory_paths() {
        assert_eq!(StoreConfig::new("", KEY), Err(ConfigError::EmptyDataPath));
        assert_eq!(StoreConfig::new("   ", KEY), Err(ConfigError::EmptyDataPath));
        assert!(matches!(
            StoreConfig::new("data/", KEY),
            Err(ConfigError::DataPathNotAFile(_))
        ));
        assert!(matches!(
            StoreConfig::new("..", KEY),
            Err(ConfigError::DataPathNotAFile(_))
        ));
    }

    #[test]
    fn rejects_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("data");
        std::fs::create_dir(&existing).unwrap();

        assert_eq!(
            StoreConfig::new(&existing, KEY),
            Err(ConfigError::DataPathNotAFile(existing.clone()))
        );
        assert!(StoreConfig::new(dir.path().join("data.json"), KEY).is_ok());
    }

    #[test]
    fn rejects_wrong_key_length() {
        assert_eq!(
            StoreConfig::new("s.json", "short"),
            Err(ConfigError::InvalidKeyLength(5))
        );
        assert_eq!(
            StoreConfig::new("s.json", format!("{KEY}7")),
            Err(ConfigError::InvalidKeyLength(33))
        );
    }

    #[test]
    fn debug_redacts_key() {
        let rendered = format!("{:?}", StoreConfig::new("s.json", KEY).unwrap());
        assert!(!rendered.contains(KEY));
        assert!(rendered.contains("<redacted>"));
    }
}
