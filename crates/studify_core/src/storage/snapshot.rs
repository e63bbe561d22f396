//! Encrypted JSON snapshot file.
//!
//! # Responsibility
//! - Serialize the `{"students": [...]}` envelope and encrypt it.
//! - Write it with temp-file + fsync + rename so the rename is the only
//!   commit point.
//!
//! # Invariants
//! - The temp file lives in the target directory and is removed on any
//!   failure before the rename.
//! - A missing or zero-length snapshot file loads as an empty record set.
//!
//! # See also
//! - `crate::crypto` for the on-disk byte layout (`nonce || ciphertext+tag`).

use super::{StorageError, StorageResult, StudentPersister};
use crate::crypto::SnapshotCipher;
use crate::model::student::Student;
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

const TEMP_FILE_PREFIX: &str = ".students-";
const TEMP_FILE_SUFFIX: &str = ".tmp";

#[derive(Serialize)]
struct SnapshotOut<'a> {
    students: &'a [Student],
}

#[derive(Deserialize)]
struct SnapshotIn {
    #[serde(default)]
    students: Vec<Student>,
}

/// File-backed persister writing an encrypted JSON envelope.
pub struct EncryptedJsonPersister {
    path: PathBuf,
    cipher: Option<Arc<dyn SnapshotCipher>>,
}

impl EncryptedJsonPersister {
    /// Creates a persister for `path`.
    ///
    /// A `None` cipher is accepted here but every `save`/`load` then fails
    /// with `StorageError::InvalidCipher`.
    pub fn new(path: impl Into<PathBuf>, cipher: Option<Arc<dyn SnapshotCipher>>) -> Self {
        Self {
            path: path.into(),
            cipher,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn cipher(&self) -> StorageResult<&dyn SnapshotCipher> {
        self.cipher.as_deref().ok_or(StorageError::InvalidCipher)
    }

    fn target_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    fn write_snapshot(&self, students: &[Student]) -> StorageResult<usize> {
        let cipher = self.cipher()?;
        let payload = serde_json::to_vec(&SnapshotOut { students })?;
        let sealed = cipher.encrypt(&payload)?;

        let dir = self.target_dir();
        fs::create_dir_all(&dir).map_err(|source| StorageError::io("create_dir", &dir, source))?;

        // Dropping `tmp` (or the `TempPath` below) deletes the temp file, so
        // every early return leaves no garbage behind.
        let mut tmp = tempfile::Builder::new()
            .prefix(TEMP_FILE_PREFIX)
            .suffix(TEMP_FILE_SUFFIX)
            .tempfile_in(&dir)
            .map_err(|source| StorageError::io("create_temp", &dir, source))?;

        let tmp_file_path = tmp.path().to_path_buf();
        write_payload(tmp.as_file_mut(), &sealed, &tmp_file_path)?;
        tmp.as_file()
            .sync_all()
            .map_err(|source| StorageError::io("sync", &tmp_file_path, source))?;

        let tmp_path = tmp.into_temp_path();
        tmp_path
            .persist(&self.path)
            .map_err(|err| StorageError::io("rename", &self.path, err.error))?;

        Ok(sealed.len())
    }

    fn read_snapshot(&self) -> StorageResult<Vec<Student>> {
        let cipher = self.cipher()?;
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StorageError::io("read", &self.path, err)),
        };
        if data.is_empty() {
            return Ok(Vec::new());
        }

        let payload = cipher.decrypt(&data)?;
        let snapshot: SnapshotIn = serde_json::from_slice(&payload)?;
        Ok(snapshot.students)
    }
}

impl Debug for EncryptedJsonPersister {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedJsonPersister")
            .field("path", &self.path)
            .field("has_cipher", &self.cipher.is_some())
            .finish()
    }
}

impl StudentPersister for EncryptedJsonPersister {
    fn save(&self, students: &[Student]) -> StorageResult<()> {
        let started_at = Instant::now();
        match self.write_snapshot(students) {
            Ok(bytes) => {
                info!(
                    "event=snapshot_save module=storage status=ok count={} bytes={} duration_ms={}",
                    students.len(),
                    bytes,
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=snapshot_save module=storage status=error count={} duration_ms={} error={}",
                    students.len(),
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    fn load(&self) -> StorageResult<Vec<Student>> {
        let started_at = Instant::now();
        match self.read_snapshot() {
            Ok(students) => {
                info!(
                    "event=snapshot_load module=storage status=ok count={} duration_ms={}",
                    students.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(students)
            }
            Err(err) => {
                error!(
                    "event=snapshot_load module=storage status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}

/// Writes `payload` with a single `write` call and rejects short writes.
fn write_payload<W: Write>(writer: &mut W, payload: &[u8], path: &Path) -> StorageResult<()> {
    let written = writer
        .write(payload)
        .map_err(|source| StorageError::io("write", path, source))?;
    if written != payload.len() {
        return Err(StorageError::ShortWrite {
            expected: payload.len(),
            written,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{write_payload, EncryptedJsonPersister};
    use crate::crypto::{AesGcmCipher, SnapshotCipher};
    use crate::model::student::{Student, StudentDraft};
    use crate::model::validator::StudentValidator;
    use crate::storage::{StorageError, StudentPersister};
    use std::fs;
    use std::io::{self, Write};
    use std::path::Path;
    use std::sync::Arc;

    const TEST_KEY: &[u8] = b"abcdefghijklmnopqrstuvwxyz123456";

    struct HalfWriter(Vec<u8>);

    impl Write for HalfWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let half = buf.len() / 2;
            self.0.extend_from_slice(&buf[..half]);
            Ok(half)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn cipher() -> Arc<dyn SnapshotCipher> {
        Arc::new(AesGcmCipher::new(TEST_KEY).unwrap())
    }

    fn student(name: &str, grades: Vec<i32>) -> Student {
        Student::new(
            StudentDraft {
                name: name.to_string(),
                surname: "Tester".to_string(),
                age: 20,
                grades,
            },
            &StudentValidator::new(),
        )
        .unwrap()
    }

    fn temp_files_in(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".tmp"))
            .collect()
    }

    #[test]
    fn short_write_is_reported() {
        let mut writer = HalfWriter(Vec::new());
        let err = write_payload(&mut writer, b"0123456789", Path::new("x.tmp")).unwrap_err();
        assert!(matches!(
            err,
            StorageError::ShortWrite {
                expected: 10,
                written: 5
            }
        ));
    }

    #[test]
    fn save_then_load_roundtrips_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("students.json");
        let persister = EncryptedJsonPersister::new(&path, Some(cipher()));
        let students = vec![student("Ann", vec![1, 2]), student("Bob", Vec::new())];

        persister.save(&students).unwrap();
        assert_eq!(persister.load().unwrap(), students);
        assert!(temp_files_in(dir.path()).is_empty());
    }

    #[test]
    fn saved_file_is_not_plaintext() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("students.json");
        let persister = EncryptedJsonPersister::new(&path, Some(cipher()));

        persister.save(&[student("Plainname", vec![99])]).unwrap();
        let raw = fs::read(&path).unwrap();
        let needle = b"Plainname";
        assert!(!raw.windows(needle.len()).any(|window| window == needle));
    }

    #[test]
    fn save_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("students.json");
        let persister = EncryptedJsonPersister::new(&path, Some(cipher()));

        persister.save(&[]).unwrap();
        assert!(path.is_file());
        assert!(persister.load().unwrap().is_empty());
    }

    #[test]
    fn load_missing_or_empty_file_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("students.json");
        let persister = EncryptedJsonPersister::new(&path, Some(cipher()));
        assert!(persister.load().unwrap().is_empty());

        fs::write(&path, b"").unwrap();
        assert!(persister.load().unwrap().is_empty());
    }

    #[test]
    fn missing_cipher_fails_both_directions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("students.json");
        let persister = EncryptedJsonPersister::new(&path, None);

        assert!(matches!(
            persister.save(&[student("Ann", Vec::new())]),
            Err(StorageError::InvalidCipher)
        ));
        assert!(!path.exists());
        assert!(matches!(persister.load(), Err(StorageError::InvalidCipher)));
    }

    #[test]
    fn load_with_wrong_key_is_crypto_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("students.json");
        EncryptedJsonPersister::new(&path, Some(cipher()))
            .save(&[student("Ann", vec![5])])
            .unwrap();

        let other: Arc<dyn SnapshotCipher> =
            Arc::new(AesGcmCipher::new(b"12345678910111213141516171819201").unwrap());
        let err = EncryptedJsonPersister::new(&path, Some(other))
            .load()
            .unwrap_err();
        assert!(matches!(err, StorageError::Crypto(_)));
    }

    #[test]
    fn load_reports_json_error_for_garbage_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("students.json");
        let cipher = cipher();
        fs::write(&path, cipher.encrypt(b"{not json").unwrap()).unwrap();

        let err = EncryptedJsonPersister::new(&path, Some(cipher))
            .load()
            .unwrap_err();
        assert!(matches!(err, StorageError::Json(_)));
    }

    #[test]
    fn failed_rename_removes_temp_file_and_keeps_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("students.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), b"x").unwrap();

        let err = EncryptedJsonPersister::new(&path, Some(cipher()))
            .save(&[student("Ann", Vec::new())])
            .unwrap_err();
        assert!(matches!(err, StorageError::Io { stage: "rename", .. }));
        assert!(temp_files_in(dir.path()).is_empty());
        assert!(path.join("keep").is_file());
    }

    #[test]
    fn envelope_uses_students_field_and_defaults_grades() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("students.json");
        let cipher = cipher();
        let plaintext = serde_json::json!({
            "students": [{
                "id": "11111111-2222-4333-8444-555555555555",
                "name": "Ann",
                "surname": "Lee",
                "age": 30
            }]
        });
        fs::write(
            &path,
            cipher
                .encrypt(&serde_json::to_vec(&plaintext).unwrap())
                .unwrap(),
        )
        .unwrap();

        let loaded = EncryptedJsonPersister::new(&path, Some(cipher))
            .load()
            .unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "Ann");
        assert!(loaded[0].grades.is_empty());
    }
}
