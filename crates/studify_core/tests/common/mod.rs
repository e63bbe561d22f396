#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use studify_core::{
    AesGcmCipher, EncryptedJsonPersister, SnapshotCipher, StorageError, StorageResult, Student,
    StudentDraft, StudentPersister, StudentValidator,
};

pub const TEST_KEY: &str = "abcdefghijklmnopqrstuvwxyz123456";

pub fn student(name: &str, surname: &str, age: i32, grades: &[i32]) -> Student {
    Student::new(
        StudentDraft {
            name: name.to_string(),
            surname: surname.to_string(),
            age,
            grades: grades.to_vec(),
        },
        &StudentValidator::new(),
    )
    .unwrap()
}

pub fn cipher() -> Arc<dyn SnapshotCipher> {
    Arc::new(AesGcmCipher::new(TEST_KEY.as_bytes()).unwrap())
}

pub fn file_persister(path: &Path) -> Arc<EncryptedJsonPersister> {
    Arc::new(EncryptedJsonPersister::new(path, Some(cipher())))
}

/// In-memory persister whose `save` can be switched to fail.
#[derive(Default)]
pub struct FlakyPersister {
    fail: AtomicBool,
    saves: AtomicUsize,
    stored: Mutex<Vec<Student>>,
}

impl FlakyPersister {
    pub fn seeded(students: Vec<Student>) -> Self {
        Self {
            stored: Mutex::new(students),
            ..Self::default()
        }
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn stored(&self) -> Vec<Student> {
        self.stored.lock().unwrap().clone()
    }
}

impl StudentPersister for FlakyPersister {
    fn save(&self, students: &[Student]) -> StorageResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StorageError::ShortWrite {
                expected: 1,
                written: 0,
            });
        }
        *self.stored.lock().unwrap() = students.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn load(&self) -> StorageResult<Vec<Student>> {
        Ok(self.stored())
    }
}
