//! Student repository contract and lock-guarded in-memory implementation.
//!
//! # Responsibility
//! - Provide create/update/delete/get/list/add-grades over student records.
//! - Mirror every committed mutation into a full snapshot when a persister
//!   is configured.
//!
//! # Invariants
//! - The map is never exposed; reads return clones and writes store clones.
//! - Mutations hold the write lock across the synchronous `save` call, so
//!   memory and disk are never observably out of sync.
//! - On `save` failure the previous entry is restored before the error is
//!   returned.
//! - Records loaded at construction are re-validated; one bad record aborts
//!   construction.
//! - Entries keep their creation sequence: `list` and snapshots are in
//!   creation order, and full-name lookup returns the earliest match.

use crate::model::student::{Student, StudentId};
use crate::model::validator::{StudentValidationError, StudentValidator};
use crate::storage::{StorageError, StudentPersister};
use log::{info, warn};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for student persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(StudentValidationError),
    NotFound(StudentId),
    FullNameNotFound { name: String, surname: String },
    AlreadyExists(StudentId),
    /// The nil id was used where a real id is required.
    InvalidId,
    /// Snapshot save/load failed. `operation` names the repository call.
    Persist {
        operation: &'static str,
        source: StorageError,
    },
    /// A loaded snapshot contained a record that cannot be admitted.
    InvalidSnapshot(String),
    /// A writer panicked while holding the lock.
    LockPoisoned,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "invalid student: {err}"),
            Self::NotFound(id) => write!(f, "student not found: {id}"),
            Self::FullNameNotFound { name, surname } => {
                write!(f, "student not found: {name} {surname}")
            }
            Self::AlreadyExists(id) => write!(f, "student already exists: {id}"),
            Self::InvalidId => write!(f, "invalid student id"),
            Self::Persist { operation, source } => {
                write!(f, "persist student data after {operation} failed: {source}")
            }
            Self::InvalidSnapshot(message) => write!(f, "invalid student snapshot: {message}"),
            Self::LockPoisoned => write!(f, "student repository lock is poisoned"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Persist { source, .. } => Some(source),
            Self::NotFound(_)
            | Self::FullNameNotFound { .. }
            | Self::AlreadyExists(_)
            | Self::InvalidId
            | Self::InvalidSnapshot(_)
            | Self::LockPoisoned => None,
        }
    }
}

impl From<StudentValidationError> for RepoError {
    fn from(value: StudentValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Repository interface for student CRUD operations.
pub trait StudentRepository {
    fn create(&self, student: &Student) -> RepoResult<StudentId>;
    fn update(&self, student: &Student) -> RepoResult<()>;
    fn delete_by_id(&self, id: StudentId) -> RepoResult<()>;
    fn get_by_id(&self, id: StudentId) -> RepoResult<Student>;
    fn get_by_full_name(&self, name: &str, surname: &str) -> RepoResult<Student>;
    fn list(&self) -> RepoResult<Vec<Student>>;
    fn add_grades(&self, id: StudentId, grades: &[i32]) -> RepoResult<()>;
}

struct Slot {
    seq: u64,
    student: Student,
}

#[derive(Default)]
struct StudentTable {
    slots: HashMap<StudentId, Slot>,
    next_seq: u64,
}

impl StudentTable {
    fn insert_new(&mut self, student: Student) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.slots.insert(student.id, Slot { seq, student });
    }

    fn ordered(&self) -> Vec<&Slot> {
        let mut slots = self.slots.values().collect::<Vec<_>>();
        slots.sort_by_key(|slot| slot.seq);
        slots
    }

    fn snapshot(&self) -> Vec<Student> {
        self.ordered()
            .into_iter()
            .map(|slot| slot.student.clone())
            .collect()
    }
}

/// Lock-guarded in-memory student repository with optional snapshot
/// persistence.
pub struct InMemoryStudentRepository {
    table: RwLock<StudentTable>,
    persister: Option<Arc<dyn StudentPersister>>,
    validator: StudentValidator,
}

impl InMemoryStudentRepository {
    /// Creates an empty, memory-only repository.
    pub fn new(validator: StudentValidator) -> Self {
        Self {
            table: RwLock::new(StudentTable::default()),
            persister: None,
            validator,
        }
    }

    /// Creates a repository and rehydrates it from `persister`.
    ///
    /// # Errors
    /// - `Persist { operation: "load", .. }` when the snapshot cannot be
    ///   read, decrypted or parsed.
    /// - `InvalidSnapshot` when a loaded record has a nil or duplicate id or
    ///   fails validation.
    pub fn with_persister(
        validator: StudentValidator,
        persister: Arc<dyn StudentPersister>,
    ) -> RepoResult<Self> {
        let loaded = persister.load().map_err(|source| RepoError::Persist {
            operation: "load",
            source,
        })?;

        let mut table = StudentTable::default();
        for (index, student) in loaded.into_iter().enumerate() {
            if student.id.is_nil() {
                return Err(RepoError::InvalidSnapshot(format!(
                    "record #{index} has a nil id"
                )));
            }
            if let Err(err) = validator.student(&student) {
                return Err(RepoError::InvalidSnapshot(format!(
                    "record #{index} ({}) failed validation: {err}",
                    student.id
                )));
            }
            if table.slots.contains_key(&student.id) {
                return Err(RepoError::InvalidSnapshot(format!(
                    "record #{index} duplicates id {}",
                    student.id
                )));
            }
            table.insert_new(student);
        }

        info!(
            "event=repo_open module=repo status=ok count={}",
            table.slots.len()
        );

        Ok(Self {
            table: RwLock::new(table),
            persister: Some(persister),
            validator,
        })
    }

    /// Number of stored students.
    pub fn len(&self) -> RepoResult<usize> {
        Ok(self.read_table()?.slots.len())
    }

    pub fn is_empty(&self) -> RepoResult<bool> {
        Ok(self.read_table()?.slots.is_empty())
    }

    fn read_table(&self) -> RepoResult<RwLockReadGuard<'_, StudentTable>> {
        self.table.read().map_err(|_| RepoError::LockPoisoned)
    }

    fn write_table(&self) -> RepoResult<RwLockWriteGuard<'_, StudentTable>> {
        self.table.write().map_err(|_| RepoError::LockPoisoned)
    }

    /// Saves the full table or undoes the just-applied change.
    ///
    /// Must be called with the write lock held and the change already
    /// applied to `table`.
    fn commit(
        &self,
        table: &mut StudentTable,
        operation: &'static str,
        rollback: impl FnOnce(&mut StudentTable),
    ) -> RepoResult<()> {
        let Some(persister) = self.persister.as_ref() else {
            return Ok(());
        };

        if let Err(source) = persister.save(&table.snapshot()) {
            rollback(table);
            warn!(
                "event=student_{} module=repo status=rolled_back error={}",
                operation, source
            );
            return Err(RepoError::Persist { operation, source });
        }
        Ok(())
    }
}

impl StudentRepository for InMemoryStudentRepository {
    fn create(&self, student: &Student) -> RepoResult<StudentId> {
        let candidate = student.clone();
        self.validator.student(&candidate)?;
        let id = candidate.id;

        let mut table = self.write_table()?;
        if table.slots.contains_key(&id) {
            return Err(RepoError::AlreadyExists(id));
        }
        table.insert_new(candidate);

        self.commit(&mut table, "create", |table| {
            table.slots.remove(&id);
        })?;

        info!("event=student_create module=repo status=ok id={id}");
        Ok(id)
    }

    fn update(&self, student: &Student) -> RepoResult<()> {
        let candidate = student.clone();
        self.validator.student(&candidate)?;
        let id = candidate.id;

        let mut table = self.write_table()?;
        let previous = match table.slots.get_mut(&id) {
            Some(slot) => std::mem::replace(&mut slot.student, candidate),
            None => return Err(RepoError::NotFound(id)),
        };

        self.commit(&mut table, "update", |table| {
            if let Some(slot) = table.slots.get_mut(&id) {
                slot.student = previous;
            }
        })?;

        info!("event=student_update module=repo status=ok id={id}");
        Ok(())
    }

    fn delete_by_id(&self, id: StudentId) -> RepoResult<()> {
        if id.is_nil() {
            return Err(RepoError::InvalidId);
        }

        let mut table = self.write_table()?;
        let previous = table.slots.remove(&id).ok_or(RepoError::NotFound(id))?;

        self.commit(&mut table, "delete", |table| {
            table.slots.insert(id, previous);
        })?;

        info!("event=student_delete module=repo status=ok id={id}");
        Ok(())
    }

    fn get_by_id(&self, id: StudentId) -> RepoResult<Student> {
        if id.is_nil() {
            return Err(RepoError::InvalidId);
        }

        let table = self.read_table()?;
        table
            .slots
            .get(&id)
            .map(|slot| slot.student.clone())
            .ok_or(RepoError::NotFound(id))
    }

    fn get_by_full_name(&self, name: &str, surname: &str) -> RepoResult<Student> {
        self.validator.full_name(name, surname)?;

        let table = self.read_table()?;
        table
            .slots
            .values()
            .filter(|slot| slot.student.name == name && slot.student.surname == surname)
            .min_by_key(|slot| slot.seq)
            .map(|slot| slot.student.clone())
            .ok_or_else(|| RepoError::FullNameNotFound {
                name: name.to_string(),
                surname: surname.to_string(),
            })
    }

    fn list(&self) -> RepoResult<Vec<Student>> {
        Ok(self.read_table()?.snapshot())
    }

    fn add_grades(&self, id: StudentId, grades: &[i32]) -> RepoResult<()> {
        if id.is_nil() {
            return Err(RepoError::InvalidId);
        }
        self.validator.grades(grades)?;

        let mut table = self.write_table()?;
        let slot = table.slots.get_mut(&id).ok_or(RepoError::NotFound(id))?;
        let mut updated = slot.student.clone();
        updated.append_grades(grades, &self.validator)?;
        let previous = std::mem::replace(&mut slot.student, updated);

        self.commit(&mut table, "add_grades", |table| {
            if let Some(slot) = table.slots.get_mut(&id) {
                slot.student = previous;
            }
        })?;

        info!(
            "event=student_add_grades module=repo status=ok id={id} added={}",
            grades.len()
        );
        Ok(())
    }
}
