//! Student domain model.
//!
//! # Responsibility
//! - Define the canonical student record persisted in snapshots.
//! - Provide the single validated construction path.
//!
//! # Invariants
//! - `id` is stable and never reused for another student.
//! - `name`/`surname` start with an uppercase letter, `age` is in `0..=150`,
//!   every grade is in `0..=100`.
//! - `Clone` is a deep copy; two clones never share grade storage.

use crate::model::validator::{StudentValidationError, StudentValidator};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a student record.
pub type StudentId = Uuid;

/// Candidate field values for a new or replacement student.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentDraft {
    pub name: String,
    pub surname: String,
    pub age: i32,
    pub grades: Vec<i32>,
}

/// Canonical student record.
///
/// Fields stay public so callers can edit their own copies; every repository
/// write re-validates the record before it is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub surname: String,
    pub age: i32,
    /// Insertion order is significant. Missing in older snapshots means empty.
    #[serde(default)]
    pub grades: Vec<i32>,
}

impl Student {
    /// Builds a validated student with a freshly generated id.
    pub fn new(
        draft: StudentDraft,
        validator: &StudentValidator,
    ) -> Result<Self, StudentValidationError> {
        Self::with_id(Uuid::new_v4(), draft, validator)
    }

    /// Builds a validated student with a caller-provided id.
    ///
    /// Used by update paths where identity already exists. The nil id is
    /// rejected.
    pub fn with_id(
        id: StudentId,
        draft: StudentDraft,
        validator: &StudentValidator,
    ) -> Result<Self, StudentValidationError> {
        let student = Self {
            id,
            name: draft.name,
            surname: draft.surname,
            age: draft.age,
            grades: draft.grades,
        };
        validator.student(&student)?;
        Ok(student)
    }

    /// Appends grades all-or-nothing.
    ///
    /// When any candidate grade is out of range, `self` is left untouched.
    pub fn append_grades(
        &mut self,
        grades: &[i32],
        validator: &StudentValidator,
    ) -> Result<(), StudentValidationError> {
        validator.grades(grades)?;
        self.grades.extend_from_slice(grades);
        Ok(())
    }

    /// Arithmetic mean of the grades, `0.0` when there are none.
    pub fn average_grade(&self) -> f64 {
        if self.grades.is_empty() {
            return 0.0;
        }
        let sum: i64 = self.grades.iter().map(|grade| i64::from(*grade)).sum();
        sum as f64 / self.grades.len() as f64
    }
}
