//! Fixed validation rule set for student records and request inputs.
//!
//! # Responsibility
//! - Check name capitalization, age range, grade range and id syntax.
//! - Report the first violated rule as a typed error.
//!
//! # Invariants
//! - The rule set is fixed at construction; there are no setters.
//! - Validation never mutates its input.

use crate::model::student::{Student, StudentId};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::ops::RangeInclusive;
use uuid::Uuid;

/// Inclusive age bounds accepted for a student.
pub const AGE_RANGE: RangeInclusive<i32> = 0..=150;
/// Inclusive bounds accepted for one grade.
pub const GRADE_RANGE: RangeInclusive<i32> = 0..=100;

static STUDENT_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("valid student id regex")
});

static CAPITALIZED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\p{Lu}").expect("valid capitalized regex"));

/// Validation failure for a student record or one of its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentValidationError {
    /// Required string field is empty.
    EmptyField(&'static str),
    /// First character of the field is not an uppercase letter.
    NotCapitalized(&'static str),
    AgeOutOfRange {
        value: i32,
    },
    /// `index` is the position inside the candidate grade list.
    GradeOutOfRange {
        index: usize,
        value: i32,
    },
    /// A request that must carry grades carried none.
    EmptyGrades,
    NilId,
    MalformedId(String),
    /// Well-formed, but not a random (version 4) UUID.
    NotVersion4(String),
}

impl Display for StudentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "{field} is required"),
            Self::NotCapitalized(field) => {
                write!(f, "{field} must start with an uppercase letter")
            }
            Self::AgeOutOfRange { value } => write!(
                f,
                "age {value} is out of range {}..={}",
                AGE_RANGE.start(),
                AGE_RANGE.end()
            ),
            Self::GradeOutOfRange { index, value } => write!(
                f,
                "grade #{index} ({value}) is out of range {}..={}",
                GRADE_RANGE.start(),
                GRADE_RANGE.end()
            ),
            Self::EmptyGrades => write!(f, "at least one grade is required"),
            Self::NilId => write!(f, "student id must not be nil"),
            Self::MalformedId(value) => write!(f, "malformed student id `{value}`"),
            Self::NotVersion4(value) => write!(f, "student id `{value}` is not a v4 uuid"),
        }
    }
}

impl Error for StudentValidationError {}

/// Validation component injected into repository and service layers.
///
/// Construct once per process and share by reference or clone.
#[derive(Debug, Clone, Default)]
pub struct StudentValidator {
    _private: (),
}

impl StudentValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks that `value` is non-empty and starts with an uppercase letter.
    ///
    /// The first Unicode scalar value must be in category `Lu`, so `Ёж` and
    /// `Éric` pass while `élise`, `1st`, `Ⓐnna` and `Ⅳan` do not.
    pub fn capitalized(
        &self,
        field: &'static str,
        value: &str,
    ) -> Result<(), StudentValidationError> {
        if value.is_empty() {
            return Err(StudentValidationError::EmptyField(field));
        }
        if !CAPITALIZED_RE.is_match(value) {
            return Err(StudentValidationError::NotCapitalized(field));
        }
        Ok(())
    }

    pub fn age(&self, value: i32) -> Result<(), StudentValidationError> {
        if AGE_RANGE.contains(&value) {
            Ok(())
        } else {
            Err(StudentValidationError::AgeOutOfRange { value })
        }
    }

    /// Checks one grade; `index` is its position in the candidate list.
    pub fn grade(&self, index: usize, value: i32) -> Result<(), StudentValidationError> {
        if GRADE_RANGE.contains(&value) {
            Ok(())
        } else {
            Err(StudentValidationError::GradeOutOfRange { index, value })
        }
    }

    pub fn grades(&self, values: &[i32]) -> Result<(), StudentValidationError> {
        values
            .iter()
            .enumerate()
            .try_for_each(|(index, value)| self.grade(index, *value))
    }

    /// Same as [`Self::grades`], but an empty list is rejected too.
    pub fn non_empty_grades(&self, values: &[i32]) -> Result<(), StudentValidationError> {
        if values.is_empty() {
            return Err(StudentValidationError::EmptyGrades);
        }
        self.grades(values)
    }

    /// Validates every field of a full record, including its identifier.
    pub fn student(&self, student: &Student) -> Result<(), StudentValidationError> {
        if student.id.is_nil() {
            return Err(StudentValidationError::NilId);
        }
        self.full_name(&student.name, &student.surname)?;
        self.age(student.age)?;
        self.grades(&student.grades)
    }

    /// Validates a name/surname pair used as a lookup key.
    pub fn full_name(&self, name: &str, surname: &str) -> Result<(), StudentValidationError> {
        self.capitalized("name", name)?;
        self.capitalized("surname", surname)
    }

    /// Parses a hyphenated UUID string after checking its syntax.
    ///
    /// The nil UUID is syntactically valid and is returned as-is; rejecting
    /// it is the repository's job (`InvalidId`).
    pub fn parse_id(&self, value: &str) -> Result<StudentId, StudentValidationError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(StudentValidationError::EmptyField("id"));
        }
        if !STUDENT_ID_RE.is_match(trimmed) {
            return Err(StudentValidationError::MalformedId(trimmed.to_string()));
        }
        Uuid::parse_str(trimmed)
            .map_err(|_| StudentValidationError::MalformedId(trimmed.to_string()))
    }

    /// Same as [`Self::parse_id`], but a non-nil id must also be version 4.
    ///
    /// Used where the id names an existing record (update, add-grades).
    pub fn parse_v4_id(&self, value: &str) -> Result<StudentId, StudentValidationError> {
        let id = self.parse_id(value)?;
        if !id.is_nil() && id.get_version_num() != 4 {
            return Err(StudentValidationError::NotVersion4(id.to_string()));
        }
        Ok(id)
    }
}
