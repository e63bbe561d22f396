//! Student use-case service.
//!
//! # Responsibility
//! - Map front-end requests to one repository call each.
//! - Return post-mutation state for create/update/add-grades.
//! - Compute grade averages.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Repository errors are re-shaped, never re-interpreted.

use crate::model::student::{Student, StudentDraft, StudentId};
use crate::model::validator::{StudentValidationError, StudentValidator};
use crate::repo::student_repo::{RepoError, StudentRepository};
use crate::service::dto::{
    AddGradesRequest, AverageResponse, FullNameRequest, StudentCreateRequest, StudentIdRequest,
    StudentListItem, StudentResponse, StudentUpdateRequest,
};
use crate::storage::StorageError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Response-shaped error returned to front-ends.
#[derive(Debug)]
pub enum ServiceError {
    Validation(StudentValidationError),
    /// Human-readable description of the missing target.
    NotFound(String),
    AlreadyExists(StudentId),
    InvalidId,
    Persist {
        operation: &'static str,
        source: StorageError,
    },
    /// Repository is unusable (poisoned lock, corrupt snapshot).
    Internal(String),
}

impl ServiceError {
    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::AlreadyExists(_) => "already_exists",
            Self::InvalidId => "invalid_id",
            Self::Persist { .. } => "persist",
            Self::Internal(_) => "internal",
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "validation failed: {err}"),
            Self::NotFound(target) => write!(f, "student not found: {target}"),
            Self::AlreadyExists(id) => write!(f, "student already exists: {id}"),
            Self::InvalidId => write!(f, "invalid student id"),
            Self::Persist { operation, source } => {
                write!(f, "failed to persist students after {operation}: {source}")
            }
            Self::Internal(message) => write!(f, "{message}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Persist { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<StudentValidationError> for ServiceError {
    fn from(value: StudentValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound(id) => Self::NotFound(id.to_string()),
            RepoError::FullNameNotFound { name, surname } => {
                Self::NotFound(format!("{name} {surname}"))
            }
            RepoError::AlreadyExists(id) => Self::AlreadyExists(id),
            RepoError::InvalidId => Self::InvalidId,
            RepoError::Persist { operation, source } => Self::Persist { operation, source },
            other @ (RepoError::InvalidSnapshot(_) | RepoError::LockPoisoned) => {
                Self::Internal(other.to_string())
            }
        }
    }
}

/// Use-case service wrapper for student operations.
pub struct StudentService<R: StudentRepository> {
    repo: R,
    validator: StudentValidator,
}

impl<R: StudentRepository> StudentService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R, validator: StudentValidator) -> Self {
        Self { repo, validator }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Registers a new student and returns the stored state.
    pub fn register(&self, request: StudentCreateRequest) -> ServiceResult<StudentResponse> {
        let student = Student::new(
            StudentDraft {
                name: request.name,
                surname: request.surname,
                age: request.age,
                grades: request.grades,
            },
            &self.validator,
        )?;
        let id = self.repo.create(&student)?;
        self.respond(id)
    }

    /// Replaces an existing student wholesale.
    pub fn update(&self, request: StudentUpdateRequest) -> ServiceResult<StudentResponse> {
        let id = self.validator.parse_v4_id(&request.id)?;
        let student = Student::with_id(
            id,
            StudentDraft {
                name: request.name,
                surname: request.surname,
                age: request.age,
                grades: request.grades,
            },
            &self.validator,
        )?;
        self.repo.update(&student)?;
        self.respond(id)
    }

    pub fn delete_by_id(&self, request: StudentIdRequest) -> ServiceResult<()> {
        let id = self.validator.parse_id(&request.id)?;
        self.repo.delete_by_id(id)?;
        Ok(())
    }

    pub fn get_by_id(&self, request: StudentIdRequest) -> ServiceResult<StudentResponse> {
        let id = self.validator.parse_id(&request.id)?;
        self.respond(id)
    }

    pub fn get_by_full_name(&self, request: FullNameRequest) -> ServiceResult<StudentResponse> {
        self.validator.full_name(&request.name, &request.surname)?;
        let student = self
            .repo
            .get_by_full_name(&request.name, &request.surname)?;
        Ok(StudentResponse::from(&student))
    }

    /// Lists all students; grades are included only on request.
    pub fn list(&self, include_grades: bool) -> ServiceResult<Vec<StudentListItem>> {
        let students = self.repo.list()?;
        Ok(students
            .iter()
            .map(|student| StudentListItem::from_student(student, include_grades))
            .collect())
    }

    /// Appends grades. An empty grade list is rejected before the repository
    /// is called.
    pub fn add_grades(&self, request: AddGradesRequest) -> ServiceResult<StudentResponse> {
        let id = self.validator.parse_v4_id(&request.id)?;
        self.validator.non_empty_grades(&request.grades)?;
        self.repo.add_grades(id, &request.grades)?;
        self.respond(id)
    }

    /// Mean grade of one student, `0.0` when the student has no grades.
    pub fn average_by_id(&self, request: StudentIdRequest) -> ServiceResult<AverageResponse> {
        let id = self.validator.parse_id(&request.id)?;
        let student = self.repo.get_by_id(id)?;
        Ok(AverageResponse {
            id: student.id.to_string(),
            average: student.average_grade(),
        })
    }

    fn respond(&self, id: StudentId) -> ServiceResult<StudentResponse> {
        let student = self.repo.get_by_id(id)?;
        Ok(StudentResponse::from(&student))
    }
}
