//! Core domain logic for Studify.
//! This crate is the single source of truth for student invariants and
//! snapshot persistence.

pub mod config;
pub mod crypto;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod storage;

pub use config::{ConfigError, StoreConfig};
pub use crypto::{AesGcmCipher, CipherError, SnapshotCipher};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::student::{Student, StudentDraft, StudentId};
pub use model::validator::{StudentValidationError, StudentValidator};
pub use repo::student_repo::{InMemoryStudentRepository, RepoError, RepoResult, StudentRepository};
pub use service::dto::{
    AddGradesRequest, AverageResponse, FullNameRequest, StudentCreateRequest, StudentIdRequest,
    StudentListItem, StudentResponse, StudentUpdateRequest,
};
pub use service::student_service::{ServiceError, ServiceResult, StudentService};
pub use storage::{EncryptedJsonPersister, StorageError, StorageResult, StudentPersister};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
