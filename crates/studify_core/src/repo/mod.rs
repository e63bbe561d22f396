//! Repository layer abstractions and the in-memory implementation.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for students.
//! - Keep locking, snapshot persistence and rollback inside the repository.
//!
//! # Invariants
//! - Repository writes must pass `StudentValidator::student` before the map
//!   is touched.
//! - Repository APIs return semantic errors (`NotFound`, `AlreadyExists`,
//!   `InvalidId`) in addition to persistence errors.
//! - A failed mutation leaves the in-memory state exactly as it was.

pub mod student_repo;
