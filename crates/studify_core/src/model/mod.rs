//! Student domain model and its validation rules.
//!
//! # Responsibility
//! - Define the canonical student record shared by repository and service.
//! - Own the fixed rule set every record must satisfy.
//!
//! # Invariants
//! - Every student is identified by a stable, non-nil `StudentId`.
//! - A `Student` value handed out by constructors always passes validation.

pub mod student;
pub mod validator;
