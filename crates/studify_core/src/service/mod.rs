//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into request/response level APIs.
//! - Keep front-ends decoupled from repository and storage details.

pub mod dto;
pub mod student_service;
