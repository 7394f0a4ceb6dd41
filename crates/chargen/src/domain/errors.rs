//! Domain Errors
//!
//! Error types for domain operations.

use std::path::Path;

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("External service error: {0}")]
    ExternalService(String),
}

impl DomainError {
    pub fn not_found<T: AsRef<str>>(entity_type: T, id: &str) -> Self {
        Self::NotFound {
            entity_type: entity_type.as_ref().to_string(),
            id: id.to_string(),
        }
    }

    pub fn duplicate_id(id: &str) -> Self {
        Self::Conflict(format!("a character with id {} already exists", id))
    }

    /// Repository failure tied to a file on disk
    pub fn repository_at(path: &Path, message: impl std::fmt::Display) -> Self {
        Self::Repository(format!("{}: {}", path.display(), message))
    }
}
