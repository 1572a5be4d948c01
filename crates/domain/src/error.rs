//! Unified error types for the domain layer
//!
//! Document decoding and schema problems surface here so the engine can log
//! them with context instead of passing `serde_json` errors around.

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone)]
pub enum DomainError {
    /// A stored document (or one of its sections) did not match the schema
    #[error("Invalid document section `{section}`: {message}")]
    InvalidSection { section: String, message: String },

    /// The document root was not a JSON object
    #[error("Document root must be an object, found {0}")]
    NotAnObject(&'static str),

    /// Serialization of a typed value failed
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl DomainError {
    /// Create an invalid section error
    pub fn invalid_section(section: impl Into<String>, message: impl ToString) -> Self {
        Self::InvalidSection {
            section: section.into(),
            message: message.to_string(),
        }
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
