//! Error types for port operations.

/// Host integration errors with context for debugging.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The host exposes no usable context (running outside the host, or the
    /// host API changed shape).
    #[error("Host context unavailable: {0}")]
    Unavailable(String),

    /// The host does not offer the requested capability.
    #[error("Host does not support {0}")]
    Unsupported(&'static str),

    /// Writing metadata to durable storage failed - includes operation name for tracing.
    #[error("Storage error in {operation}: {message}")]
    Storage {
        operation: &'static str,
        message: String,
    },

    /// Serialization/deserialization of stored metadata failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl HostError {
    /// Create an Unavailable error.
    pub fn unavailable(message: impl ToString) -> Self {
        Self::Unavailable(message.to_string())
    }

    /// Create a Storage error with operation context.
    pub fn storage(operation: &'static str, message: impl ToString) -> Self {
        Self::Storage {
            operation,
            message: message.to_string(),
        }
    }

    /// Create a Serialization error.
    pub fn serialization(message: impl ToString) -> Self {
        Self::Serialization(message.to_string())
    }
}
