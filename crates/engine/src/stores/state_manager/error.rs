//! State manager errors.
//!
//! Internal only: public operations map these to a `false` return plus a log.

use rpgtrack_domain::DomainError;

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Host storage unavailable")]
    HostUnavailable,

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}

impl From<serde_json::Error> for StateError {
    fn from(error: serde_json::Error) -> Self {
        Self::Domain(DomainError::from(error))
    }
}
