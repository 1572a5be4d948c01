//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Host storage (conversation metadata plus save paths)
//! - The optional debounced-save hint injected at init

mod error;
mod host;

pub use error::HostError;
pub use host::{ChatMetadata, DebouncedSavePort, HostPort, SaveCapabilities};

#[cfg(test)]
pub use host::{MockDebouncedSavePort, MockHostPort};
