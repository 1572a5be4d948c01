//! Infrastructure implementations.
//!
//! Ports for the host boundary plus the adapters and primitives the state
//! store is built on.

pub mod debounce;
pub mod gate;
pub mod host;
pub mod persistence;
pub mod ports;
pub mod settings;
