//! RpgTrack Engine library.
//!
//! Serialized character-state store persisted in a host's per-conversation
//! metadata.
//!
//! ## Structure
//!
//! - `infrastructure/` - Host ports, host adapters, write gate, persistence
//! - `stores/` - The state manager and its listener registry
//! - `app` - Composition used by the `rpgtrack` binary

pub mod app;
pub mod infrastructure;
pub mod stores;

pub use app::App;
pub use stores::{StateManager, Subscription};
