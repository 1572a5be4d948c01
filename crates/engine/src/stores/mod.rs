//! In-memory state stores.
//!
//! - `StateManager` - serialized access to the character document
//! - `SubscriberRegistry` - change listeners notified after each write

pub mod state_manager;
pub mod subscribers;

pub use state_manager::{StateError, StateManager, DEFAULT_STORAGE_KEY};
pub use subscribers::{ListenerError, SubscriberRegistry, Subscription};
