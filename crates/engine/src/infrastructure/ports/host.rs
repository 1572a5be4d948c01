//! Host integration port traits.
//!
//! The host is the chat application embedding the tracker. It owns a mutable
//! metadata mapping scoped to the active conversation and may offer an
//! immediate save, a debounced save, both, or neither.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use super::error::HostError;

// =============================================================================
// Conversation Metadata
// =============================================================================

/// Shared handle to the active conversation's metadata mapping.
///
/// Clones point at the same mapping; the host persists whatever the mapping
/// holds when one of its save methods runs.
#[derive(Clone, Default)]
pub struct ChatMetadata {
    entries: Arc<RwLock<Map<String, Value>>>,
}

impl ChatMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(entries: Map<String, Value>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        self.entries.read().await.get(key).cloned()
    }

    /// Insert a value, returning the previous one.
    pub async fn insert(&self, key: &str, value: Value) -> Option<Value> {
        self.entries.write().await.insert(key.to_string(), value)
    }

    /// Return the stored value, storing `init()` first when the key is absent.
    /// The check and the insert happen under one write lock.
    pub async fn get_or_insert_with(&self, key: &str, init: impl FnOnce() -> Value) -> Value {
        self.entries
            .write()
            .await
            .entry(key.to_string())
            .or_insert_with(init)
            .clone()
    }

    /// Copy of the whole mapping (used when writing it out).
    pub async fn snapshot(&self) -> Map<String, Value> {
        self.entries.read().await.clone()
    }

    /// True when both handles point at the same mapping.
    pub fn same_conversation(&self, other: &ChatMetadata) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }
}

impl fmt::Debug for ChatMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatMetadata").finish_non_exhaustive()
    }
}

// =============================================================================
// Save Capabilities
// =============================================================================

/// Which save paths a host exposes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveCapabilities {
    pub immediate: bool,
    pub debounced: bool,
}

impl SaveCapabilities {
    pub const NONE: Self = Self {
        immediate: false,
        debounced: false,
    };

    pub const IMMEDIATE: Self = Self {
        immediate: true,
        debounced: false,
    };

    pub const DEBOUNCED: Self = Self {
        immediate: false,
        debounced: true,
    };

    pub const BOTH: Self = Self {
        immediate: true,
        debounced: true,
    };

    pub fn any(&self) -> bool {
        self.immediate || self.debounced
    }
}

// =============================================================================
// Host Ports
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HostPort: Send + Sync {
    /// Metadata for the active conversation; `Ok(None)` when no conversation
    /// is open.
    fn chat_metadata(&self) -> Result<Option<ChatMetadata>, HostError>;

    fn save_capabilities(&self) -> SaveCapabilities;

    /// Persist the metadata now.
    async fn save_metadata(&self) -> Result<(), HostError>;

    /// Schedule a coalesced save; returns once scheduled, not once written.
    fn save_metadata_debounced(&self) -> Result<(), HostError>;
}

/// Debounced save supplied separately from the host context at init time.
#[cfg_attr(test, mockall::automock)]
pub trait DebouncedSavePort: Send + Sync {
    fn request_save(&self);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn clones_share_the_mapping() {
        let metadata = ChatMetadata::new();
        let other = metadata.clone();
        metadata.insert("k", json!(1)).await;
        assert_eq!(other.get("k").await, Some(json!(1)));
        assert!(metadata.same_conversation(&other));
        assert!(!metadata.same_conversation(&ChatMetadata::new()));
    }

    #[tokio::test]
    async fn get_or_insert_with_only_initializes_once() {
        let metadata = ChatMetadata::new();
        let first = metadata.get_or_insert_with("k", || json!("a")).await;
        let second = metadata.get_or_insert_with("k", || json!("b")).await;
        assert_eq!(first, json!("a"));
        assert_eq!(second, json!("a"));
    }

    #[test]
    fn capability_sets() {
        assert!(!SaveCapabilities::NONE.any());
        assert!(SaveCapabilities::DEBOUNCED.any());
        assert_eq!(SaveCapabilities::default(), SaveCapabilities::NONE);
    }
}
