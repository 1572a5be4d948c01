//! In-memory host.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::infrastructure::ports::{ChatMetadata, HostError, HostPort, SaveCapabilities};

/// Host whose conversation metadata lives in memory.
///
/// Immediate saves copy the mapping into `last_saved`, so callers can check
/// what a durable host would have written.
#[derive(Debug)]
pub struct InMemoryHost {
    conversation: RwLock<Option<ChatMetadata>>,
    last_saved: RwLock<Option<Map<String, Value>>>,
    available: AtomicBool,
    capabilities: SaveCapabilities,
    save_delay: Duration,
    immediate_saves: AtomicUsize,
    debounced_saves: AtomicUsize,
}

impl Default for InMemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryHost {
    /// Available host with one open conversation and an immediate save.
    pub fn new() -> Self {
        Self {
            conversation: RwLock::new(Some(ChatMetadata::new())),
            last_saved: RwLock::new(None),
            available: AtomicBool::new(true),
            capabilities: SaveCapabilities::IMMEDIATE,
            save_delay: Duration::ZERO,
            immediate_saves: AtomicUsize::new(0),
            debounced_saves: AtomicUsize::new(0),
        }
    }

    /// Host whose context accessor fails until `set_available(true)`.
    pub fn unavailable() -> Self {
        let host = Self::new();
        host.set_available(false);
        host
    }

    pub fn with_capabilities(mut self, capabilities: SaveCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Make every immediate save take at least `delay`.
    pub fn with_save_delay(mut self, delay: Duration) -> Self {
        self.save_delay = delay;
        self
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// The open conversation's metadata, if any.
    pub fn metadata(&self) -> Option<ChatMetadata> {
        self.conversation
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Open `metadata` as the active conversation.
    pub fn switch_conversation(&self, metadata: ChatMetadata) {
        *self
            .conversation
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(metadata);
    }

    pub fn close_conversation(&self) {
        *self
            .conversation
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn immediate_saves(&self) -> usize {
        self.immediate_saves.load(Ordering::SeqCst)
    }

    pub fn debounced_saves(&self) -> usize {
        self.debounced_saves.load(Ordering::SeqCst)
    }

    /// Mapping as of the most recent immediate save.
    pub fn last_saved(&self) -> Option<Map<String, Value>> {
        self.last_saved
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl HostPort for InMemoryHost {
    fn chat_metadata(&self) -> Result<Option<ChatMetadata>, HostError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(HostError::unavailable("host context is not ready"));
        }
        Ok(self.metadata())
    }

    fn save_capabilities(&self) -> SaveCapabilities {
        self.capabilities
    }

    async fn save_metadata(&self) -> Result<(), HostError> {
        if !self.capabilities.immediate {
            return Err(HostError::Unsupported("immediate save"));
        }
        if !self.save_delay.is_zero() {
            tokio::time::sleep(self.save_delay).await;
        }

        let Some(metadata) = self.metadata() else {
            return Err(HostError::storage(
                "save_metadata",
                "no conversation is open",
            ));
        };
        let snapshot = metadata.snapshot().await;
        *self
            .last_saved
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(snapshot);
        self.immediate_saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn save_metadata_debounced(&self) -> Result<(), HostError> {
        if !self.capabilities.debounced {
            return Err(HostError::Unsupported("debounced save"));
        }
        self.debounced_saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
