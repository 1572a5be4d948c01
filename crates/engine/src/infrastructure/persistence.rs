//! Persistence adapter over the host port.
//!
//! Isolates every host-specific probe so the state manager stays host
//! agnostic. Nothing here returns an error to the caller: resolution failures
//! become `None`, commit failures become `false`, and both are logged.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::infrastructure::ports::{ChatMetadata, DebouncedSavePort, HostError, HostPort};

/// Which save path a successful commit went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitPath {
    /// Host wrote the metadata before returning
    Immediate,
    /// Host scheduled a coalesced save
    HostDebounced,
    /// The debounced-save hint supplied at init was triggered
    InjectedDebounced,
}

/// Host storage resolution plus commit, with graceful degradation.
#[derive(Clone, Default)]
pub struct PersistenceAdapter {
    host: Option<Arc<dyn HostPort>>,
    debounced_hint: Option<Arc<dyn DebouncedSavePort>>,
}

impl PersistenceAdapter {
    pub fn new(
        host: Option<Arc<dyn HostPort>>,
        debounced_hint: Option<Arc<dyn DebouncedSavePort>>,
    ) -> Self {
        Self {
            host,
            debounced_hint,
        }
    }

    /// An adapter with no host: every resolution yields `None`.
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn is_attached(&self) -> bool {
        self.host.is_some()
    }

    /// The active conversation's metadata, or `None` when the host is missing,
    /// has no open conversation, or fails.
    pub fn resolve_host_storage(&self) -> Option<ChatMetadata> {
        let Some(host) = &self.host else {
            debug!("No host attached; running without persistence");
            return None;
        };

        match host.chat_metadata() {
            Ok(Some(metadata)) => Some(metadata),
            Ok(None) => {
                debug!("Host has no active conversation metadata");
                None
            }
            Err(error) => {
                warn!(error = %error, "Failed to resolve host storage");
                None
            }
        }
    }

    /// Persist pending metadata changes. Returns whether a save path was found
    /// and invoked successfully.
    pub async fn commit(&self) -> bool {
        match self.try_commit().await {
            Ok(path) => {
                debug!(?path, "Committed conversation metadata");
                true
            }
            Err(error) => {
                warn!(error = %error, "Conversation metadata not committed");
                false
            }
        }
    }

    async fn try_commit(&self) -> Result<CommitPath, HostError> {
        let host = self
            .host
            .as_ref()
            .ok_or_else(|| HostError::unavailable("no host attached"))?;

        let capabilities = host.save_capabilities();
        if capabilities.immediate {
            host.save_metadata().await?;
            return Ok(CommitPath::Immediate);
        }
        if capabilities.debounced {
            host.save_metadata_debounced()?;
            return Ok(CommitPath::HostDebounced);
        }
        if let Some(hint) = &self.debounced_hint {
            hint.request_save();
            return Ok(CommitPath::InjectedDebounced);
        }

        Err(HostError::Unsupported("saving metadata"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{MockDebouncedSavePort, MockHostPort, SaveCapabilities};
    use serde_json::json;

    fn adapter(host: MockHostPort) -> PersistenceAdapter {
        PersistenceAdapter::new(Some(Arc::new(host)), None)
    }

    #[test]
    fn detached_adapter_resolves_nothing() {
        let adapter = PersistenceAdapter::detached();
        assert!(!adapter.is_attached());
        assert!(adapter.resolve_host_storage().is_none());
    }

    #[tokio::test]
    async fn resolves_metadata_from_host() {
        let metadata = ChatMetadata::new();
        metadata.insert("k", json!(1)).await;
        let shared = metadata.clone();

        let mut host = MockHostPort::new();
        host.expect_chat_metadata()
            .returning(move || Ok(Some(shared.clone())));

        let resolved = adapter(host).resolve_host_storage().unwrap();
        assert!(resolved.same_conversation(&metadata));
    }

    #[test]
    fn host_errors_are_swallowed() {
        let mut host = MockHostPort::new();
        host.expect_chat_metadata()
            .returning(|| Err(HostError::unavailable("context accessor threw")));
        assert!(adapter(host).resolve_host_storage().is_none());
    }

    #[test]
    fn host_without_conversation_resolves_nothing() {
        let mut host = MockHostPort::new();
        host.expect_chat_metadata().returning(|| Ok(None));
        assert!(adapter(host).resolve_host_storage().is_none());
    }

    #[tokio::test]
    async fn commit_prefers_immediate_save() {
        let mut host = MockHostPort::new();
        host.expect_save_capabilities()
            .returning(|| SaveCapabilities::BOTH);
        host.expect_save_metadata().times(1).returning(|| Ok(()));
        host.expect_save_metadata_debounced().never();

        assert_eq!(adapter(host).try_commit().await.unwrap(), CommitPath::Immediate);
    }

    #[tokio::test]
    async fn commit_falls_back_to_host_debounced_save() {
        let mut host = MockHostPort::new();
        host.expect_save_capabilities()
            .returning(|| SaveCapabilities::DEBOUNCED);
        host.expect_save_metadata().never();
        host.expect_save_metadata_debounced()
            .times(1)
            .returning(|| Ok(()));

        assert!(adapter(host).commit().await);
    }

    #[tokio::test]
    async fn commit_falls_back_to_injected_hint() {
        let mut host = MockHostPort::new();
        host.expect_save_capabilities()
            .returning(|| SaveCapabilities::NONE);
        let mut hint = MockDebouncedSavePort::new();
        hint.expect_request_save().times(1).return_const(());

        let adapter = PersistenceAdapter::new(Some(Arc::new(host)), Some(Arc::new(hint)));
        assert_eq!(
            adapter.try_commit().await.unwrap(),
            CommitPath::InjectedDebounced
        );
    }

    #[tokio::test]
    async fn commit_without_save_capability_reports_false() {
        let mut host = MockHostPort::new();
        host.expect_save_capabilities()
            .returning(|| SaveCapabilities::NONE);
        assert!(!adapter(host).commit().await);
    }

    #[tokio::test]
    async fn failed_save_reports_false() {
        let mut host = MockHostPort::new();
        host.expect_save_capabilities()
            .returning(|| SaveCapabilities::IMMEDIATE);
        host.expect_save_metadata()
            .returning(|| Err(HostError::storage("save_metadata", "quota exceeded")));
        assert!(!adapter(host).commit().await);
    }

    #[tokio::test]
    async fn detached_commit_reports_false() {
        assert!(!PersistenceAdapter::detached().commit().await);
    }
}
