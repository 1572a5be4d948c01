//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::host::JsonFileHost;
use crate::infrastructure::ports::{HostError, HostPort};
use crate::infrastructure::settings::Settings;
use crate::stores::StateManager;

/// A state manager wired to a file-backed conversation.
pub struct App {
    pub state: Arc<StateManager>,
    pub host: Arc<JsonFileHost>,
    pub settings: Settings,
}

impl App {
    pub async fn open(settings: Settings) -> Result<Self, HostError> {
        let host = Arc::new(
            JsonFileHost::open(
                &settings.data_dir,
                &settings.conversation,
                settings.save_mode,
                settings.debounce(),
            )
            .await?,
        );

        let state = Arc::new(StateManager::new(settings.storage_key.clone()));
        state.init(Some(Arc::clone(&host) as Arc<dyn HostPort>), None);

        tracing::info!(
            conversation = %settings.conversation,
            path = %host.path().display(),
            save_mode = %settings.save_mode,
            "Tracker opened"
        );

        Ok(Self {
            state,
            host,
            settings,
        })
    }

    /// Write out any save still waiting in the debouncer.
    pub async fn shutdown(&self) {
        if self.host.flush().await {
            tracing::debug!("Flushed pending conversation save");
        }
    }
}
