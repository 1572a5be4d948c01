//! File-backed host: one JSON file per conversation.
//!
//! Layout: `<data_dir>/<conversation>.json` holds the whole metadata mapping.
//! Writes go to `<conversation>.json.tmp` first and are renamed into place, so
//! a crash mid-write never leaves a truncated conversation file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::infrastructure::debounce::Debouncer;
use crate::infrastructure::ports::{ChatMetadata, HostError, HostPort, SaveCapabilities};
use crate::infrastructure::settings::SaveMode;

#[derive(Debug)]
pub struct JsonFileHost {
    path: PathBuf,
    metadata: ChatMetadata,
    mode: SaveMode,
    debouncer: Debouncer,
}

impl JsonFileHost {
    /// Open (or start) `conversation` under `data_dir`.
    ///
    /// A missing file is an empty conversation; an unreadable or malformed
    /// one is an error.
    pub async fn open(
        data_dir: impl AsRef<Path>,
        conversation: &str,
        mode: SaveMode,
        debounce: Duration,
    ) -> Result<Self, HostError> {
        validate_conversation_name(conversation)?;

        let data_dir = data_dir.as_ref();
        tokio::fs::create_dir_all(data_dir)
            .await
            .map_err(|e| HostError::storage("create_data_dir", e))?;

        let path = data_dir.join(format!("{conversation}.json"));
        let metadata = ChatMetadata::from_map(load_mapping(&path).await?);

        let debouncer = {
            let path = path.clone();
            let metadata = metadata.clone();
            Debouncer::new(debounce, move || {
                let path = path.clone();
                let metadata = metadata.clone();
                async move {
                    if let Err(error) = write_atomically(&path, &metadata).await {
                        tracing::error!(
                            error = %error,
                            path = %path.display(),
                            "Debounced conversation save failed"
                        );
                    }
                }
            })
        };

        tracing::debug!(path = %path.display(), %mode, "Opened conversation file");

        Ok(Self {
            path,
            metadata,
            mode,
            debouncer,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metadata(&self) -> ChatMetadata {
        self.metadata.clone()
    }

    pub fn mode(&self) -> SaveMode {
        self.mode
    }

    /// Write out any debounced save still waiting for its quiet period.
    pub async fn flush(&self) -> bool {
        self.debouncer.flush().await
    }
}

#[async_trait]
impl HostPort for JsonFileHost {
    fn chat_metadata(&self) -> Result<Option<ChatMetadata>, HostError> {
        Ok(Some(self.metadata.clone()))
    }

    fn save_capabilities(&self) -> SaveCapabilities {
        match self.mode {
            SaveMode::Immediate => SaveCapabilities::IMMEDIATE,
            SaveMode::Debounced => SaveCapabilities::DEBOUNCED,
        }
    }

    async fn save_metadata(&self) -> Result<(), HostError> {
        write_atomically(&self.path, &self.metadata).await
    }

    fn save_metadata_debounced(&self) -> Result<(), HostError> {
        self.debouncer.trigger();
        Ok(())
    }
}

fn validate_conversation_name(conversation: &str) -> Result<(), HostError> {
    let invalid = conversation.is_empty()
        || conversation == "."
        || conversation == ".."
        || conversation.contains(['/', '\\']);
    if invalid {
        return Err(HostError::unavailable(format!(
            "invalid conversation name {conversation:?}"
        )));
    }
    Ok(())
}

async fn load_mapping(path: &Path) -> Result<Map<String, Value>, HostError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
        Err(e) => return Err(HostError::storage("load_conversation", e)),
    };

    match serde_json::from_slice::<Value>(&bytes).map_err(HostError::serialization)? {
        Value::Object(map) => Ok(map),
        other => Err(HostError::serialization(format!(
            "{} does not hold a JSON object (found {})",
            path.display(),
            json_kind(&other)
        ))),
    }
}

async fn write_atomically(path: &Path, metadata: &ChatMetadata) -> Result<(), HostError> {
    let snapshot = Value::Object(metadata.snapshot().await);
    let json = serde_json::to_vec_pretty(&snapshot).map_err(HostError::serialization)?;

    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, &json)
        .await
        .map_err(|e| HostError::storage("write_conversation", e))?;
    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| HostError::storage("rename_conversation", e))?;

    tracing::debug!(path = %path.display(), bytes = json.len(), "Saved conversation file");
    Ok(())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
