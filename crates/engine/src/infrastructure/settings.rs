//! Runtime settings loaded from the environment.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::stores::DEFAULT_STORAGE_KEY;

/// How the file host persists metadata after a write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SaveMode {
    /// Write the conversation file before the mutation returns.
    #[default]
    Immediate,
    /// Coalesce bursts of writes into one file write after a quiet period.
    Debounced,
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown save mode '{0}' (expected 'immediate' or 'debounced')")]
pub struct ParseSaveModeError(String);

impl FromStr for SaveMode {
    type Err = ParseSaveModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "immediate" => Ok(Self::Immediate),
            "debounced" => Ok(Self::Debounced),
            other => Err(ParseSaveModeError(other.to_string())),
        }
    }
}

impl fmt::Display for SaveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Immediate => f.write_str("immediate"),
            Self::Debounced => f.write_str("debounced"),
        }
    }
}

/// Tracker settings.
///
/// Environment variables (all optional):
/// - `RPGTRACK_STORAGE_KEY`: metadata key holding the document
/// - `RPGTRACK_DATA_DIR`: directory of conversation files
/// - `RPGTRACK_CONVERSATION`: active conversation name
/// - `RPGTRACK_SAVE_MODE`: `immediate` or `debounced`
/// - `RPGTRACK_DEBOUNCE_MS`: quiet period for debounced saves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub storage_key: String,
    pub data_dir: PathBuf,
    pub conversation: String,
    pub save_mode: SaveMode,
    pub debounce_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            data_dir: PathBuf::from(".rpgtrack"),
            conversation: "default".to_string(),
            save_mode: SaveMode::Immediate,
            debounce_ms: 500,
        }
    }
}

impl Settings {
    /// Defaults overridden by any `RPGTRACK_*` variables that parse.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            storage_key: env_or("RPGTRACK_STORAGE_KEY", defaults.storage_key),
            data_dir: env_or("RPGTRACK_DATA_DIR", defaults.data_dir),
            conversation: env_or("RPGTRACK_CONVERSATION", defaults.conversation),
            save_mode: env_or("RPGTRACK_SAVE_MODE", defaults.save_mode),
            debounce_ms: env_or("RPGTRACK_DEBOUNCE_MS", defaults.debounce_ms),
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Helper to read an env var with a default.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
