//! Character state manager.
//!
//! Owns the write gate, the persistence adapter and the listener registry for
//! one tracker instance. Every mutation runs as a single gated sequence:
//! resolve storage, read current (or defaults), apply, refresh derived stats
//! if attributes moved, store, commit, notify. The gate is held until the
//! listeners have returned, so notifications arrive in write order.

mod error;

use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;
use tracing::{debug, error, warn};

use rpgtrack_domain::{
    calculate_derived_stats, create_empty_state, deep_merge, get_nested_value, set_nested_value,
    Attributes, CharacterDocument, DerivedStats, DocumentPath, Section,
};

use crate::infrastructure::gate::WriteGate;
use crate::infrastructure::persistence::PersistenceAdapter;
use crate::infrastructure::ports::{ChatMetadata, DebouncedSavePort, HostPort};
use crate::stores::subscribers::{ListenerError, SubscriberRegistry, Subscription};

pub use error::StateError;

/// Metadata key the document is stored under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "rpgTracker";

const ATTRIBUTES_PATH: &str = "attributes";
const DERIVED_STATS_PATH: &str = "derivedStats";
const AUTO_DERIVE_PATH: &str = "settings.autoCalculateDerived";

pub struct StateManager {
    persistence: RwLock<PersistenceAdapter>,
    gate: WriteGate,
    subscribers: SubscriberRegistry,
    storage_key: String,
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new(DEFAULT_STORAGE_KEY)
    }
}

impl StateManager {
    /// A manager with no host attached. Reads yield defaults and writes
    /// report `false` until [`init`](Self::init) is called.
    pub fn new(storage_key: impl Into<String>) -> Self {
        Self {
            persistence: RwLock::new(PersistenceAdapter::detached()),
            gate: WriteGate::new(),
            subscribers: SubscriberRegistry::new(),
            storage_key: storage_key.into(),
        }
    }

    pub fn with_host(storage_key: impl Into<String>, host: Arc<dyn HostPort>) -> Self {
        let manager = Self::new(storage_key);
        manager.init(Some(host), None);
        manager
    }

    /// Attach the host (and optional debounced-save hint). Calling again
    /// replaces both references; the gate and listeners are kept.
    pub fn init(
        &self,
        host: Option<Arc<dyn HostPort>>,
        debounced_hint: Option<Arc<dyn DebouncedSavePort>>,
    ) {
        let adapter = PersistenceAdapter::new(host, debounced_hint);
        debug!(attached = adapter.is_attached(), "State manager initialized");
        *self
            .persistence
            .write()
            .unwrap_or_else(PoisonError::into_inner) = adapter;
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    fn persistence(&self) -> PersistenceAdapter {
        self.persistence
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Current document.
    ///
    /// Without host storage this is a fresh default document that is not
    /// stored anywhere. With storage but no document yet, defaults are
    /// written into the metadata first (without a commit).
    pub async fn get_state(&self) -> CharacterDocument {
        match self.stored_value().await {
            Some(value) => self.decode(value),
            None => create_empty_state(),
        }
    }

    /// Value at a dotted path of the current document.
    pub async fn get_field(&self, path: &str) -> Option<Value> {
        let value = match self.stored_value().await {
            Some(value) => value,
            None => default_value().ok()?,
        };
        get_nested_value(&value, path).cloned()
    }

    async fn stored_value(&self) -> Option<Value> {
        let storage = self.persistence().resolve_host_storage()?;
        let value = storage
            .get_or_insert_with(&self.storage_key, || {
                default_value().unwrap_or_else(|error| {
                    error!(error = %error, "Failed to encode default document");
                    Value::Object(Default::default())
                })
            })
            .await;
        Some(value)
    }

    fn decode(&self, value: Value) -> CharacterDocument {
        let decoded = CharacterDocument::from_value_lenient(value);
        for rejected in &decoded.rejected {
            warn!(
                storage_key = %self.storage_key,
                error = %rejected,
                "Stored section does not match the schema; using defaults"
            );
        }
        decoded.document
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Replace the whole document.
    ///
    /// Stored data the typed view could not hold is kept wherever `document`
    /// still matches what [`get_state`](Self::get_state) would return, so a
    /// read-modify-replace cycle only changes what the caller changed.
    pub async fn set_state(&self, document: CharacterDocument) -> bool {
        self.mutate("set_state", true, move |current| {
            Ok(document.to_value_over(&current)?)
        })
        .await
    }

    /// Deep-merge `partial` into the current document.
    ///
    /// `partial` must be an object; anything else is rejected with `false`.
    pub async fn update_state(&self, partial: Value) -> bool {
        let Value::Object(fields) = &partial else {
            warn!(
                storage_key = %self.storage_key,
                "Partial update is not an object; ignored"
            );
            return false;
        };
        let touches_attributes = fields.contains_key(ATTRIBUTES_PATH);
        self.mutate("update_state", touches_attributes, move |current| {
            Ok(deep_merge(&current, &partial))
        })
        .await
    }

    /// Set the value at a dotted path, creating intermediate objects.
    pub async fn update_field(&self, path: &str, value: Value) -> bool {
        let touches_attributes = DocumentPath::parse(path).touches(&Section::Attributes);
        self.mutate("update_field", touches_attributes, move |mut current| {
            set_nested_value(&mut current, path, value);
            Ok(current)
        })
        .await
    }

    /// Recompute derived stats from the stored attributes and store them.
    pub async fn recalculate_derived_stats(&self) -> DerivedStats {
        let mut computed = None;
        self.mutate("recalculate_derived_stats", false, |mut current| {
            let stats = calculate_derived_stats(&attributes_of(&current));
            set_nested_value(&mut current, DERIVED_STATS_PATH, serde_json::to_value(stats)?);
            computed = Some(stats);
            Ok(current)
        })
        .await;

        computed.unwrap_or_else(|| calculate_derived_stats(&Attributes::default()))
    }

    async fn mutate<F>(&self, operation: &'static str, touches_attributes: bool, apply: F) -> bool
    where
        F: FnOnce(Value) -> Result<Value, StateError>,
    {
        let outcome = self
            .gate
            .run_exclusive(self.try_mutate(touches_attributes, apply))
            .await;

        match outcome {
            Ok(()) => true,
            Err(StateError::HostUnavailable) => {
                warn!(operation, "Host storage unavailable; write dropped");
                false
            }
            Err(error) => {
                error!(operation, error = %error, "Write failed");
                false
            }
        }
    }

    async fn try_mutate<F>(&self, touches_attributes: bool, apply: F) -> Result<(), StateError>
    where
        F: FnOnce(Value) -> Result<Value, StateError>,
    {
        let persistence = self.persistence();
        let storage = persistence
            .resolve_host_storage()
            .ok_or(StateError::HostUnavailable)?;

        let current = self.current_or_default(&storage).await?;
        let mut next = apply(current.clone())?;
        if touches_attributes {
            sync_derived_stats(&current, &mut next)?;
        }

        storage.insert(&self.storage_key, next.clone()).await;
        if !persistence.commit().await {
            // Applied in memory; the host keeps it until a later save succeeds.
            debug!(storage_key = %self.storage_key, "Write applied without a durable save");
        }

        let document = self.decode(next);
        self.subscribers.notify(&document);
        Ok(())
    }

    async fn current_or_default(&self, storage: &ChatMetadata) -> Result<Value, StateError> {
        match storage.get(&self.storage_key).await {
            Some(value) => Ok(value),
            None => Ok(default_value()?),
        }
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&CharacterDocument) + Send + Sync + 'static,
    {
        self.subscribers.subscribe(listener)
    }

    pub fn subscribe_fallible<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&CharacterDocument) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        self.subscribers.subscribe_fallible(listener)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl std::fmt::Debug for StateManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateManager")
            .field("storage_key", &self.storage_key)
            .field("subscribers", &self.subscribers)
            .finish_non_exhaustive()
    }
}

fn default_value() -> Result<Value, StateError> {
    Ok(create_empty_state().to_value()?)
}

/// Attributes stored in `document`, defaulting whatever does not parse.
fn attributes_of(document: &Value) -> Attributes {
    get_nested_value(document, ATTRIBUTES_PATH)
        .and_then(|value| serde_json::from_value(value.clone()).ok())
        .unwrap_or_default()
}

/// Refresh `derivedStats` in `next` when its attributes differ from
/// `previous` and auto-calculation is enabled.
fn sync_derived_stats(previous: &Value, next: &mut Value) -> Result<(), StateError> {
    if get_nested_value(previous, ATTRIBUTES_PATH) == get_nested_value(next, ATTRIBUTES_PATH) {
        return Ok(());
    }
    let auto = get_nested_value(next, AUTO_DERIVE_PATH)
        .and_then(Value::as_bool)
        .unwrap_or(true);
    if !auto {
        return Ok(());
    }

    let stats = calculate_derived_stats(&attributes_of(next));
    set_nested_value(next, DERIVED_STATS_PATH, serde_json::to_value(stats)?);
    debug!(?stats, "Derived stats refreshed after attribute change");
    Ok(())
}

#[cfg(test)]
mod tests;
