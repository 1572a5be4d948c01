//! Change listeners for the character document.
//!
//! Listeners are invoked synchronously, in registration order, with the
//! document as it stands after each successful write. A listener that fails
//! or panics is logged and skipped; the rest still run.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use rpgtrack_domain::CharacterDocument;

/// Error a fallible listener may report.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

type Listener = Arc<dyn Fn(&CharacterDocument) -> Result<(), ListenerError> + Send + Sync>;
type ListenerList = Mutex<Vec<(u64, Listener)>>;

/// Registry of document listeners.
///
/// Clones share the same listener list.
#[derive(Clone, Default)]
pub struct SubscriberRegistry {
    listeners: Arc<ListenerList>,
    next_id: Arc<AtomicU64>,
}

/// Handle returned by `subscribe`. Dropping it does NOT unsubscribe.
#[derive(Debug, Clone)]
pub struct Subscription {
    id: u64,
    registry: Weak<ListenerList>,
}

impl Subscription {
    /// Remove the listener. Returns false if it was already removed.
    pub fn unsubscribe(&self) -> bool {
        let Some(listeners) = self.registry.upgrade() else {
            return false;
        };
        let mut listeners = listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(id, _)| *id != self.id);
        listeners.len() != before
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an infallible listener.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&CharacterDocument) + Send + Sync + 'static,
    {
        self.subscribe_fallible(move |document| {
            listener(document);
            Ok(())
        })
    }

    /// Register a listener whose errors are logged rather than propagated.
    pub fn subscribe_fallible<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&CharacterDocument) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));
        tracing::debug!(subscription = id, "Listener subscribed");
        Subscription {
            id,
            registry: Arc::downgrade(&self.listeners),
        }
    }

    /// Call every listener with `document`.
    ///
    /// The list is snapshotted first, so listeners may subscribe or
    /// unsubscribe from inside the callback without deadlocking.
    pub fn notify(&self, document: &CharacterDocument) {
        let snapshot: Vec<(u64, Listener)> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        for (id, listener) in snapshot {
            match panic::catch_unwind(AssertUnwindSafe(|| listener(document))) {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    tracing::error!(subscription = id, error = %error, "Listener failed");
                }
                Err(payload) => {
                    tracing::error!(
                        subscription = id,
                        panic = panic_message(payload.as_ref()),
                        "Listener panicked"
                    );
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(registry: &SubscriberRegistry) -> (Subscription, Arc<Mutex<Vec<u32>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let subscription = registry.subscribe(move |document| {
            sink.lock().unwrap().push(document.level);
        });
        (subscription, seen)
    }

    #[test]
    fn listeners_receive_each_notification() {
        let registry = SubscriberRegistry::new();
        let (_subscription, seen) = recorder(&registry);

        let mut document = CharacterDocument::default();
        registry.notify(&document);
        document.level = 2;
        registry.notify(&document);

        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let registry = SubscriberRegistry::new();
        let (subscription, seen) = recorder(&registry);

        assert!(subscription.unsubscribe());
        assert!(!subscription.unsubscribe());
        registry.notify(&CharacterDocument::default());

        assert!(seen.lock().unwrap().is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn unsubscribe_only_removes_its_own_listener() {
        let registry = SubscriberRegistry::new();
        let (first, first_seen) = recorder(&registry);
        let (_second, second_seen) = recorder(&registry);

        first.unsubscribe();
        registry.notify(&CharacterDocument::default());

        assert!(first_seen.lock().unwrap().is_empty());
        assert_eq!(second_seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn failing_and_panicking_listeners_do_not_block_others() {
        let registry = SubscriberRegistry::new();
        registry.subscribe_fallible(|_| Err("listener rejected update".into()));
        registry.subscribe(|_| panic!("listener exploded"));
        let (_subscription, seen) = recorder(&registry);

        registry.notify(&CharacterDocument::default());

        assert_eq!(*seen.lock().unwrap(), vec![1]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn listener_may_unsubscribe_itself_during_notify() {
        let registry = SubscriberRegistry::new();
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let inner_slot = Arc::clone(&slot);
        let subscription = registry.subscribe(move |_| {
            if let Some(subscription) = inner_slot.lock().unwrap().as_ref() {
                subscription.unsubscribe();
            }
        });
        *slot.lock().unwrap() = Some(subscription);

        registry.notify(&CharacterDocument::default());
        assert!(registry.is_empty());
    }

    #[test]
    fn handle_outliving_registry_reports_false() {
        let registry = SubscriberRegistry::new();
        let (subscription, _) = recorder(&registry);
        drop(registry);
        assert!(!subscription.unsubscribe());
    }
}
