//! Trailing-edge debouncer for save requests.
//!
//! Every `trigger` restarts the quiet period; the action runs once the quiet
//! period elapses without another trigger. Runs never overlap, and `flush`
//! runs a pending action right away.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::Mutex;

use crate::infrastructure::ports::DebouncedSavePort;

type ActionFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
type Action = Arc<dyn Fn() -> ActionFuture + Send + Sync>;

struct Inner {
    delay: Duration,
    action: Action,
    /// Bumped on every trigger and flush; a sleeping task only fires if it
    /// still holds the latest generation when it wakes.
    generation: AtomicU64,
    /// Highest generation whose action has completed.
    settled: AtomicU64,
    running: Mutex<()>,
}

impl Inner {
    async fn run(&self, generation: u64) {
        let _running = self.running.lock().await;
        (self.action)().await;
        self.settled.fetch_max(generation, Ordering::SeqCst);
    }
}

#[derive(Clone)]
pub struct Debouncer {
    inner: Arc<Inner>,
}

impl Debouncer {
    pub fn new<F, Fut>(delay: Duration, action: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let action: Action = Arc::new(move || Box::pin(action()) as ActionFuture);
        Self {
            inner: Arc::new(Inner {
                delay,
                action,
                generation: AtomicU64::new(0),
                settled: AtomicU64::new(0),
                running: Mutex::new(()),
            }),
        }
    }

    pub fn delay(&self) -> Duration {
        self.inner.delay
    }

    /// Schedule the action, superseding any request still in its quiet period.
    pub fn trigger(&self) {
        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!("Debounced save requested outside a tokio runtime; dropped");
            return;
        };

        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let inner = Arc::clone(&self.inner);
        runtime.spawn(async move {
            tokio::time::sleep(inner.delay).await;
            if inner.generation.load(Ordering::SeqCst) != generation {
                return;
            }
            inner.run(generation).await;
        });
    }

    /// True while a triggered action has not yet completed.
    pub fn is_pending(&self) -> bool {
        self.inner.settled.load(Ordering::SeqCst) < self.inner.generation.load(Ordering::SeqCst)
    }

    /// Run a pending action now instead of waiting out the quiet period.
    /// Returns whether anything was pending.
    pub async fn flush(&self) -> bool {
        if !self.is_pending() {
            return false;
        }
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.run(generation).await;
        true
    }
}

impl std::fmt::Debug for Debouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("delay", &self.inner.delay)
            .field("pending", &self.is_pending())
            .finish()
    }
}

impl DebouncedSavePort for Debouncer {
    fn request_save(&self) {
        self.trigger();
    }
}
