//! Mutual-exclusion gate for document writes.
//!
//! At most one holder at a time; waiters are admitted in arrival order
//! (tokio's mutex is fair). Release happens when the guard drops, so early
//! returns, errors and panics all hand the gate on.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{Mutex, MutexGuard};

/// FIFO gate serializing read-modify-write sequences.
#[derive(Debug, Default)]
pub struct WriteGate {
    lock: Mutex<()>,
    waiting: AtomicUsize,
}

/// Proof of holding the gate. Dropping it releases the gate.
#[derive(Debug)]
pub struct GateGuard<'a> {
    _held: MutexGuard<'a, ()>,
}

/// Counts one queued caller for as long as it lives, including when the
/// `acquire` future is dropped before the lock is granted.
struct Queued<'a>(&'a AtomicUsize);

impl<'a> Queued<'a> {
    fn enter(waiting: &'a AtomicUsize) -> Self {
        waiting.fetch_add(1, Ordering::SeqCst);
        Self(waiting)
    }
}

impl Drop for Queued<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl WriteGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until the gate is free, then hold it.
    pub async fn acquire(&self) -> GateGuard<'_> {
        let queued = Queued::enter(&self.waiting);
        let held = self.lock.lock().await;
        drop(queued);
        GateGuard { _held: held }
    }

    /// Run `operation` while holding the gate.
    pub async fn run_exclusive<F, T>(&self, operation: F) -> T
    where
        F: Future<Output = T>,
    {
        let _guard = self.acquire().await;
        operation.await
    }

    pub fn is_held(&self) -> bool {
        self.lock.try_lock().is_err()
    }

    /// Callers currently queued in `acquire`.
    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }
}
