//! Graceful shutdown signalling.
//!
//! A [`Shutdown`] handle is cloned into the collector and the rate-limited
//! client. Ctrl+C flips it; the collector stops before starting the next
//! chunk and the client abandons a pending cooldown wait, so an interrupt
//! never lands between a fetch and its checkpoint.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::warn;

#[derive(Debug, Default)]
struct Inner {
    requested: AtomicBool,
    notify: Notify,
}

/// Cloneable shutdown flag with async notification
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    inner: Arc<Inner>,
}

impl Shutdown {
    /// Create an untriggered handle
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown; wakes every waiter once
    pub fn request(&self) {
        if !self.inner.requested.swap(true, Ordering::SeqCst) {
            self.inner.notify.notify_waiters();
        }
    }

    /// Whether shutdown has been requested
    pub fn is_requested(&self) -> bool {
        self.inner.requested.load(Ordering::SeqCst)
    }

    /// Resolve once shutdown is requested (immediately if it already was)
    pub async fn requested(&self) {
        let notified = self.inner.notify.notified();
        if self.is_requested() {
            return;
        }
        notified.await;
    }
}

/// Spawn a task that requests shutdown on Ctrl+C
pub fn listen_for_ctrl_c(shutdown: Shutdown) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Ctrl+C received - finishing current chunk checkpoint and stopping");
            shutdown.request();
        }
    });
}
