//! Non-blocking update notification.
//!
//! # Delivery
//! ```text
//! refresh cycle ── signal() ──▶ relay (pending flag) per subscriber
//!                                  │
//!                   forwarder task ▼ (one per subscriber)
//!                        callback.reserve().await   ← may block, off the refresh path
//!                        clear pending, send sentinel
//! ```
//!
//! A relay stays pending until its forwarder has a slot in the callback's
//! channel. Signals arriving while it is pending are dropped, so a stalled
//! subscriber sees at most one wakeup after it resumes, not a backlog.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, Notify};

use crate::lifecycle::Shutdown;
use crate::loader::error::LoaderError;

/// Single-slot pending mark for one subscriber.
#[derive(Default)]
struct Relay {
    pending: AtomicBool,
    wake: Notify,
}

impl Relay {
    fn mark(&self) {
        if !self.pending.swap(true, Ordering::AcqRel) {
            self.wake.notify_one();
        }
    }

    async fn forward(&self, callback: &mpsc::Sender<()>) {
        loop {
            self.wake.notified().await;
            let Ok(slot) = callback.reserve().await else {
                return;
            };
            // must clear before the receiver can see the sentinel
            self.pending.store(false, Ordering::Release);
            slot.send(());
        }
    }
}

struct Subscriber {
    relay: Arc<Relay>,
    callback: mpsc::Sender<()>,
}

/// Registered update callbacks for one loader.
pub struct UpdateFanout {
    subscribers: Mutex<Vec<Subscriber>>,
    handle: Option<Handle>,
    shutdown: Shutdown,
}

impl UpdateFanout {
    /// Forwarders spawn on `handle`, or on the caller's runtime if `None`.
    pub fn new(handle: Option<Handle>, shutdown: Shutdown) -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            handle,
            shutdown,
        }
    }

    /// Register `callback` and start its forwarder.
    ///
    /// After shutdown the callback is accepted but never signalled.
    pub fn subscribe(&self, callback: mpsc::Sender<()>) -> Result<(), LoaderError> {
        if callback.is_closed() {
            return Err(LoaderError::ClosedCallback);
        }
        if self.shutdown.is_triggered() {
            tracing::debug!("update callback registered after shutdown, ignoring");
            return Ok(());
        }
        let handle = match &self.handle {
            Some(handle) => handle.clone(),
            None => Handle::try_current().map_err(|_| LoaderError::NoRuntime)?,
        };

        let relay = Arc::new(Relay::default());
        let pending = relay.clone();
        let tx = callback.clone();
        let mut shutdown = self.shutdown.subscribe();

        // Exits when the receiver goes away, even if no signal ever comes.
        handle.spawn(async move {
            tokio::select! {
                _ = pending.forward(&tx) => {}
                _ = tx.closed() => {}
                _ = shutdown.recv() => {}
            }
        });

        self.subscribers
            .lock()
            .expect("fanout mutex poisoned")
            .push(Subscriber { relay, callback });
        Ok(())
    }

    /// Mark every subscriber pending. Never blocks on a subscriber.
    pub fn signal(&self) {
        let mut subscribers = self.subscribers.lock().expect("fanout mutex poisoned");
        subscribers.retain(|s| !s.callback.is_closed());
        for subscriber in subscribers.iter() {
            subscriber.relay.mark();
        }
    }

    /// Number of live subscribers.
    pub fn len(&self) -> usize {
        self.subscribers.lock().expect("fanout mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
