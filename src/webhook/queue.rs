//! Notifier: bounded outbound queue for lifecycle webhooks.
//!
//! DESIGN
//! ======
//! Handlers enqueue with `try_send` so an operator request never waits on the
//! automation platform. A single worker drains the queue and makes exactly one
//! POST attempt per event.
//!
//! ERROR HANDLING
//! ==============
//! Delivery is at-most-once. A full queue drops the event, a failed POST is
//! logged, and neither is retried. Every outcome is counted so the health
//! endpoint can show what was lost.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{Event, WebhookConfig, WebhookError, WebhookSink, WebhookTarget};
use crate::error::ErrorCode;

/// Snapshot of delivery counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub capacity: usize,
    pub enqueued: u64,
    pub delivered: u64,
    pub failed: u64,
    pub dropped: u64,
    pub skipped: u64,
}

#[derive(Default)]
struct Counters {
    enqueued: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
    skipped: AtomicU64,
}

struct Outbound {
    url: String,
    event: Event,
}

/// Cheap to clone; every clone feeds the same worker.
#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::Sender<Outbound>,
    config: Arc<WebhookConfig>,
    sink: Arc<dyn WebhookSink>,
    counters: Arc<Counters>,
}

/// Receiving half of the queue. Run it with [`Worker::spawn`].
pub struct Worker {
    rx: mpsc::Receiver<Outbound>,
    sink: Arc<dyn WebhookSink>,
    counters: Arc<Counters>,
}

impl Notifier {
    /// Create the queue without starting the worker.
    #[must_use]
    pub fn new(config: WebhookConfig, sink: Arc<dyn WebhookSink>) -> (Self, Worker) {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let counters = Arc::new(Counters::default());
        let notifier = Self { tx, config: Arc::new(config), sink: sink.clone(), counters: counters.clone() };
        (notifier, Worker { rx, sink, counters })
    }

    /// Create the queue and spawn its worker.
    pub fn spawn(config: WebhookConfig, sink: Arc<dyn WebhookSink>) -> (Self, JoinHandle<()>) {
        info!(
            queue_capacity = config.queue_capacity,
            timeout_secs = config.timeout_secs,
            configured = config.routes.len(),
            "webhook notifier configured"
        );
        let (notifier, worker) = Self::new(config, sink);
        (notifier, worker.spawn())
    }

    /// Queue a lifecycle event. Never blocks and never fails the caller.
    pub fn enqueue(&self, target: WebhookTarget, event: Event) {
        let Some(url) = self.config.url(target) else {
            self.counters.skipped.fetch_add(1, Ordering::Relaxed);
            debug!(%target, event_type = %event.event_type, "no webhook configured; skipping event");
            return;
        };

        let event_type = event.event_type.clone();
        match self.tx.try_send(Outbound { url: url.to_owned(), event }) {
            Ok(()) => {
                self.counters.enqueued.fetch_add(1, Ordering::Relaxed);
            }
            Err(TrySendError::Full(_)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(%target, %event_type, "webhook queue full; dropping event");
            }
            Err(TrySendError::Closed(_)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(%target, %event_type, "webhook queue closed; dropping event");
            }
        }
    }

    /// Deliver immediately and report the outcome.
    ///
    /// # Errors
    ///
    /// Returns `NotConfigured` when the target has no URL, or the sink error.
    pub async fn deliver(&self, target: WebhookTarget, event: &Event) -> Result<(), WebhookError> {
        let url = self.config.url(target).ok_or(WebhookError::NotConfigured(target))?;
        let result = self.sink.post(url, event).await;
        self.counters.record(&result);
        result
    }

    #[must_use]
    pub fn is_configured(&self, target: WebhookTarget) -> bool {
        self.config.url(target).is_some()
    }

    #[must_use]
    pub fn stats(&self) -> QueueStats {
        QueueStats {
            capacity: self.tx.max_capacity(),
            enqueued: self.counters.enqueued.load(Ordering::Relaxed),
            delivered: self.counters.delivered.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
            skipped: self.counters.skipped.load(Ordering::Relaxed),
        }
    }
}

impl Counters {
    fn record(&self, result: &Result<(), WebhookError>) {
        match result {
            Ok(()) => self.delivered.fetch_add(1, Ordering::Relaxed),
            Err(_) => self.failed.fetch_add(1, Ordering::Relaxed),
        };
    }
}

impl Worker {
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Drain until every `Notifier` clone is dropped.
    pub async fn run(mut self) {
        while let Some(outbound) = self.rx.recv().await {
            let result = self.sink.post(&outbound.url, &outbound.event).await;
            if let Err(e) = &result {
                warn!(
                    error = %e,
                    code = e.error_code(),
                    retryable = e.retryable(),
                    event_id = %outbound.event.event_id,
                    event_type = %outbound.event.event_type,
                    "webhook delivery failed; event discarded"
                );
            } else {
                debug!(event_id = %outbound.event.event_id, event_type = %outbound.event.event_type, "webhook delivered");
            }
            self.counters.record(&result);
        }
    }
}

#[cfg(test)]
#[path = "queue_test.rs"]
mod tests;
