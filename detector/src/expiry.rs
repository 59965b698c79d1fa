use std::time::Duration;

use shared::types::SenderKey;
use tokio::{sync::mpsc::Sender, task::JoinHandle, time::sleep};

/// Emitted when a tracked message has outlived the retention period.
#[derive(Debug, Clone, PartialEq)]
pub struct Expiry {
    pub key: SenderKey,
    pub message_id: String,
}

/// Spawns one-shot timers that report back through a channel instead of
/// touching the windows directly, so the owner of the windows stays the only
/// one mutating them.
#[derive(Clone)]
pub struct ExpiryScheduler {
    tx: Sender<Expiry>,
}

impl ExpiryScheduler {
    pub fn new(tx: Sender<Expiry>) -> Self {
        Self { tx }
    }

    /// Abort the returned handle to cancel the timer
    pub fn schedule(&self, expiry: Expiry, after: Duration) -> JoinHandle<()> {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            sleep(after).await;
            if let Err(e) = tx.send(expiry).await {
                // Owner is gone, nothing left to expire
                shared::tracing_debug!("Dropping expiry for {}: {}", &e.0.key, &e.0.message_id);
            }
        })
    }
}
