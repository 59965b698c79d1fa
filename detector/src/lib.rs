#![allow(proc_macro_derive_resolution_fallback, unused_attributes)]

use std::sync::Arc;

use shared::{
    detector_params::DetectorParams,
    messages::detector::{Decision, DetectorDecision, IncMessage, OutMessage},
    platform::{AuditLog, ChatPlatform},
    types::SenderKey,
    ActorWrapper,
};
use tokio::sync::mpsc::{self, Receiver, Sender};

use error::DetectorError;
use expiry::Expiry;
use tracker::SpamTracker;

mod message_window;
#[cfg(test)]
mod test_utils;

pub mod error;
pub mod expiry;
pub mod tracker;

pub use message_window::{MessageWindow, FLOOD_REASON, REPETITION_REASON};

/// Owns the tracker and feeds it incoming messages and elapsed expiry timers
/// one at a time, so windows are never mutated concurrently.
pub struct DetectorManager {
    tracker: SpamTracker,
    rx: Receiver<IncMessage>,
    expiry_rx: Receiver<Expiry>,
    result_tx: Sender<OutMessage>,
}

impl DetectorManager {
    pub fn init(
        params: DetectorParams,
        platform: Arc<dyn ChatPlatform>,
        audit_log: Arc<dyn AuditLog>,
        result_tx: Sender<OutMessage>,
    ) -> ActorWrapper<IncMessage> {
        let (tx, rx) = mpsc::channel(32);
        let (expiry_tx, expiry_rx) = mpsc::channel(32);

        let manager = Self {
            tracker: SpamTracker::new(params, platform, audit_log, expiry_tx),
            rx,
            expiry_rx,
            result_tx,
        };

        let join_handle = tokio::spawn(async move {
            manager.run().await;
        });

        ActorWrapper { join_handle, tx }
    }

    async fn run(mut self) {
        match self.do_run().await {
            Ok(_r) => {
                // Manager finished its work due to incoming `Close` message
            }
            Err(e) => {
                shared::tracing_error!("DetectorManager: Error, while processing messages: {}", &e);
            }
        }

        // Pending expiry timers must not outlive the manager
        self.tracker.clear();

        shared::tracing_info!("DetectorManager: Sending `Closed` message down the line...");
        match self.result_tx.send(OutMessage::Closed).await {
            Ok(_r) => {
                // Successfully sent a message to the receiver
                // Nothing else to do
            }
            Err(e) => {
                shared::tracing_warn!("DetectorManager: Couldn't send `Closed` message: {}", &e);
            }
        }
        shared::tracing_info!("DetectorManager has been closed");
    }

    async fn do_run(&mut self) -> Result<(), DetectorError> {
        loop {
            tokio::select! {
                message = self.rx.recv() => {
                    let message = match message {
                        Some(message) => message,
                        None => {
                            return Err(DetectorError::IncomingChannelClosed);
                        }
                    };

                    match message {
                        IncMessage::Close => {
                            return Ok(());
                        }
                        IncMessage::CheckMessage(message) => {
                            let key = message.key.clone();
                            let result = self.tracker.check_spam(message).await;
                            self.report(key, result).await?;
                        }
                        IncMessage::UpdateParams(params) => {
                            self.tracker.update_params(params);
                        }
                    }
                }
                Some(expiry) = self.expiry_rx.recv() => {
                    self.tracker.expire(expiry);
                }
            }
        }
    }

    async fn report(
        &self,
        key: SenderKey,
        result: Result<Decision, DetectorError>,
    ) -> Result<(), DetectorError> {
        let out_message = match result {
            Ok(decision) if decision.is_spam() => {
                OutMessage::SpamDetected(DetectorDecision::new(key, decision))
            }
            Ok(_clean) => return Ok(()),
            Err(DetectorError::SendWarning { decision, source }) => {
                // The spam is gone either way
                shared::tracing_warn!("{}: couldn't send spam warning: {}", &key, &source);
                OutMessage::SpamDetected(DetectorDecision::new(key, decision))
            }
            Err(e) => {
                shared::tracing_error!("{}: couldn't act on spam: {}", &key, &e);
                OutMessage::ActionFailed {
                    key,
                    error: e.to_string(),
                }
            }
        };

        self.result_tx.send(out_message).await?;
        Ok(())
    }
}
