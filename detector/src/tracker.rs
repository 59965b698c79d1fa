use std::{
    collections::{hash_map::Entry, HashMap},
    sync::Arc,
};

use shared::{
    detector_params::DetectorParams,
    messages::detector::Decision,
    platform::{AuditLog, ChatPlatform, PlatformError},
    types::{MessageHandle, SenderKey, TrackedMessage},
};
use tokio::{sync::mpsc::Sender, time::sleep};

use crate::{
    error::DetectorError,
    expiry::{Expiry, ExpiryScheduler},
    message_window::MessageWindow,
};

pub const FLOOD_WARNING: &str = "stop sending messages this fast!";
pub const REPETITION_WARNING: &str = "stop repeating your messages!";
pub const WARNING_REASON: &str = "Spam warning expired";

/// Registry of the active message windows, one per sender.
///
/// A window exists only while it tracks at least one message. It's created by
/// the first message of a sender and removed as soon as expiry or deletion
/// empties it.
pub struct SpamTracker {
    windows: HashMap<SenderKey, MessageWindow>,
    params: DetectorParams,
    platform: Arc<dyn ChatPlatform>,
    audit_log: Arc<dyn AuditLog>,
    scheduler: ExpiryScheduler,
}

impl SpamTracker {
    pub fn new(
        params: DetectorParams,
        platform: Arc<dyn ChatPlatform>,
        audit_log: Arc<dyn AuditLog>,
        expiry_tx: Sender<Expiry>,
    ) -> Self {
        Self {
            windows: HashMap::new(),
            params,
            platform,
            audit_log,
            scheduler: ExpiryScheduler::new(expiry_tx),
        }
    }

    pub async fn check_spam(&mut self, message: TrackedMessage) -> Result<Decision, DetectorError> {
        let key = message.key.clone();
        let retention = self.params.retention();

        let window = match self.windows.entry(key.clone()) {
            Entry::Vacant(entry) => {
                let mut window = MessageWindow::new(key);
                window.add(message, &self.scheduler, retention);
                entry.insert(window);
                return Ok(Decision::Clean);
            }
            Entry::Occupied(entry) => entry.into_mut(),
        };

        let incoming = message.clone();
        window.add(message, &self.scheduler, retention);
        let similar_count = window.count_similar_to(&incoming, &self.params);

        let result = if self.params.is_flood(window.message_count()) {
            window
                .delete_all(&self.params, &*self.platform, &*self.audit_log)
                .await
                .map(|deleted| Decision::Flood { deleted })
        } else if self.params.too_many_similar_messages(similar_count) {
            window
                .delete_similar(&incoming, &self.params, &*self.platform, &*self.audit_log)
                .await
                .map(|deleted| Decision::Repetition { deleted })
        } else {
            Ok(Decision::Clean)
        };

        // Deregister even if a deletion failed halfway
        if window.is_empty() {
            self.windows.remove(&key);
        }

        let decision = result?;
        let warning = match decision {
            Decision::Clean => return Ok(decision),
            Decision::Flood { deleted } => {
                shared::tracing_info!("{}: message flood, deleted {} messages", &key, deleted);
                FLOOD_WARNING
            }
            Decision::Repetition { deleted } => {
                shared::tracing_info!("{}: repeated messages, deleted {} messages", &key, deleted);
                REPETITION_WARNING
            }
        };

        self.send_warning(&incoming, warning)
            .await
            .map_err(|source| DetectorError::SendWarning { decision, source })?;

        Ok(decision)
    }

    /// Timers of windows that no longer exist are ignored.
    pub fn expire(&mut self, expiry: Expiry) {
        let window = match self.windows.get_mut(&expiry.key) {
            Some(window) => window,
            None => {
                shared::tracing_debug!("{}: window is already gone", &expiry.key);
                return;
            }
        };

        if let Some(expired) = window.expire(&expiry.message_id, self.params.expiry_policy()) {
            shared::tracing_debug!("{}: message {} expired", &expiry.key, expired.id());
        }

        if window.is_empty() {
            self.windows.remove(&expiry.key);
        }
    }

    pub fn update_params(&mut self, params: DetectorParams) {
        self.params = params;
    }

    /// Forgets every sender and cancels all pending expiry timers
    pub fn clear(&mut self) {
        self.windows.clear();
    }

    /// Posts the warning and schedules its removal. The removal runs on its
    /// own, and its failure is only logged.
    async fn send_warning(
        &self,
        message: &TrackedMessage,
        warning: &str,
    ) -> Result<(), PlatformError> {
        let text = format!("{} {}", message.author_mention(), warning);
        let reply = self
            .platform
            .send_reply(message.channel_id(), &text)
            .await?;

        remove_later(self.platform.clone(), reply, self.params.warning_lifetime());
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn window(&self, key: &SenderKey) -> Option<&MessageWindow> {
        self.windows.get(key)
    }
}

fn remove_later(platform: Arc<dyn ChatPlatform>, reply: MessageHandle, lifetime: std::time::Duration) {
    tokio::spawn(async move {
        sleep(lifetime).await;
        if let Err(e) = platform.delete_message(&reply, WARNING_REASON).await {
            shared::tracing_warn!("Couldn't remove spam warning {}: {}", &reply.message_id, &e);
        }
    });
}
