use std::{collections::VecDeque, time::Duration};

use shared::{
    detector_params::{DetectorParams, ExpiryPolicy},
    platform::{AuditLog, ChatPlatform},
    types::{SenderKey, TrackedMessage},
};
use tokio::task::JoinHandle;

use crate::{
    error::DetectorError,
    expiry::{Expiry, ExpiryScheduler},
};

pub const FLOOD_REASON: &str = "Fast message spam";
pub const REPETITION_REASON: &str = "Repeated messages";

/// Recent messages of a single sender, oldest first.
///
/// Every tracked message owns one pending expiry timer. Dropping the window
/// cancels whatever timers are still pending.
pub struct MessageWindow {
    key: SenderKey,
    messages: VecDeque<TrackedMessage>,
    timers: VecDeque<(String, JoinHandle<()>)>,
}

impl MessageWindow {
    pub fn new(key: SenderKey) -> Self {
        Self {
            key,
            messages: VecDeque::new(),
            timers: VecDeque::new(),
        }
    }

    pub fn key(&self) -> &SenderKey {
        &self.key
    }

    pub fn add(&mut self, message: TrackedMessage, scheduler: &ExpiryScheduler, retention: Duration) {
        debug_assert_eq!(self.key, message.key);

        let message_id = message.id().to_string();
        let expiry = Expiry {
            key: self.key.clone(),
            message_id: message_id.clone(),
        };

        self.messages.push_back(message);
        self.timers
            .push_back((message_id, scheduler.schedule(expiry, retention)));
    }

    /// Handles an elapsed timer. Returns the message that left the window, if any.
    ///
    /// Timers that weren't scheduled by this window are ignored: they belong to
    /// a window that was already dropped and replaced under the same key.
    pub fn expire(&mut self, message_id: &str, policy: ExpiryPolicy) -> Option<TrackedMessage> {
        let position = self.timers.iter().position(|(id, _)| id == message_id)?;
        // The timer has already fired, so there's nothing to abort
        self.timers.remove(position);

        match policy {
            ExpiryPolicy::ByIdentity => self.take(message_id),
            ExpiryPolicy::OldestFirst => self.messages.pop_front(),
        }
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn count_similar_to(&self, message: &TrackedMessage, params: &DetectorParams) -> usize {
        self.similar_messages(message, params).len()
    }

    pub fn similar_messages(
        &self,
        message: &TrackedMessage,
        params: &DetectorParams,
    ) -> Vec<&TrackedMessage> {
        self.messages
            .iter()
            .filter(|cached| params.are_messages_similar(&message.content, &cached.content))
            .collect()
    }

    pub async fn delete_all(
        &mut self,
        params: &DetectorParams,
        platform: &dyn ChatPlatform,
        audit_log: &dyn AuditLog,
    ) -> Result<usize, DetectorError> {
        let targets = self
            .messages
            .iter()
            .filter(|cached| is_deletable(cached, platform))
            .map(|cached| cached.id().to_string())
            .collect::<Vec<_>>();

        self.delete_messages(targets, FLOOD_REASON, params, platform, audit_log)
            .await
    }

    pub async fn delete_similar(
        &mut self,
        message: &TrackedMessage,
        params: &DetectorParams,
        platform: &dyn ChatPlatform,
        audit_log: &dyn AuditLog,
    ) -> Result<usize, DetectorError> {
        let targets = self
            .similar_messages(message, params)
            .into_iter()
            .filter(|cached| is_deletable(cached, platform))
            .map(|cached| cached.id().to_string())
            .collect::<Vec<_>>();

        self.delete_messages(targets, REPETITION_REASON, params, platform, audit_log)
            .await
    }

    /// Delete, then log, one message at a time. A message leaves the window
    /// as soon as its deletion is attempted, whether or not the platform
    /// accepts it.
    ///
    /// Under `OldestFirst` the timer of a removed message stays pending: when
    /// it fires, it still evicts the front of the window.
    async fn delete_messages(
        &mut self,
        targets: Vec<String>,
        reason: &str,
        params: &DetectorParams,
        platform: &dyn ChatPlatform,
        audit_log: &dyn AuditLog,
    ) -> Result<usize, DetectorError> {
        let mut deleted = 0;
        for message_id in targets {
            let message = match self.take(&message_id) {
                Some(message) => message,
                None => continue,
            };
            if params.expiry_policy() == ExpiryPolicy::ByIdentity {
                self.cancel_timer(&message_id);
            }

            platform
                .delete_message(&message.handle, reason)
                .await
                .map_err(|source| DetectorError::DeleteMessage {
                    message_id: message_id.clone(),
                    source,
                })?;

            audit_log
                .log_deletion(&message, reason)
                .await
                .map_err(|source| DetectorError::AuditLog {
                    message_id: message_id.clone(),
                    source,
                })?;

            deleted += 1;
        }

        Ok(deleted)
    }

    fn cancel_timer(&mut self, message_id: &str) {
        if let Some(position) = self.timers.iter().position(|(id, _)| id == message_id) {
            if let Some((_, timer)) = self.timers.remove(position) {
                timer.abort();
            }
        }
    }

    fn take(&mut self, message_id: &str) -> Option<TrackedMessage> {
        let position = self
            .messages
            .iter()
            .position(|cached| cached.id() == message_id)?;
        self.messages.remove(position)
    }

    #[cfg(test)]
    pub(crate) fn message_ids(&self) -> Vec<&str> {
        self.messages.iter().map(|cached| cached.id()).collect()
    }
}

impl Drop for MessageWindow {
    fn drop(&mut self) {
        for (_, timer) in self.timers.drain(..) {
            timer.abort();
        }
    }
}

fn is_deletable(message: &TrackedMessage, platform: &dyn ChatPlatform) -> bool {
    message.deletable && platform.is_deletable(&message.handle)
}
