use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    },
};

use shared::{
    async_trait,
    platform::{AuditLog, ChatPlatform, PlatformError},
    types::{MessageHandle, TrackedMessage},
};

pub fn message(guild_id: &str, author_id: &str, message_id: &str, content: &str) -> TrackedMessage {
    TrackedMessage::new(
        guild_id,
        author_id,
        content,
        true,
        MessageHandle::new("channel", message_id),
    )
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Delete { message_id: String, reason: String },
    Log { message_id: String, reason: String },
    Reply { channel_id: String, text: String },
}

impl Call {
    pub fn delete(message_id: &str, reason: &str) -> Self {
        Call::Delete {
            message_id: message_id.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn log(message_id: &str, reason: &str) -> Self {
        Call::Log {
            message_id: message_id.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn reply(channel_id: &str, text: &str) -> Self {
        Call::Reply {
            channel_id: channel_id.to_string(),
            text: text.to_string(),
        }
    }
}

/// Records every platform and audit call in order
#[derive(Default)]
pub struct RecordingPlatform {
    calls: Mutex<Vec<Call>>,
    undeletable: Mutex<HashSet<String>>,
    failing_deletes: Mutex<HashSet<String>>,
    fail_replies: AtomicBool,
    replies_sent: AtomicUsize,
}

impl RecordingPlatform {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn forbid_deletion(&self, message_id: &str) {
        self.undeletable.lock().unwrap().insert(message_id.to_string());
    }

    pub fn fail_deletion(&self, message_id: &str) {
        self.failing_deletes
            .lock()
            .unwrap()
            .insert(message_id.to_string());
    }

    pub fn fail_replies(&self) {
        self.fail_replies.store(true, Ordering::SeqCst);
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ChatPlatform for RecordingPlatform {
    async fn delete_message(
        &self,
        handle: &MessageHandle,
        reason: &str,
    ) -> Result<(), PlatformError> {
        self.record(Call::delete(&handle.message_id, reason));
        if self.failing_deletes.lock().unwrap().contains(&handle.message_id) {
            return Err(PlatformError::UnknownMessage(handle.message_id.clone()));
        }
        Ok(())
    }

    fn is_deletable(&self, handle: &MessageHandle) -> bool {
        !self.undeletable.lock().unwrap().contains(&handle.message_id)
    }

    async fn send_reply(&self, channel_id: &str, text: &str) -> Result<MessageHandle, PlatformError> {
        self.record(Call::reply(channel_id, text));
        if self.fail_replies.load(Ordering::SeqCst) {
            return Err(PlatformError::MissingPermissions("SEND_MESSAGES".to_string()));
        }
        let reply_number = self.replies_sent.fetch_add(1, Ordering::SeqCst);
        Ok(MessageHandle::new(channel_id, format!("reply-{}", reply_number)))
    }
}

#[async_trait]
impl AuditLog for RecordingPlatform {
    async fn log_deletion(&self, message: &TrackedMessage, reason: &str) -> Result<(), PlatformError> {
        self.record(Call::log(message.id(), reason));
        Ok(())
    }
}
