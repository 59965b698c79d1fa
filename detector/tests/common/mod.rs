use std::{collections::HashSet, sync::Mutex};

use shared::{
    async_trait,
    platform::{AuditLog, ChatPlatform, PlatformError},
    types::{MessageHandle, TrackedMessage},
};

pub fn message(author_id: &str, message_id: &str, content: &str) -> TrackedMessage {
    TrackedMessage::new(
        "guild",
        author_id,
        content,
        true,
        MessageHandle::new("general", message_id),
    )
}

/// Chat platform that remembers what was deleted, logged and posted
#[derive(Default)]
pub struct FakeDiscord {
    pub deleted: Mutex<Vec<String>>,
    pub logged: Mutex<Vec<String>>,
    pub replies: Mutex<Vec<String>>,
    pub failing_deletes: Mutex<HashSet<String>>,
    pub replies_forbidden: Mutex<bool>,
}

impl FakeDiscord {
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn logged(&self) -> Vec<String> {
        self.logged.lock().unwrap().clone()
    }

    pub fn replies(&self) -> Vec<String> {
        self.replies.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatPlatform for FakeDiscord {
    async fn delete_message(&self, handle: &MessageHandle, _reason: &str) -> Result<(), PlatformError> {
        if self.failing_deletes.lock().unwrap().contains(&handle.message_id) {
            return Err(PlatformError::Request("503 Service Unavailable".to_string()));
        }
        self.deleted.lock().unwrap().push(handle.message_id.clone());
        Ok(())
    }

    async fn send_reply(&self, channel_id: &str, text: &str) -> Result<MessageHandle, PlatformError> {
        if *self.replies_forbidden.lock().unwrap() {
            return Err(PlatformError::MissingPermissions("SEND_MESSAGES".to_string()));
        }
        let mut replies = self.replies.lock().unwrap();
        replies.push(text.to_string());
        Ok(MessageHandle::new(channel_id, format!("warning-{}", replies.len())))
    }
}

#[async_trait]
impl AuditLog for FakeDiscord {
    async fn log_deletion(&self, message: &TrackedMessage, reason: &str) -> Result<(), PlatformError> {
        self.logged
            .lock()
            .unwrap()
            .push(format!("{}: {}", message.id(), reason));
        Ok(())
    }
}
