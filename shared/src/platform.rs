use async_trait::async_trait;
use thiserror::Error;

use crate::types::{MessageHandle, TrackedMessage};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlatformError {
    #[error("Missing permissions: {0}")]
    MissingPermissions(String),
    #[error("Unknown message: {0}")]
    UnknownMessage(String),
    #[error("Request failed: {0}")]
    Request(String),
}

/// Operations the detector needs from the chat platform.
///
/// Retries, if any, are the platform's business: the detector calls each
/// method once and propagates whatever comes back.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    async fn delete_message(&self, handle: &MessageHandle, reason: &str)
        -> Result<(), PlatformError>;

    /// Whether the bot is still allowed to delete this message
    fn is_deletable(&self, _handle: &MessageHandle) -> bool {
        true
    }

    async fn send_reply(&self, channel_id: &str, text: &str)
        -> Result<MessageHandle, PlatformError>;
}

#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn log_deletion(&self, message: &TrackedMessage, reason: &str)
        -> Result<(), PlatformError>;
}
