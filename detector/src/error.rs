use shared::{
    messages::detector::{Decision, OutMessage},
    platform::PlatformError,
};

use thiserror::Error;
use tokio::sync::mpsc::error::SendError;

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("Couldn't delete message {message_id}: {source}")]
    DeleteMessage {
        message_id: String,
        #[source]
        source: PlatformError,
    },
    #[error("Couldn't log deletion of message {message_id}: {source}")]
    AuditLog {
        message_id: String,
        #[source]
        source: PlatformError,
    },
    #[error("Spam was removed ({decision:?}), but the warning couldn't be sent: {source}")]
    SendWarning {
        decision: Decision,
        #[source]
        source: PlatformError,
    },
    #[error("Incoming messages channel was closed. That should never happen.")]
    IncomingChannelClosed,
    #[error("Outgoing messages channel was closed: {0}")]
    OutgoingChannelClosed(#[source] SendError<OutMessage>),
}

impl From<SendError<OutMessage>> for DetectorError {
    fn from(e: SendError<OutMessage>) -> Self {
        DetectorError::OutgoingChannelClosed(e)
    }
}
