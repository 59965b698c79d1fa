use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use detector::DetectorManager;
use shared::{
    async_trait,
    detector_params::DetectorParams,
    messages::detector::{IncMessage, OutMessage},
    platform::{AuditLog, ChatPlatform, PlatformError},
    types::{MessageHandle, TrackedMessage},
};
use thiserror::Error;
use tokio::{
    io::{self, AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tracing::Level;

#[derive(Error, Debug, PartialEq)]
enum InputError {
    #[error("Expected `<guild> <author> <message>`, got {0:?}")]
    MissingFields(String),
}

/// Pretends to be the chat platform by logging every call it gets
#[derive(Default)]
struct ConsolePlatform {
    next_message_id: AtomicU64,
}

impl ConsolePlatform {
    fn next_id(&self) -> String {
        self.next_message_id.fetch_add(1, Ordering::SeqCst).to_string()
    }
}

#[async_trait]
impl ChatPlatform for ConsolePlatform {
    async fn delete_message(&self, handle: &MessageHandle, reason: &str) -> Result<(), PlatformError> {
        tracing::info!("Deleted message {} in #{}: {}", &handle.message_id, &handle.channel_id, reason);
        Ok(())
    }

    async fn send_reply(&self, channel_id: &str, text: &str) -> Result<MessageHandle, PlatformError> {
        let handle = MessageHandle::new(channel_id, format!("warning-{}", self.next_id()));
        tracing::info!("#{} <{}>: {}", channel_id, &handle.message_id, text);
        Ok(handle)
    }
}

#[async_trait]
impl AuditLog for ConsolePlatform {
    async fn log_deletion(&self, message: &TrackedMessage, reason: &str) -> Result<(), PlatformError> {
        tracing::info!(
            "Audit: {} from {} was deleted ({}): {:?}",
            message.id(),
            &message.key,
            reason,
            &message.content
        );
        Ok(())
    }
}

fn parse_line(line: &str, message_id: String) -> Result<TrackedMessage, InputError> {
    let mut fields = line.trim().splitn(3, ' ');
    match (fields.next(), fields.next(), fields.next()) {
        (Some(guild_id), Some(author_id), Some(content))
            if !guild_id.is_empty() && !author_id.is_empty() =>
        {
            let handle = MessageHandle::new(format!("{}-general", guild_id), message_id);
            Ok(TrackedMessage::new(guild_id, author_id, content, true, handle))
        }
        _ => Err(InputError::MissingFields(line.to_string())),
    }
}

#[tokio::main]
pub async fn main() {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let platform = Arc::new(ConsolePlatform::default());
    let (result_tx, mut result_rx) = mpsc::channel(32);
    let actor = DetectorManager::init(
        DetectorParams::default(),
        platform.clone(),
        platform.clone(),
        result_tx,
    );

    let actor_tx = actor.tx;
    let actor_handle = actor.join_handle;

    let rx_reader = tokio::spawn(async move {
        while let Some(message) = result_rx.recv().await {
            match message {
                OutMessage::SpamDetected(decision) => {
                    tracing::info!("<{}>: {:?}", &decision.key, &decision.decision);
                }
                OutMessage::ActionFailed { key, error } => {
                    tracing::error!("<{}>: {}", &key, &error);
                }
                OutMessage::Closed => {
                    tracing::info!("Detector has been closed");
                }
            }
        }

        tracing::info!("rx_reader has been closed");
    });

    tracing::info!("Type `<guild> <author> <message>` per line, Ctrl+D to quit");
    let mut lines = BufReader::new(io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Couldn't read stdin: {}", &e);
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let message = match parse_line(&line, platform.next_id()) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("{}", &e);
                continue;
            }
        };

        if let Err(e) = actor_tx.send(IncMessage::CheckMessage(message)).await {
            tracing::error!("Couldn't send message to the detector: {}", &e);
            return;
        }
    }

    tracing::info!("Closing...");
    if let Err(e) = actor_tx.send(IncMessage::Close).await {
        tracing::error!("Couldn't send message to the detector: {}", &e);
        return;
    }

    let _ = actor_handle.await;
    let _ = rx_reader.await;

    tracing::info!("Closed");
}

#[allow(unused_imports)]
mod test {
    use super::*;

    #[test]
    pub fn test_parse_line() {
        let message = parse_line("guild author hello there world", "7".to_string()).unwrap();

        assert_eq!("guild", message.key.guild_id);
        assert_eq!("author", message.key.author_id);
        assert_eq!("hello there world", message.content);
        assert_eq!("7", message.id());
        assert_eq!("guild-general", message.channel_id());

        assert_eq!(
            Err(InputError::MissingFields("guild author".to_string())),
            parse_line("guild author", "8".to_string()).map(|message| message.content)
        );
        assert_eq!(
            Err(InputError::MissingFields("guild  hello".to_string())),
            parse_line("guild  hello", "9".to_string()).map(|message| message.content)
        );
    }
}
