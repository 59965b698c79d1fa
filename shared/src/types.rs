use std::fmt;

/// Scope of spam tracking: one author inside one guild.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SenderKey {
    pub guild_id: String,
    pub author_id: String,
}

impl SenderKey {
    pub fn new(guild_id: impl Into<String>, author_id: impl Into<String>) -> Self {
        Self {
            guild_id: guild_id.into(),
            author_id: author_id.into(),
        }
    }
}

impl fmt::Display for SenderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.guild_id, self.author_id)
    }
}

/// Opaque reference to a message living on the chat platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageHandle {
    pub channel_id: String,
    pub message_id: String,
}

impl MessageHandle {
    pub fn new(channel_id: impl Into<String>, message_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            message_id: message_id.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrackedMessage {
    pub key: SenderKey,
    pub handle: MessageHandle,
    pub content: String,
    /// Deletability as reported by the platform when the message arrived
    pub deletable: bool,
}

impl TrackedMessage {
    pub fn new(
        guild_id: impl Into<String>,
        author_id: impl Into<String>,
        content: impl Into<String>,
        deletable: bool,
        handle: MessageHandle,
    ) -> Self {
        Self {
            key: SenderKey::new(guild_id, author_id),
            handle,
            content: content.into(),
            deletable,
        }
    }

    pub fn id(&self) -> &str {
        &self.handle.message_id
    }

    pub fn channel_id(&self) -> &str {
        &self.handle.channel_id
    }

    /// Mention of the author in the platform's markup
    pub fn author_mention(&self) -> String {
        format!("<@!{}>", self.key.author_id)
    }
}

#[allow(unused_imports)]
mod test {
    use super::*;

    #[test]
    pub fn test_sender_key_scope() {
        let key_1 = SenderKey::new("guild", "author");
        let key_2 = SenderKey::new("guild", "author");
        let other_author = SenderKey::new("guild", "someone else");
        let other_guild = SenderKey::new("another guild", "author");

        assert_eq!(key_1, key_2);
        assert_ne!(key_1, other_author);
        assert_ne!(key_1, other_guild);
        assert_eq!("guild-author", key_1.to_string());
    }

    #[test]
    pub fn test_tracked_message_accessors() {
        let message = TrackedMessage::new(
            "1",
            "42",
            "hello world",
            true,
            MessageHandle::new("general", "1001"),
        );

        assert_eq!("1001", message.id());
        assert_eq!("general", message.channel_id());
        assert_eq!("<@!42>", message.author_mention());
        assert_eq!(SenderKey::new("1", "42"), message.key);
    }
}
