use chrono::{DateTime, Utc};

/// Discord user id (snowflake).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub u64);

/// Discord channel id (snowflake).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChannelId(pub u64);

/// Discord message id (snowflake).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub u64);

/// A stable reference to a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub channel_id: ChannelId,
    pub message_id: MessageId,
}

/// One attachment on an incoming message.
#[derive(Clone, Debug)]
pub struct Attachment {
    pub url: String,
}

/// Cross-gateway incoming message payload.
///
/// Discord-specific fields should live in the Discord adapter.
#[derive(Clone, Debug)]
pub struct IncomingMessage {
    pub channel_id: ChannelId,
    pub message_id: MessageId,
    pub author_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub attachments: Vec<Attachment>,
}

impl IncomingMessage {
    pub fn message_ref(&self) -> MessageRef {
        MessageRef {
            channel_id: self.channel_id,
            message_id: self.message_id,
        }
    }
}

/// A reaction added to a message, with the target message already resolved by
/// the adapter (the gateway event alone does not carry attachments).
#[derive(Clone, Debug)]
pub struct ReactionAdded {
    pub message: MessageRef,
    pub reactor_id: UserId,
    /// Unicode emoji as sent by the platform. Custom emoji never match the
    /// bot's control emoji and are translated to an empty string.
    pub emoji: String,
    /// Attachments of the message the reaction targets.
    pub attachments: Vec<Attachment>,
    /// True when the target message already bears the bot's own capture
    /// reaction, i.e. it was a successfully captured image message.
    pub capture_marked: bool,
}
