//! Discord gateway event handler.
//!
//! Translates serenity events into the core payload types and delegates every
//! decision to the `PhotoBot` service.

use std::sync::{Arc, OnceLock};

use serenity::{
    all::{Context, EventHandler, GatewayIntents, Message, Reaction, ReactionType, Ready},
    async_trait,
};
use tracing::warn;

use pbot_core::{
    bot::PhotoBot,
    domain::{Attachment, ChannelId, IncomingMessage, MessageId, MessageRef, ReactionAdded, UserId},
    ingest::{CAMERA_EMOJI, DELETE_EMOJI},
};

/// Required gateway intents for the bot.
pub fn intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::MESSAGE_CONTENT
}

/// serenity event handler delegating to the core service.
///
/// The service is installed after the client is built (the ChannelPort needs
/// the client's Http handle); events arriving before that are dropped.
#[derive(Clone, Default)]
pub struct Handler {
    bot: Arc<OnceLock<Arc<PhotoBot>>>,
}

impl Handler {
    pub fn install(&self, bot: Arc<PhotoBot>) {
        let _ = self.bot.set(bot);
    }

    fn bot(&self) -> Option<&Arc<PhotoBot>> {
        self.bot.get()
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        let Some(bot) = self.bot() else { return };
        bot.on_ready(UserId(ready.user.id.get()), &ready.user.name)
            .await;
    }

    async fn message(&self, _ctx: Context, msg: Message) {
        let Some(bot) = self.bot() else { return };

        let incoming = IncomingMessage {
            channel_id: ChannelId(msg.channel_id.get()),
            message_id: MessageId(msg.id.get()),
            author_id: UserId(msg.author.id.get()),
            content: msg.content.clone(),
            created_at: chrono::DateTime::from_timestamp(msg.timestamp.unix_timestamp(), 0)
                .unwrap_or_else(chrono::Utc::now),
            attachments: msg
                .attachments
                .iter()
                .map(|a| Attachment { url: a.url.clone() })
                .collect(),
        };

        if let Err(e) = bot.on_message(&incoming).await {
            warn!(error = %e, "message handling failed");
        }
    }

    async fn reaction_add(&self, ctx: Context, reaction: Reaction) {
        let Some(bot) = self.bot() else { return };
        let Some(reactor) = reaction.user_id else { return };

        // Custom emoji can never match the bot's control emoji.
        let ReactionType::Unicode(emoji) = reaction.emoji.clone() else {
            return;
        };

        // Only the deletion emoji leads anywhere; check it before spending an
        // HTTP round trip on the target message.
        if emoji != DELETE_EMOJI {
            return;
        }

        // The gateway event carries ids only; resolve the target message for
        // its attachments and our own prior reactions.
        let msg = match reaction.message(&ctx.http).await {
            Ok(m) => m,
            Err(e) => {
                warn!(error = %e, "failed to resolve reacted message");
                return;
            }
        };

        let capture_marked = msg.reactions.iter().any(|r| {
            r.me && matches!(&r.reaction_type, ReactionType::Unicode(u) if u == CAMERA_EMOJI)
        });

        let ev = ReactionAdded {
            message: MessageRef {
                channel_id: ChannelId(reaction.channel_id.get()),
                message_id: MessageId(reaction.message_id.get()),
            },
            reactor_id: UserId(reactor.get()),
            emoji,
            attachments: msg
                .attachments
                .iter()
                .map(|a| Attachment { url: a.url.clone() })
                .collect(),
            capture_marked,
        };

        if let Err(e) = bot.on_reaction_add(&ev).await {
            warn!(error = %e, "reaction handling failed");
        }
    }
}
