//! Discord adapter (serenity).
//!
//! This crate implements the `pbot-core` ChannelPort over the Discord HTTP
//! API and translates gateway events into core calls.

use std::sync::Arc;

use async_trait::async_trait;

use serenity::all::{
    Command as GlobalCommand, CommandOptionType, CreateCommand, CreateCommandOption, ReactionType,
};
use serenity::http::Http;

use pbot_core::{
    domain::{ChannelId, MessageRef, UserId},
    errors::Error,
    ports::ChannelPort,
    Result,
};

pub mod gateway;
pub mod handler;

/// Largest page Discord serves for the guild member list.
const MEMBER_PAGE_LIMIT: u64 = 1000;

/// Cursor for the next member page, or `None` when a short page signals the
/// end of the list.
fn next_page_after(page_len: usize, last_id: Option<u64>) -> Option<u64> {
    if page_len < MEMBER_PAGE_LIMIT as usize {
        None
    } else {
        last_id
    }
}

pub struct DiscordChannel {
    http: Arc<Http>,
}

impl DiscordChannel {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    fn ds_channel(channel: ChannelId) -> serenity::model::id::ChannelId {
        serenity::model::id::ChannelId::new(channel.0)
    }

    fn map_err(e: serenity::Error) -> Error {
        Error::External(format!("discord error: {e}"))
    }
}

#[async_trait]
impl ChannelPort for DiscordChannel {
    async fn say(&self, channel: ChannelId, text: &str) -> Result<()> {
        Self::ds_channel(channel)
            .say(&self.http, text)
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn add_reaction(&self, msg: MessageRef, emoji: &str) -> Result<()> {
        self.http
            .create_reaction(
                Self::ds_channel(msg.channel_id),
                serenity::model::id::MessageId::new(msg.message_id.0),
                &ReactionType::Unicode(emoji.to_string()),
            )
            .await
            .map_err(Self::map_err)
    }

    async fn channel_members(&self, channel: ChannelId) -> Result<Vec<UserId>> {
        let ch = Self::ds_channel(channel)
            .to_channel(&self.http)
            .await
            .map_err(Self::map_err)?;

        // Discord's member list is per guild; DMs contribute no members.
        let Some(guild_channel) = ch.guild() else {
            return Ok(Vec::new());
        };

        // The member list is paginated; walk it until a short page comes back.
        let mut out = Vec::new();
        let mut after: Option<u64> = None;
        loop {
            let page = self
                .http
                .get_guild_members(guild_channel.guild_id, Some(MEMBER_PAGE_LIMIT), after)
                .await
                .map_err(Self::map_err)?;

            let last_id = page.last().map(|m| m.user.id.get());
            out.extend(
                page.iter()
                    .filter(|m| !m.user.bot)
                    .map(|m| UserId(m.user.id.get())),
            );

            after = next_page_after(page.len(), last_id);
            if after.is_none() {
                break;
            }
        }

        Ok(out)
    }

    async fn sync_commands(&self) -> Result<()> {
        let commands = vec![
            CreateCommand::new("capture")
                .description("Start capturing images posted in this channel")
                .add_option(
                    CreateCommandOption::new(CommandOptionType::String, "name", "Album name")
                        .required(false),
                ),
            CreateCommand::new("stop").description("Stop capturing images in this channel"),
        ];

        GlobalCommand::set_global_commands(&self.http, commands)
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_page_continues_from_its_last_member() {
        let limit = MEMBER_PAGE_LIMIT as usize;
        assert_eq!(next_page_after(limit, Some(12345)), Some(12345));
    }

    #[test]
    fn short_or_empty_page_ends_the_walk() {
        assert_eq!(next_page_after(MEMBER_PAGE_LIMIT as usize - 1, Some(7)), None);
        assert_eq!(next_page_after(0, None), None);
    }
}
