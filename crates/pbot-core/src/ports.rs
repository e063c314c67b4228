use async_trait::async_trait;

use crate::{
    domain::{ChannelId, MessageRef, UserId},
    Result,
};

/// Outbound chat capabilities the core needs from the gateway adapter.
///
/// Discord is the first implementation; any gateway that preserves per-channel
/// event ordering can sit behind this.
#[async_trait]
pub trait ChannelPort: Send + Sync {
    /// Post a plain-text message to a channel.
    async fn say(&self, channel: ChannelId, text: &str) -> Result<()>;

    /// Attach a unicode emoji reaction to a message.
    async fn add_reaction(&self, msg: MessageRef, emoji: &str) -> Result<()>;

    /// Non-bot member ids of the channel, for album membership updates.
    async fn channel_members(&self, channel: ChannelId) -> Result<Vec<UserId>>;

    /// Re-register the user-facing command set with the platform.
    async fn sync_commands(&self) -> Result<()>;
}
