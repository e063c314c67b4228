//! The bot service: gateway events in, registry/sync mutations and chat
//! feedback out. Adapters translate platform events into these calls.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::{
    commands::{self, CaptureStart, Command, CommandError},
    config::Config,
    domain::{ChannelId, IncomingMessage, ReactionAdded, UserId},
    ingest::{self, CAMERA_EMOJI, DELETE_EMOJI},
    ports::ChannelPort,
    registry::CaptureRegistry,
    sync::SyncClient,
    Result,
};

pub struct PhotoBot {
    cfg: Arc<Config>,
    registry: Arc<CaptureRegistry>,
    sync: Arc<dyn SyncClient>,
    channel: Arc<dyn ChannelPort>,
    bot_user: Mutex<Option<UserId>>,
}

impl PhotoBot {
    pub fn new(
        cfg: Arc<Config>,
        registry: Arc<CaptureRegistry>,
        sync: Arc<dyn SyncClient>,
        channel: Arc<dyn ChannelPort>,
    ) -> Self {
        Self {
            cfg,
            registry,
            sync,
            channel,
            bot_user: Mutex::new(None),
        }
    }

    /// Record our own identity once the gateway connects.
    pub async fn on_ready(&self, user: UserId, name: &str) {
        let mut guard = self.bot_user.lock().await;
        *guard = Some(user);
        info!(bot = %name, "bot connected");
    }

    async fn is_self(&self, user: UserId) -> bool {
        let guard = self.bot_user.lock().await;
        matches!(*guard, Some(u) if u == user)
    }

    /// One inbound message: capture pipeline first, then command delegation.
    /// Attachments and commands may coexist in a single message.
    pub async fn on_message(&self, msg: &IncomingMessage) -> Result<()> {
        // Our own messages would loop through the pipeline forever.
        if self.is_self(msg.author_id).await {
            return Ok(());
        }

        let outcome = ingest::capture_images(&self.registry, self.sync.as_ref(), msg).await?;
        if outcome.should_react() {
            if let Err(e) = self
                .channel
                .add_reaction(msg.message_ref(), CAMERA_EMOJI)
                .await
            {
                warn!(error = %e, "failed to add capture reaction");
            }
        }

        if let Some(cmd) = commands::parse(self.cfg.command_prefix, &msg.content) {
            if let Err(e) = self.run_command(msg, cmd).await {
                self.on_command_error(msg.channel_id, &e).await;
            }
        }

        Ok(())
    }

    /// Reaction-driven deletion. Only reacts to the delete emoji on messages
    /// that already bear our own capture mark; everything else is a no-op.
    pub async fn on_reaction_add(&self, ev: &ReactionAdded) -> Result<()> {
        if self.is_self(ev.reactor_id).await {
            return Ok(());
        }
        if !ev.capture_marked || ev.emoji != DELETE_EMOJI {
            return Ok(());
        }

        ingest::process_deletion(self.sync.as_ref(), ev).await?;
        Ok(())
    }

    /// Log a command failure and post the user-facing message to the channel.
    pub async fn on_command_error(&self, channel: ChannelId, err: &CommandError) {
        match err {
            CommandError::Internal(e) => error!(error = %e, "command failed"),
            other => info!(reason = %other, "command rejected"),
        }
        if let Err(e) = self.channel.say(channel, &err.user_message()).await {
            warn!(error = %e, "failed to report command error");
        }
    }

    async fn run_command(
        &self,
        msg: &IncomingMessage,
        cmd: Command,
    ) -> std::result::Result<(), CommandError> {
        match cmd {
            Command::Capture { album_name } => {
                let members = self
                    .channel
                    .channel_members(msg.channel_id)
                    .await
                    .map_err(CommandError::Internal)?;
                let outcome = commands::start_capture(
                    &self.registry,
                    self.sync.as_ref(),
                    msg.channel_id,
                    album_name.as_deref(),
                    &members,
                )
                .await?;
                self.channel
                    .say(msg.channel_id, &capture_reply(&outcome))
                    .await
                    .map_err(CommandError::Internal)?;
                Ok(())
            }
            Command::Stop => {
                commands::stop_capture(&self.registry, msg.channel_id).await?;
                self.channel
                    .say(msg.channel_id, "📷 Capture stopped for this channel.")
                    .await
                    .map_err(CommandError::Internal)?;
                Ok(())
            }
            Command::Sync => {
                commands::ensure_owner(msg.author_id, self.cfg.owner_id)?;
                self.channel
                    .sync_commands()
                    .await
                    .map_err(CommandError::Internal)?;
                self.channel
                    .say(msg.channel_id, "✅ Command set synced.")
                    .await
                    .map_err(CommandError::Internal)?;
                Ok(())
            }
            Command::Unknown(name) => Err(CommandError::Unknown(name)),
        }
    }
}

fn capture_reply(outcome: &CaptureStart) -> String {
    let Some(url) = outcome.album_url() else {
        return "⚠️ Capture is on, but the album service did not accept the update.".to_string();
    };

    match outcome {
        CaptureStart::Created { name, .. } => {
            format!("📸 Capture started. Album \"{name}\" created.\n{url}")
        }
        CaptureStart::Refreshed { .. } => {
            format!("📸 Capture is on. Album membership refreshed.\n{url}")
        }
        CaptureStart::Renamed { name, .. } => {
            format!("📸 Album renamed to \"{name}\".\n{url}")
        }
    }
}
