//! Client construction and run loop.

use std::sync::Arc;

use serenity::Client;
use tracing::info;

use pbot_core::{bot::PhotoBot, config::Config, registry::CaptureRegistry, sync::SyncClient};

use crate::{
    handler::{self, Handler},
    DiscordChannel,
};

/// Build the serenity client, wire the core service, and run until the
/// gateway connection ends.
pub async fn run(
    cfg: Arc<Config>,
    registry: Arc<CaptureRegistry>,
    sync: Arc<dyn SyncClient>,
) -> anyhow::Result<()> {
    let handler = Handler::default();
    let mut client = Client::builder(&cfg.discord_token, handler::intents())
        .event_handler(handler.clone())
        .await?;

    let channel = Arc::new(DiscordChannel::new(client.http.clone()));
    let bot = Arc::new(PhotoBot::new(cfg.clone(), registry, sync, channel));
    handler.install(bot);

    info!(capture_file = %cfg.capture_file.display(), "starting gateway");
    client.start().await?;
    Ok(())
}
