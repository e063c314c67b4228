use std::sync::Arc;

use pbot_core::{config::Config, registry::CaptureRegistry, sync::HttpSyncClient};

#[tokio::main]
async fn main() -> Result<(), pbot_core::Error> {
    pbot_core::logging::init("pbot")?;

    let cfg = Arc::new(Config::load()?);
    let registry = Arc::new(CaptureRegistry::load(&cfg.capture_file)?);
    let sync = Arc::new(HttpSyncClient::new(&cfg.database_url, cfg.http_timeout));

    pbot_discord::gateway::run(cfg, registry, sync)
        .await
        .map_err(|e| pbot_core::Error::External(format!("discord gateway failed: {e}")))?;

    Ok(())
}
