use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{domain::UserId, errors::Error, Result};

/// Typed configuration for the bot, read once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// Discord bot token.
    pub discord_token: String,
    /// Base URL of the remote album/database service.
    pub database_url: String,
    /// Owner identity allowed to run admin commands.
    pub owner_id: UserId,

    /// Prefix character that marks a message as a command.
    pub command_prefix: char,
    /// Backing file for per-channel capture flags.
    pub capture_file: PathBuf,
    /// Timeout applied to every outbound HTTP call.
    pub http_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let discord_token = env_str("DISCORD_TOKEN").and_then(non_empty).ok_or_else(|| {
            Error::Config(
                "No token found for the Discord bot. Set DISCORD_TOKEN in the environment or .env"
                    .to_string(),
            )
        })?;

        let database_url = env_str("DATABASE_URL").and_then(non_empty).ok_or_else(|| {
            Error::Config("DATABASE_URL environment variable is required".to_string())
        })?;

        let owner_id = env_str("OWNER_ID")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(UserId)
            .ok_or_else(|| {
                Error::Config("OWNER_ID environment variable is required (numeric)".to_string())
            })?;

        let command_prefix = env_str("COMMAND_PREFIX")
            .and_then(|s| s.trim().chars().next())
            .unwrap_or('!');

        let capture_file = env_path("CAPTURE_FILE").unwrap_or_else(|| {
            PathBuf::from("db").join("capture.json")
        });
        if let Some(parent) = capture_file.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let http_timeout = Duration::from_millis(env_u64("HTTP_TIMEOUT_MS").unwrap_or(10_000));

        Ok(Self {
            discord_token,
            database_url,
            owner_id,
            command_prefix,
            capture_file,
            http_timeout,
        })
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key).map(PathBuf::from)
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
