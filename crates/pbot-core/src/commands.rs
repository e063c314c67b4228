//! Channel-scoped command surface: start/rename capture, stop, admin sync.

use crate::{
    domain::{ChannelId, UserId},
    registry::CaptureRegistry,
    sync::{AlbumUpdate, SyncClient},
};

/// A parsed prefix command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Start capture, optionally naming (or renaming) the channel's album.
    Capture { album_name: Option<String> },
    /// Stop capture for the channel.
    Stop,
    /// Re-register the command set with the platform (owner only).
    Sync,
    /// Anything else that carried the command prefix.
    Unknown(String),
}

/// Parse a message as a command. None when the prefix is absent.
pub fn parse(prefix: char, content: &str) -> Option<Command> {
    let rest = content.trim().strip_prefix(prefix)?;

    let mut parts = rest.trim().splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or("").to_lowercase();
    let args = parts.next().unwrap_or("").trim();

    if name.is_empty() {
        return None;
    }

    Some(match name.as_str() {
        "capture" => Command::Capture {
            album_name: if args.is_empty() {
                None
            } else {
                Some(args.to_string())
            },
        },
        "stop" => Command::Stop,
        "sync" => Command::Sync,
        other => Command::Unknown(other.to_string()),
    })
}

/// User-command failures. Misuse variants reject without mutating any state.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("album name required for first-time capture")]
    AlbumNameRequired,

    #[error("command restricted to the bot owner")]
    NotOwner,

    #[error("unknown command: {0}")]
    Unknown(String),

    #[error(transparent)]
    Internal(#[from] crate::Error),
}

impl CommandError {
    /// Message posted back to the invoking channel.
    pub fn user_message(&self) -> String {
        match self {
            CommandError::AlbumNameRequired => {
                "**Please pass in an album name the first time you start capture, e.g.** \
                 `!capture Holiday 2026`"
                    .to_string()
            }
            CommandError::NotOwner => {
                "**You dont have all the requirements or permissions for using this command :angry:**"
                    .to_string()
            }
            CommandError::Unknown(_) => {
                "**Invalid command. Try using** `help` **to figure out commands!**".to_string()
            }
            CommandError::Internal(_) => {
                "**There was a connection error somewhere, why don't you try again now?**"
                    .to_string()
            }
        }
    }
}

/// Distinguishes the three success phrasings for a capture command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaptureStart {
    /// First capture in this channel; a new album was named.
    Created {
        name: String,
        album_url: Option<String>,
    },
    /// Capture (re)started with no name supplied; membership refreshed only.
    Refreshed { album_url: Option<String> },
    /// Existing capture entry and a new name supplied.
    Renamed {
        name: String,
        album_url: Option<String>,
    },
}

impl CaptureStart {
    pub fn album_url(&self) -> Option<&str> {
        match self {
            CaptureStart::Created { album_url, .. }
            | CaptureStart::Refreshed { album_url }
            | CaptureStart::Renamed { album_url, .. } => album_url.as_deref(),
        }
    }
}

/// Start (or rename) capture for a channel.
///
/// An album name is mandatory the first time a channel starts capture; the
/// rejection happens before any registry mutation. The album update is sent
/// after the flag flips; a rejected update leaves capture on and is reported
/// through the `album_url: None` in the outcome.
pub async fn start_capture(
    registry: &CaptureRegistry,
    sync: &dyn SyncClient,
    channel: ChannelId,
    album_name: Option<&str>,
    members: &[UserId],
) -> Result<CaptureStart, CommandError> {
    let was_tracked = registry.contains(channel).await;
    if !was_tracked && album_name.is_none() {
        return Err(CommandError::AlbumNameRequired);
    }

    registry.set(channel, true).await?;

    let update = AlbumUpdate {
        channel_id: channel.0.to_string(),
        name: album_name.map(|s| s.to_string()),
        members: members.iter().map(|u| u.0.to_string()).collect(),
    };
    let album_url = sync.submit_album_update(&update).await?;

    Ok(match (was_tracked, album_name) {
        (false, Some(name)) => CaptureStart::Created {
            name: name.to_string(),
            album_url,
        },
        (true, Some(name)) => CaptureStart::Renamed {
            name: name.to_string(),
            album_url,
        },
        (true, None) => CaptureStart::Refreshed { album_url },
        // Unreachable: the name-required check above covers (false, None).
        (false, None) => return Err(CommandError::AlbumNameRequired),
    })
}

/// Turn capture off for the channel.
pub async fn stop_capture(
    registry: &CaptureRegistry,
    channel: ChannelId,
) -> Result<(), CommandError> {
    registry.set(channel, false).await?;
    Ok(())
}

/// Admin gate for the command-tree sync.
pub fn ensure_owner(user: UserId, owner: UserId) -> Result<(), CommandError> {
    if user == owner {
        Ok(())
    } else {
        Err(CommandError::NotOwner)
    }
}
