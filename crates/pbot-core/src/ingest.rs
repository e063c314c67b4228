//! Message ingestion: attachment filtering and outbound submission.

use tracing::{debug, info, warn};

use crate::{
    domain::{IncomingMessage, ReactionAdded},
    registry::CaptureRegistry,
    sync::{DeletionRequest, ImageRecord, SyncClient},
    Result,
};

/// Reaction the bot adds to a message once at least one attachment landed in
/// the album. Also the marker that makes a message eligible for deletion.
pub const CAMERA_EMOJI: &str = "📸";

/// Reaction that requests deletion of a captured message's images.
pub const DELETE_EMOJI: &str = "❌";

const CAPTION_MAX_CHARS: usize = 100;

const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "webp", "png"];

/// Outcome of running the pipeline over one message.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IngestOutcome {
    /// Attachments that passed the extension filter and were submitted.
    pub submitted: usize,
    /// Submissions the album service accepted.
    pub accepted: usize,
}

impl IngestOutcome {
    /// The success reaction is gated on at least one acceptance, not all.
    pub fn should_react(&self) -> bool {
        self.accepted > 0
    }
}

/// Run the capture pipeline for one inbound message.
///
/// Skips entirely when capture is off for the channel or the message has no
/// attachments. Submission failures are logged and absorbed; the only
/// user-visible signal is the missing success reaction.
pub async fn capture_images(
    registry: &CaptureRegistry,
    sync: &dyn SyncClient,
    msg: &IncomingMessage,
) -> Result<IngestOutcome> {
    if msg.attachments.is_empty() || !registry.get(msg.channel_id).await {
        return Ok(IngestOutcome::default());
    }

    let mut outcome = IngestOutcome::default();
    for att in msg.attachments.iter().filter(|a| is_image_url(&a.url)) {
        let record = ImageRecord {
            url: att.url.clone(),
            channel_id: msg.channel_id.0.to_string(),
            uploader_id: msg.author_id.0.to_string(),
            upload_time: msg.created_at.to_rfc3339(),
            caption: truncate_caption(&msg.content),
            message_id: msg.message_id.0.to_string(),
        };

        outcome.submitted += 1;
        match sync.submit_image(&record).await {
            Ok(true) => {
                outcome.accepted += 1;
                info!(url = %att.url, "image captured");
            }
            Ok(false) => {}
            Err(e) => warn!(url = %att.url, error = %e, "image submission failed"),
        }
    }

    Ok(outcome)
}

/// Fan a deletion reaction out to the album service, one request per image
/// attachment on the target message. Returns the number of requests issued.
///
/// The caller has already verified the gating policy (not the bot's own
/// reaction, message bears the capture mark, emoji is the delete emoji).
pub async fn process_deletion(sync: &dyn SyncClient, ev: &ReactionAdded) -> Result<usize> {
    let mut issued = 0usize;
    for att in ev.attachments.iter().filter(|a| is_image_url(&a.url)) {
        let req = DeletionRequest {
            photo_id: att.url.clone(),
            requester_id: ev.reactor_id.0.to_string(),
        };

        issued += 1;
        match sync.request_deletion(&req).await {
            Ok(200) => info!(url = %att.url, "image deletion accepted"),
            Ok(status) => warn!(url = %att.url, status, "image deletion rejected"),
            Err(e) => warn!(url = %att.url, error = %e, "image deletion request failed"),
        }
    }

    if issued == 0 {
        debug!("deletion reaction on a message with no image attachments");
    }
    Ok(issued)
}

/// Extension check against the image allow-list.
///
/// Operates on the parsed URL path so query strings and fragments don't
/// corrupt suffix detection; comparison is case-insensitive.
pub(crate) fn is_image_url(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let Some((_, ext)) = path.rsplit_once('.') else {
        return false;
    };
    if ext.contains('/') {
        return false; // dot belonged to a directory segment
    }
    IMAGE_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e))
}

/// Hard cut at 100 characters, not word-aware.
pub(crate) fn truncate_caption(content: &str) -> String {
    content.chars().take(CAPTION_MAX_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_list_matches_case_insensitively() {
        assert!(is_image_url("https://cdn.example/a/b/photo.jpg"));
        assert!(is_image_url("https://cdn.example/a/b/photo.JPEG"));
        assert!(is_image_url("https://cdn.example/x.WebP"));
        assert!(is_image_url("https://cdn.example/x.png"));

        assert!(!is_image_url("https://cdn.example/x.gif"));
        assert!(!is_image_url("https://cdn.example/x.mp4"));
        assert!(!is_image_url("https://cdn.example/no-extension"));
    }

    #[test]
    fn query_strings_do_not_corrupt_suffix_detection() {
        assert!(is_image_url("https://cdn.example/x.png?ex=66&is=77&hm=aa"));
        assert!(is_image_url("https://cdn.example/x.jpg#section"));
        // Extension only appears inside the query: not an image path.
        assert!(!is_image_url("https://cdn.example/download?file=x.png"));
    }

    #[test]
    fn dot_in_directory_does_not_count_as_extension() {
        assert!(!is_image_url("https://cdn.example/v1.2/file"));
    }

    #[test]
    fn caption_is_cut_at_exactly_100_characters() {
        let content = "x".repeat(250);
        assert_eq!(truncate_caption(&content).chars().count(), 100);

        let short = "keep me whole";
        assert_eq!(truncate_caption(short), short);

        // Character cut, not byte cut.
        let emoji = "📷".repeat(120);
        assert_eq!(truncate_caption(&emoji).chars().count(), 100);
    }
}
