//! Remote album service client.
//!
//! All three operations are fire-and-forget relative to local state: a failed
//! submission is logged and reported to the caller, never retried or queued.

use async_trait::async_trait;
use serde::Serialize;
use tracing::warn;

use crate::Result;

/// Metadata for one captured image attachment. Built per attachment, sent
/// once, not retained locally.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub url: String,
    pub channel_id: String,
    pub uploader_id: String,
    /// ISO-8601 UTC message creation time.
    pub upload_time: String,
    /// First 100 characters of the message text.
    pub caption: String,
    pub message_id: String,
}

/// Album name/membership update, sent on capture start or rename.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumUpdate {
    pub channel_id: String,
    /// Omitted on membership-only refreshes so the remote keeps its name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub members: Vec<String>,
}

/// Request to remove a previously captured image, keyed by its URL.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionRequest {
    pub photo_id: String,
    pub requester_id: String,
}

/// Port for the remote album/database service.
#[async_trait]
pub trait SyncClient: Send + Sync {
    /// True iff the service accepted the record (HTTP 200). Rejections are
    /// logged and treated as recoverable; the caller decides what to surface.
    async fn submit_image(&self, record: &ImageRecord) -> Result<bool>;

    /// Album URL returned by the service on success, None on failure.
    async fn submit_album_update(&self, update: &AlbumUpdate) -> Result<Option<String>>;

    /// Raw status code for the caller to branch on.
    async fn request_deletion(&self, request: &DeletionRequest) -> Result<u16>;
}

/// `SyncClient` over HTTP. Endpoint URLs are derived once at construction;
/// there is no runtime endpoint discovery.
#[derive(Clone, Debug)]
pub struct HttpSyncClient {
    http: reqwest::Client,
    photo_url: String,
    album_url: String,
    delete_url: String,
}

impl HttpSyncClient {
    pub fn new(base_url: &str, timeout: std::time::Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client build");

        Self {
            http,
            photo_url: join_endpoint(base_url, "photo"),
            album_url: join_endpoint(base_url, "album"),
            delete_url: join_endpoint(base_url, "delete_photo_by_url"),
        }
    }
}

#[async_trait]
impl SyncClient for HttpSyncClient {
    async fn submit_image(&self, record: &ImageRecord) -> Result<bool> {
        let resp = self.http.post(&self.photo_url).json(record).send().await?;

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            warn!(
                status = status.as_u16(),
                reason = status.canonical_reason().unwrap_or("unknown"),
                url = %record.url,
                "album service rejected image record"
            );
            return Ok(false);
        }
        Ok(true)
    }

    async fn submit_album_update(&self, update: &AlbumUpdate) -> Result<Option<String>> {
        let resp = self.http.post(&self.album_url).json(update).send().await?;

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            warn!(
                status = status.as_u16(),
                reason = status.canonical_reason().unwrap_or("unknown"),
                channel = %update.channel_id,
                "album service rejected album update"
            );
            return Ok(None);
        }

        let body: serde_json::Value = resp.json().await?;
        let album_url = body.get("albumUrl").and_then(|v| v.as_str());
        if album_url.is_none() {
            warn!(channel = %update.channel_id, "album response carried no albumUrl");
        }
        Ok(album_url.map(|s| s.to_string()))
    }

    async fn request_deletion(&self, request: &DeletionRequest) -> Result<u16> {
        let resp = self.http.post(&self.delete_url).json(request).send().await?;
        Ok(resp.status().as_u16())
    }
}

fn join_endpoint(base: &str, suffix: &str) -> String {
    format!("{}/{suffix}", base.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_fixed_at_construction() {
        let c = HttpSyncClient::new("http://db.example:8080/", std::time::Duration::from_secs(1));
        assert_eq!(c.photo_url, "http://db.example:8080/photo");
        assert_eq!(c.album_url, "http://db.example:8080/album");
        assert_eq!(c.delete_url, "http://db.example:8080/delete_photo_by_url");
    }

    #[test]
    fn image_record_uses_camel_case_wire_names() {
        let record = ImageRecord {
            url: "https://cdn.example/a.jpg".to_string(),
            channel_id: "1".to_string(),
            uploader_id: "2".to_string(),
            upload_time: "2026-01-01T00:00:00+00:00".to_string(),
            caption: "hi".to_string(),
            message_id: "3".to_string(),
        };
        let v = serde_json::to_value(&record).unwrap();
        for key in ["url", "channelId", "uploaderId", "uploadTime", "caption", "messageId"] {
            assert!(v.get(key).is_some(), "missing wire field {key}");
        }
    }

    #[test]
    fn album_update_omits_name_when_absent() {
        let update = AlbumUpdate {
            channel_id: "1".to_string(),
            name: None,
            members: vec!["2".to_string()],
        };
        let v = serde_json::to_value(&update).unwrap();
        assert!(v.get("name").is_none());

        let update = AlbumUpdate {
            name: Some("Holiday".to_string()),
            ..update
        };
        let v = serde_json::to_value(&update).unwrap();
        assert_eq!(v.get("name").and_then(|n| n.as_str()), Some("Holiday"));
    }

    #[test]
    fn deletion_request_wire_shape() {
        let req = DeletionRequest {
            photo_id: "https://cdn.example/a.jpg".to_string(),
            requester_id: "9".to_string(),
        };
        let v = serde_json::to_value(&req).unwrap();
        assert!(v.get("photoId").is_some());
        assert!(v.get("requesterId").is_some());
    }
}
