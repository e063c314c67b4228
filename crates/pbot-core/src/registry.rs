use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use tokio::sync::Mutex;

use crate::{domain::ChannelId, errors::Error, Result};

/// Durable per-channel capture flags.
///
/// Absence of an entry means capture is off (opt-in model). Every mutation
/// rewrites the whole backing file atomically (write a sibling temp file, then
/// rename); writes are rare so simplicity wins over performance. The map is
/// mutex-guarded so the registry stays safe under a multi-threaded gateway.
#[derive(Debug)]
pub struct CaptureRegistry {
    path: PathBuf,
    channels: Mutex<BTreeMap<String, bool>>,
}

impl CaptureRegistry {
    /// Load the registry from `path`.
    ///
    /// A missing file is a valid first run (empty registry). A file that exists
    /// but is not a JSON object is a hard error: silently resetting user data
    /// is worse than refusing to start.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let channels = if path.exists() {
            let txt = fs::read_to_string(&path)?;
            parse_capture_file(&path, &txt)?
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            channels: Mutex::new(channels),
        })
    }

    /// Capture flag for a channel; false when the channel was never set.
    pub async fn get(&self, channel: ChannelId) -> bool {
        self.channels
            .lock()
            .await
            .get(&channel.0.to_string())
            .copied()
            .unwrap_or(false)
    }

    /// Whether the channel has ever had capture started (used to decide if an
    /// album name is mandatory).
    pub async fn contains(&self, channel: ChannelId) -> bool {
        self.channels.lock().await.contains_key(&channel.0.to_string())
    }

    /// Update a channel's flag and persist the full map.
    ///
    /// The lock is held across the file write so concurrent writers cannot
    /// interleave a stale rewrite.
    pub async fn set(&self, channel: ChannelId, capture: bool) -> Result<()> {
        let mut channels = self.channels.lock().await;
        channels.insert(channel.0.to_string(), capture);

        let txt = serde_json::to_string(&*channels)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, txt)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn parse_capture_file(path: &Path, txt: &str) -> Result<BTreeMap<String, bool>> {
    if txt.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    let value: serde_json::Value =
        serde_json::from_str(txt).map_err(|e| Error::Registry {
            path: path.to_path_buf(),
            reason: format!("not valid JSON: {e}"),
        })?;

    let Some(obj) = value.as_object() else {
        return Err(Error::Registry {
            path: path.to_path_buf(),
            reason: "expected a JSON object of channel id -> bool".to_string(),
        });
    };

    // Non-boolean values are tolerated on read (forward compatibility) and
    // never re-emitted.
    let mut out = BTreeMap::new();
    for (k, v) in obj {
        if let Some(b) = v.as_bool() {
            out.insert(k.clone(), b);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_file(prefix: &str) -> PathBuf {
        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let pid = std::process::id();
        PathBuf::from(format!("/tmp/{prefix}-{pid}-{ts}.json"))
    }

    #[tokio::test]
    async fn unknown_channel_defaults_to_off() {
        let reg = CaptureRegistry::load(tmp_file("pbot-reg-default")).unwrap();
        assert!(!reg.get(ChannelId(42)).await);
        assert!(!reg.contains(ChannelId(42)).await);
    }

    #[tokio::test]
    async fn set_then_unset_reads_back_false() {
        let reg = CaptureRegistry::load(tmp_file("pbot-reg-toggle")).unwrap();
        reg.set(ChannelId(7), true).await.unwrap();
        assert!(reg.get(ChannelId(7)).await);
        reg.set(ChannelId(7), false).await.unwrap();
        assert!(!reg.get(ChannelId(7)).await);
        // Entry still exists even when off.
        assert!(reg.contains(ChannelId(7)).await);
    }

    #[tokio::test]
    async fn state_survives_a_reload_cycle() {
        let path = tmp_file("pbot-reg-reload");
        {
            let reg = CaptureRegistry::load(&path).unwrap();
            reg.set(ChannelId(1), true).await.unwrap();
            reg.set(ChannelId(2), false).await.unwrap();
        }

        let reg = CaptureRegistry::load(&path).unwrap();
        assert!(reg.get(ChannelId(1)).await);
        assert!(!reg.get(ChannelId(2)).await);
        assert!(reg.contains(ChannelId(2)).await);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_file_is_an_empty_registry() {
        let path = tmp_file("pbot-reg-missing");
        assert!(CaptureRegistry::load(path).is_ok());
    }

    #[test]
    fn invalid_file_fails_loudly() {
        let path = tmp_file("pbot-reg-bad");
        fs::write(&path, "not json at all {").unwrap();
        let err = CaptureRegistry::load(&path).unwrap_err();
        assert!(matches!(err, Error::Registry { .. }));

        fs::write(&path, "[1, 2, 3]").unwrap();
        let err = CaptureRegistry::load(&path).unwrap_err();
        assert!(matches!(err, Error::Registry { .. }));

        let _ = fs::remove_file(&path);
    }

    #[tokio::test]
    async fn non_boolean_values_are_tolerated_and_dropped() {
        let path = tmp_file("pbot-reg-fwd");
        fs::write(&path, r#"{"1": true, "meta": {"version": 2}, "2": false}"#).unwrap();

        let reg = CaptureRegistry::load(&path).unwrap();
        assert!(reg.get(ChannelId(1)).await);
        assert!(!reg.get(ChannelId(2)).await);

        // A rewrite emits only boolean entries.
        reg.set(ChannelId(3), true).await.unwrap();
        let txt = fs::read_to_string(&path).unwrap();
        let v: serde_json::Value = serde_json::from_str(&txt).unwrap();
        assert!(v.get("meta").is_none());
        assert_eq!(v.get("3").and_then(|b| b.as_bool()), Some(true));

        let _ = fs::remove_file(&path);
    }
}
