//! Best-effort capture of raw upstream response bodies for offline analysis.
//!
//! When enabled, bodies land in `{dir}/{endpoint}/{timestamp}[_{suffix}].json`.
//! Errors are logged and swallowed; capturing must never interrupt polling.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tokio::fs;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default)]
pub struct ResponseStore {
    dir: Option<PathBuf>,
}

impl ResponseStore {
    /// `None` disables capturing entirely.
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    pub fn is_enabled(&self) -> bool {
        self.dir.is_some()
    }

    /// Write `bytes` under `endpoint`, e.g. `"sensors"` or `"forecast"`.
    /// `suffix` is appended after the timestamp; pass `""` to omit it.
    pub async fn save(&self, endpoint: &str, suffix: &str, bytes: &[u8]) {
        let Some(root) = &self.dir else {
            return;
        };

        let dir = root.join(endpoint);
        let path = dir.join(file_name(Utc::now(), suffix));

        if let Err(e) = fs::create_dir_all(&dir).await {
            warn!(path = %path.display(), error = %e, "response_store: failed to create directory");
            return;
        }

        let content = render(bytes);
        if let Err(e) = fs::write(&path, &content).await {
            warn!(
                path = %path.display(),
                error = %e,
                "response_store: failed to write response file"
            );
        } else {
            debug!(path = %path.display(), bytes = content.len(), "response_store: saved");
        }
    }
}

fn file_name(at: DateTime<Utc>, suffix: &str) -> String {
    let ts = at.format("%Y%m%dT%H%M%S%.3fZ");
    if suffix.is_empty() {
        format!("{ts}.json")
    } else {
        format!("{ts}_{suffix}.json")
    }
}

/// Pretty-print valid JSON; keep anything else byte-for-byte.
fn render(bytes: &[u8]) -> Vec<u8> {
    serde_json::from_slice::<serde_json::Value>(bytes)
        .ok()
        .and_then(|v| serde_json::to_vec_pretty(&v).ok())
        .unwrap_or_else(|| bytes.to_vec())
}
