//! On-disk response cache.
//!
//! Responses are stored as JSON under `<root>/<seed>/<key>.json`, where the key is
//! the SHA-256 of the seed and the serialized request body. The same seed and the
//! same conversation therefore replay the same answer without a network call.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::types::ChatResponse;

/// Default cache root, relative to the working directory.
pub const DEFAULT_CACHE_ROOT: &str = ".cache";

#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
    seed: u64,
}

impl ResponseCache {
    /// Cache under `<root>/<seed>`.
    pub fn new(root: impl AsRef<Path>, seed: u64) -> Self {
        Self {
            dir: root.as_ref().join(seed.to_string()),
            seed,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cache key for a request body.
    pub fn key(&self, body: &serde_json::Value) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.seed.to_string().as_bytes());
        hasher.update(body.to_string().as_bytes());
        hex::encode(hasher.finalize())
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Look up a cached response. Unreadable entries count as misses.
    pub async fn get(&self, key: &str) -> Option<ChatResponse> {
        let path = self.path_for(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(_) => return None,
        };

        match serde_json::from_slice(&bytes) {
            Ok(response) => {
                debug!(key = %key, "Response cache hit");
                Some(response)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring corrupt cache entry");
                None
            }
        }
    }

    /// Store a response. Failures are logged and otherwise ignored.
    pub async fn put(&self, key: &str, response: &ChatResponse) {
        if let Err(e) = tokio::fs::create_dir_all(&self.dir).await {
            warn!(dir = %self.dir.display(), error = %e, "Failed to create cache directory");
            return;
        }

        let bytes = match serde_json::to_vec_pretty(response) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "Failed to serialize response for cache");
                return;
            }
        };

        if let Err(e) = tokio::fs::write(self.path_for(key), bytes).await {
            warn!(key = %key, error = %e, "Failed to write cache entry");
        }
    }
}
