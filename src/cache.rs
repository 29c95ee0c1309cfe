//! On-disk review cache.
//!
//! Reviews are stored one JSON file per key, where the key combines the PR
//! number with a truncated SHA-256 of the diff. A changed diff produces a
//! new key; old entries are never evicted.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, instrument, warn};

const HASH_PREFIX_LEN: usize = 8;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize cache entry: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize)]
struct CacheEntry {
    review: String,
}

/// `pr_<number>_<first 8 hex chars of sha256(diff)>`
pub fn cache_key(pr_number: u64, diff: &str) -> String {
    let digest = hex::encode(Sha256::digest(diff.as_bytes()));
    format!("pr_{}_{}", pr_number, &digest[..HASH_PREFIX_LEN])
}

#[derive(Debug, Clone)]
pub struct ReviewCache {
    dir: PathBuf,
}

impl ReviewCache {
    /// Open the cache rooted at `dir`, creating the directory if absent.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| CacheError::Io {
                path: dir.clone(),
                source,
            })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Cached review for `key`, or `None` when there is no usable entry.
    #[instrument(skip(self))]
    pub async fn load(&self, key: &str) -> Result<Option<String>, CacheError> {
        let path = self.entry_path(key);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("cache miss");
                return Ok(None);
            }
            Err(source) => return Err(CacheError::Io { path, source }),
        };

        match serde_json::from_str::<CacheEntry>(&contents) {
            Ok(entry) if !entry.review.is_empty() => {
                debug!(review_bytes = entry.review.len(), "cache hit");
                Ok(Some(entry.review))
            }
            Ok(_) => {
                debug!("cache entry is empty");
                Ok(None)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable cache entry");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, review), fields(review_bytes = review.len()))]
    pub async fn save(&self, key: &str, review: &str) -> Result<(), CacheError> {
        let path = self.entry_path(key);
        let entry = CacheEntry {
            review: review.to_string(),
        };
        let contents = serde_json::to_string_pretty(&entry)?;
        tokio::fs::write(&path, contents)
            .await
            .map_err(|source| CacheError::Io {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), "saved review to cache");
        Ok(())
    }
}
