//! Directory-backed cache tier
//!
//! Entries are addressed by the SHA-256 of the cache key and stored in a
//! two-level fan-out so no single directory grows unbounded:
//!
//! ```text
//! {root}/
//!   ab/
//!     cd/
//!       abcdef123456...  (serialized parse result)
//! ```
//!
//! Writes go to a uniquely named temporary file in the destination directory
//! and are renamed into place, so concurrent readers see either the old entry,
//! the new entry, or nothing.

use async_trait::async_trait;
use parsecache_core::{CacheKey, CacheValue, Error, Result, TierClient, TierKind};
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Cache tier stored under a local directory
#[derive(Debug, Clone)]
pub struct LocalDirTier {
    root: PathBuf,
}

impl LocalDirTier {
    /// Create a tier rooted at `root`; the directory is created on first write
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the tier
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path where the entry for `key` lives
    ///
    /// Uses a two-level directory structure: `{root}/{h[0:2]}/{h[2:4]}/{h}`
    #[must_use]
    pub fn entry_path(&self, key: &CacheKey) -> PathBuf {
        let hex = hex::encode(Sha256::digest(key.as_str().as_bytes()));
        self.root.join(&hex[0..2]).join(&hex[2..4]).join(hex)
    }

    /// Whether an entry exists for `key`
    pub async fn contains(&self, key: &CacheKey) -> bool {
        tokio::fs::try_exists(self.entry_path(key))
            .await
            .unwrap_or(false)
    }
}

fn unavailable(operation: &str, path: &Path, err: &std::io::Error) -> Error {
    Error::tier_unavailable(
        TierKind::Local,
        operation,
        format!("{}: {err}", path.display()),
    )
}

#[async_trait]
impl TierClient for LocalDirTier {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheValue>> {
        let path = self.entry_path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                debug!(key = %key, path = %path.display(), size = bytes.len(), "Local parser cache hit");
                Ok(Some(CacheValue::from(bytes)))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(unavailable("get", &path, &e)),
        }
    }

    async fn put(&self, key: &CacheKey, value: CacheValue) -> Result<()> {
        let path = self.entry_path(key);
        let Some(parent) = path.parent() else {
            return Err(Error::tier_unavailable(
                TierKind::Local,
                "put",
                format!("{} has no parent directory", path.display()),
            ));
        };

        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| unavailable("create_dir_all", parent, &e))?;

        // Unique per writer so concurrent stores of the same key never share a temp file
        let tmp_path = parent.join(format!(".{}.tmp", uuid::Uuid::new_v4()));
        if let Err(e) = tokio::fs::write(&tmp_path, value.as_bytes()).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(unavailable("write", &tmp_path, &e));
        }

        // Atomic rename to final location
        if let Err(e) = tokio::fs::rename(&tmp_path, &path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(unavailable("rename", &path, &e));
        }

        debug!(key = %key, path = %path.display(), size = value.len(), "Local parser cache put");
        Ok(())
    }

    fn kind(&self) -> TierKind {
        TierKind::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_entry_path_fan_out() {
        let tier = LocalDirTier::new("/cache");
        let path = tier.entry_path(&CacheKey::from("k1"));
        let hex = path.file_name().unwrap().to_str().unwrap().to_string();

        assert_eq!(hex.len(), 64);
        assert_eq!(
            path,
            PathBuf::from("/cache")
                .join(&hex[0..2])
                .join(&hex[2..4])
                .join(&hex)
        );
    }

    #[test]
    fn test_entry_path_is_stable_and_distinct() {
        let tier = LocalDirTier::new("/cache");
        assert_eq!(
            tier.entry_path(&CacheKey::from("a")),
            tier.entry_path(&CacheKey::from("a"))
        );
        assert_ne!(
            tier.entry_path(&CacheKey::from("a")),
            tier.entry_path(&CacheKey::from("b"))
        );
    }

    #[tokio::test]
    async fn test_missing_entry_is_miss() {
        let tmp = TempDir::new().unwrap();
        let tier = LocalDirTier::new(tmp.path());

        assert_eq!(tier.get(&CacheKey::from("absent")).await.unwrap(), None);
        assert!(!tier.contains(&CacheKey::from("absent")).await);
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let tmp = TempDir::new().unwrap();
        let tier = LocalDirTier::new(tmp.path().join("nested/root"));
        let key = CacheKey::from("//foo:BUCK");

        tier.put(&key, CacheValue::from("parsed")).await.unwrap();

        assert!(tier.contains(&key).await);
        assert_eq!(
            tier.get(&key).await.unwrap(),
            Some(CacheValue::from("parsed"))
        );
    }

    #[tokio::test]
    async fn test_put_overwrites_and_leaves_no_temp_files() {
        let tmp = TempDir::new().unwrap();
        let tier = LocalDirTier::new(tmp.path());
        let key = CacheKey::from("k");

        tier.put(&key, CacheValue::from("old")).await.unwrap();
        tier.put(&key, CacheValue::from("new")).await.unwrap();

        assert_eq!(tier.get(&key).await.unwrap(), Some(CacheValue::from("new")));
        let parent = tier.entry_path(&key).parent().unwrap().to_path_buf();
        let names: Vec<_> = std::fs::read_dir(parent)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1);
    }

    #[tokio::test]
    async fn test_unwritable_root_is_tier_failure() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let tier = LocalDirTier::new(&blocker);

        let err = tier
            .put(&CacheKey::from("k"), CacheValue::from("v"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::TierUnavailable {
                tier: TierKind::Local,
                ..
            }
        ));
    }
}
