//! Tier client contract shared by the local and remote tiers

use crate::Result;
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The two cache tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TierKind {
    /// Directory-backed tier on the build machine
    Local,
    /// Service-backed tier reached over the network
    Remote,
}

impl TierKind {
    /// Lowercase name used in logs
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

impl fmt::Display for TierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque fingerprint of a parse unit, computed by the caller
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    /// Wrap a fingerprint
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The fingerprint as a string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CacheKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for CacheKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// Opaque serialized parse result; clones share the underlying buffer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CacheValue(Bytes);

impl CacheValue {
    /// Wrap a payload
    #[must_use]
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    /// Payload bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Payload length in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the payload is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Unwrap into the shared buffer
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl From<Bytes> for CacheValue {
    fn from(bytes: Bytes) -> Self {
        Self(bytes)
    }
}

impl From<Vec<u8>> for CacheValue {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Bytes::from(bytes))
    }
}

impl From<&'static [u8]> for CacheValue {
    fn from(bytes: &'static [u8]) -> Self {
        Self(Bytes::from_static(bytes))
    }
}

impl From<&str> for CacheValue {
    fn from(s: &str) -> Self {
        Self(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl AsRef<[u8]> for CacheValue {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Narrow capability interface every cache tier implements
///
/// `Ok(None)` is a logical miss. `Err` means the tier could not be used for
/// this call (I/O failure, transport failure, timeout); callers treat it as a
/// miss or a failed write for this tier only.
#[async_trait]
pub trait TierClient: Send + Sync {
    /// Fetch the entry stored under `key`
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheValue>>;

    /// Store `value` under `key`, replacing any previous entry
    async fn put(&self, key: &CacheKey, value: CacheValue) -> Result<()>;

    /// Which tier this client serves
    fn kind(&self) -> TierKind;
}

#[async_trait]
impl<T: TierClient + ?Sized> TierClient for Arc<T> {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheValue>> {
        (**self).get(key).await
    }

    async fn put(&self, key: &CacheKey, value: CacheValue) -> Result<()> {
        (**self).put(key, value).await
    }

    fn kind(&self) -> TierKind {
        (**self).kind()
    }
}
