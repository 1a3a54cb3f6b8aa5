//! Adapter for tier clients that must not be called concurrently

use async_trait::async_trait;
use parsecache_core::{CacheKey, CacheValue, Result, TierClient, TierKind};
use tokio::sync::Mutex;

/// Serializes every call to the wrapped client behind an async mutex.
///
/// Only this tier is serialized; calls to the other tier proceed in parallel.
pub struct SerializedTier<C> {
    kind: TierKind,
    inner: Mutex<C>,
}

impl<C: TierClient> SerializedTier<C> {
    /// Wrap a client
    pub fn new(client: C) -> Self {
        Self {
            kind: client.kind(),
            inner: Mutex::new(client),
        }
    }

    /// Unwrap the client
    pub fn into_inner(self) -> C {
        self.inner.into_inner()
    }
}

#[async_trait]
impl<C: TierClient> TierClient for SerializedTier<C> {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheValue>> {
        let client = self.inner.lock().await;
        client.get(key).await
    }

    async fn put(&self, key: &CacheKey, value: CacheValue) -> Result<()> {
        let client = self.inner.lock().await;
        client.put(key, value).await
    }

    fn kind(&self) -> TierKind {
        self.kind
    }
}
