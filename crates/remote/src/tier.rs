//! Remote tier client on top of a [`RemoteTransport`]

use crate::config::RemoteConfig;
use crate::error::RemoteError;
use crate::retry::retry_with_backoff;
use crate::transport::RemoteTransport;
use async_trait::async_trait;
use parsecache_core::{CacheKey, CacheValue, TierClient, TierKind};
use tracing::debug;

/// Service-backed cache tier
///
/// Every attempt is bounded by [`RemoteConfig::timeout`]; transient failures
/// and timeouts are retried per [`RemoteConfig::retry`]. Whatever is left
/// after the last attempt is reported as a tier failure, never a panic.
pub struct RemoteTier<T> {
    transport: T,
    config: RemoteConfig,
}

impl<T: RemoteTransport> RemoteTier<T> {
    /// Wrap a transport
    pub const fn new(transport: T, config: RemoteConfig) -> Self {
        Self { transport, config }
    }

    /// The underlying transport
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Client tuning
    pub const fn config(&self) -> &RemoteConfig {
        &self.config
    }
}

#[async_trait]
impl<T: RemoteTransport> TierClient for RemoteTier<T> {
    async fn get(&self, key: &CacheKey) -> parsecache_core::Result<Option<CacheValue>> {
        let transport = &self.transport;
        let key_str = key.as_str();
        let timeout = self.config.timeout();

        let fetched = retry_with_backoff(&self.config.retry, "get", || async move {
            match tokio::time::timeout(timeout, transport.get(key_str)).await {
                Ok(result) => result,
                Err(_) => Err(RemoteError::timeout("get", timeout)),
            }
        })
        .await
        .map_err(|e| e.into_tier_error("get"))?;

        debug!(
            endpoint = %transport.endpoint(),
            key = %key,
            hit = fetched.is_some(),
            "Remote parser cache get"
        );
        Ok(fetched.map(CacheValue::from))
    }

    async fn put(&self, key: &CacheKey, value: CacheValue) -> parsecache_core::Result<()> {
        let transport = &self.transport;
        let key_str = key.as_str();
        let timeout = self.config.timeout();
        let bytes = value.into_bytes();
        let size = bytes.len();

        retry_with_backoff(&self.config.retry, "put", || {
            let bytes = bytes.clone();
            async move {
                match tokio::time::timeout(timeout, transport.put(key_str, bytes)).await {
                    Ok(result) => result,
                    Err(_) => Err(RemoteError::timeout("put", timeout)),
                }
            }
        })
        .await
        .map_err(|e| e.into_tier_error("put"))?;

        debug!(
            endpoint = %transport.endpoint(),
            key = %key,
            size,
            "Remote parser cache put"
        );
        Ok(())
    }

    fn kind(&self) -> TierKind {
        TierKind::Remote
    }
}
