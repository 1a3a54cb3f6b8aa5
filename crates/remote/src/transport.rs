//! Byte-level transport seam for the manifest service

use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

/// GET/PUT access to the remote manifest service
///
/// Implementations own the wire format, connection handling and endpoint
/// address. `Ok(None)` from [`RemoteTransport::get`] means the service holds
/// no entry for the key.
#[async_trait]
pub trait RemoteTransport: Send + Sync {
    /// Fetch the bytes stored under `key`
    async fn get(&self, key: &str) -> Result<Option<Bytes>>;

    /// Store `value` under `key`
    async fn put(&self, key: &str, value: Bytes) -> Result<()>;

    /// Endpoint address, for logging
    fn endpoint(&self) -> &str;
}

#[async_trait]
impl<T: RemoteTransport + ?Sized> RemoteTransport for Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        (**self).get(key).await
    }

    async fn put(&self, key: &str, value: Bytes) -> Result<()> {
        (**self).put(key, value).await
    }

    fn endpoint(&self) -> &str {
        (**self).endpoint()
    }
}
