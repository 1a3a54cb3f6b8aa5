//! Lookup and store routing across the local and remote tiers
//!
//! The coordinator is the only component the build-file evaluation pipeline
//! talks to. It applies the resolved [`CachePolicy`]:
//!
//! - `lookup` reads the local tier first, then the remote tier. A remote hit
//!   is copied into the local tier in the background when the local tier is
//!   `READWRITE`.
//! - `store` writes every `READWRITE` tier, each independently of the other.
//! - `READONLY` tiers are never written, `NONE` tiers are never touched.
//!
//! Tier failures are logged and degrade to a miss or a dropped write. No
//! tier error ever reaches the caller: the cache is an optimization and its
//! total failure must look like "no cache", never like a failed build.

use crate::serialized::SerializedTier;
use crate::stats::{CacheStats, CacheStatsSnapshot};
use futures::future::OptionFuture;
use parsecache_core::{CacheKey, CachePolicy, CacheValue, Error, Result, TierClient, TierKind};
use std::sync::Arc;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

type TierHandle = Arc<dyn TierClient>;

/// Tier handles plus the write eligibility derived from the policy.
///
/// Cheap to clone so background writes can own a copy.
#[derive(Clone)]
struct TierSet {
    local: Option<TierHandle>,
    remote: Option<TierHandle>,
    local_writable: bool,
    remote_writable: bool,
    stats: Arc<CacheStats>,
}

impl TierSet {
    fn is_empty(&self) -> bool {
        self.local.is_none() && self.remote.is_none()
    }

    fn writable(&self, tier: TierKind) -> Option<&TierHandle> {
        match tier {
            TierKind::Local if self.local_writable => self.local.as_ref(),
            TierKind::Remote if self.remote_writable => self.remote.as_ref(),
            _ => None,
        }
    }

    /// Read one tier; failures count as a miss for that tier
    async fn read(&self, handle: &TierHandle, tier: TierKind, key: &CacheKey) -> Option<CacheValue> {
        match handle.get(key).await {
            Ok(Some(value)) => {
                debug!(tier = %tier, key = %key, size = value.len(), "Parser cache hit");
                self.stats.record_hit(tier);
                Some(value)
            }
            Ok(None) => {
                debug!(tier = %tier, key = %key, "Parser cache tier miss");
                self.stats.record_tier_miss(tier);
                None
            }
            Err(e) => {
                warn!(tier = %tier, key = %key, error = %e, "Parser cache read failed, treating as miss");
                self.stats.record_read_error(tier);
                None
            }
        }
    }

    /// Write one tier; failures are logged and dropped
    async fn write(&self, handle: &TierHandle, tier: TierKind, key: &CacheKey, value: CacheValue) -> bool {
        match handle.put(key, value).await {
            Ok(()) => {
                self.stats.record_write(tier);
                true
            }
            Err(e) => {
                warn!(tier = %tier, key = %key, error = %e, "Parser cache write failed");
                self.stats.record_write_failure(tier);
                false
            }
        }
    }

    /// Write every writable tier concurrently
    async fn store(&self, key: &CacheKey, value: CacheValue) {
        let local: OptionFuture<_> = self
            .writable(TierKind::Local)
            .map(|handle| self.write(handle, TierKind::Local, key, value.clone()))
            .into();
        let remote: OptionFuture<_> = self
            .writable(TierKind::Remote)
            .map(|handle| self.write(handle, TierKind::Remote, key, value.clone()))
            .into();

        tokio::join!(local, remote);
    }
}

/// Routes parse-result lookups and stores across the two cache tiers
///
/// Construct one per build invocation with [`CacheCoordinator::builder`].
/// All methods take `&self`; share the coordinator behind an `Arc` to serve
/// concurrent evaluations. Call [`CacheCoordinator::shutdown`] before the
/// invocation ends so background writes are not lost.
pub struct CacheCoordinator {
    policy: CachePolicy,
    tiers: TierSet,
    background: TaskTracker,
}

impl CacheCoordinator {
    /// Start building a coordinator for an already-resolved policy
    #[must_use]
    pub fn builder(policy: CachePolicy) -> CacheCoordinatorBuilder {
        CacheCoordinatorBuilder {
            policy,
            local: None,
            remote: None,
        }
    }

    /// A coordinator with both tiers disabled
    #[must_use]
    pub fn disabled() -> Self {
        Self::from_parts(CachePolicy::disabled(), None, None)
    }

    fn from_parts(policy: CachePolicy, local: Option<TierHandle>, remote: Option<TierHandle>) -> Self {
        let local_writable = local.is_some() && policy.local_mode().can_write();
        let remote_writable = remote.is_some() && policy.remote_mode().can_write();
        Self {
            policy,
            tiers: TierSet {
                local,
                remote,
                local_writable,
                remote_writable,
                stats: Arc::new(CacheStats::new()),
            },
            background: TaskTracker::new(),
        }
    }

    /// The policy this coordinator routes with
    #[must_use]
    pub const fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    /// Whether any tier takes part in lookups
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.tiers.is_empty()
    }

    /// Fetch a cached parse result
    ///
    /// Returns `None` on a miss. Tier failures are treated as misses and
    /// logged; this never fails.
    pub async fn lookup(&self, key: &CacheKey) -> Option<CacheValue> {
        self.tiers.stats.record_lookup();

        if self.tiers.is_empty() {
            self.tiers.stats.record_miss();
            return None;
        }

        if let Some(local) = &self.tiers.local
            && let Some(value) = self.tiers.read(local, TierKind::Local, key).await
        {
            return Some(value);
        }

        if let Some(remote) = &self.tiers.remote
            && let Some(value) = self.tiers.read(remote, TierKind::Remote, key).await
        {
            self.spawn_warmup(key, &value);
            return Some(value);
        }

        self.tiers.stats.record_miss();
        None
    }

    /// Copy a remote hit into the local tier without delaying the caller
    fn spawn_warmup(&self, key: &CacheKey, value: &CacheValue) {
        let Some(local) = self.tiers.writable(TierKind::Local).cloned() else {
            return;
        };
        if self.background.is_closed() {
            debug!(key = %key, "Coordinator shut down, skipping local warm-up");
            return;
        }

        let tiers = self.tiers.clone();
        let key = key.clone();
        let value = value.clone();
        self.background.spawn(async move {
            let ok = tiers.write(&local, TierKind::Local, &key, value).await;
            tiers.stats.record_warmup(ok);
            if ok {
                debug!(key = %key, "Warmed local parser cache from remote hit");
            }
        });
    }

    /// Store a parse result in every writable tier
    ///
    /// Both tiers are written concurrently and independently. Failures are
    /// logged, never returned.
    pub async fn store(&self, key: &CacheKey, value: CacheValue) {
        if self.tiers.is_empty() {
            return;
        }
        self.tiers.store(key, value).await;
    }

    /// Store in the background
    ///
    /// The write is tracked and awaited by [`CacheCoordinator::shutdown`].
    /// Once shutdown has begun, background stores are skipped; use
    /// [`CacheCoordinator::store`] instead.
    pub fn spawn_store(&self, key: CacheKey, value: CacheValue) {
        if self.tiers.writable(TierKind::Local).is_none()
            && self.tiers.writable(TierKind::Remote).is_none()
        {
            return;
        }
        if self.background.is_closed() {
            debug!(key = %key, "Coordinator shut down, skipping background store");
            return;
        }
        let tiers = self.tiers.clone();
        self.background.spawn(async move {
            tiers.store(&key, value).await;
        });
    }

    /// Number of background writes still running
    #[must_use]
    pub fn pending_writes(&self) -> usize {
        self.background.len()
    }

    /// Wait for every background write to finish
    ///
    /// After shutdown, lookups and `store` keep working but no new warm-up
    /// writes or background stores are started.
    pub async fn shutdown(&self) {
        self.background.close();
        let pending = self.background.len();
        if pending > 0 {
            debug!(pending, "Waiting for background parser cache writes");
        }
        self.background.wait().await;
        info!(stats = ?self.stats(), "Parser cache coordinator shut down");
    }

    /// Counters for telemetry
    #[must_use]
    pub fn stats(&self) -> CacheStatsSnapshot {
        self.tiers.stats.snapshot()
    }
}

impl Drop for CacheCoordinator {
    fn drop(&mut self) {
        let pending = self.background.len();
        if pending > 0 {
            warn!(
                pending,
                "Parser cache coordinator dropped with background writes still running; call shutdown() first"
            );
        }
    }
}

/// Builder for [`CacheCoordinator`]
pub struct CacheCoordinatorBuilder {
    policy: CachePolicy,
    local: Option<TierHandle>,
    remote: Option<TierHandle>,
}

impl CacheCoordinatorBuilder {
    /// Local tier client
    #[must_use]
    pub fn local<C: TierClient + 'static>(mut self, client: C) -> Self {
        self.local = Some(Arc::new(client));
        self
    }

    /// Local tier client that must not be called concurrently
    #[must_use]
    pub fn local_serialized<C: TierClient + 'static>(self, client: C) -> Self {
        self.local(SerializedTier::new(client))
    }

    /// Remote tier client
    #[must_use]
    pub fn remote<C: TierClient + 'static>(mut self, client: C) -> Self {
        self.remote = Some(Arc::new(client));
        self
    }

    /// Remote tier client that must not be called concurrently
    #[must_use]
    pub fn remote_serialized<C: TierClient + 'static>(self, client: C) -> Self {
        self.remote(SerializedTier::new(client))
    }

    /// Finish construction
    ///
    /// Clients for disabled tiers are dropped unused.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the policy enables a tier but no
    /// client was supplied for it, or a client serves the wrong tier.
    pub fn build(self) -> Result<CacheCoordinator> {
        let local = select_client(TierKind::Local, self.policy.is_local_enabled(), self.local)?;
        let remote = select_client(TierKind::Remote, self.policy.is_remote_enabled(), self.remote)?;

        let coordinator = CacheCoordinator::from_parts(self.policy, local, remote);
        info!(
            local_mode = %coordinator.policy.local_mode(),
            remote_mode = %coordinator.policy.remote_mode(),
            local_root = ?coordinator.policy.local_cache_root(),
            "Parser cache coordinator ready"
        );
        Ok(coordinator)
    }
}

fn select_client(
    tier: TierKind,
    enabled: bool,
    client: Option<TierHandle>,
) -> Result<Option<TierHandle>> {
    match (enabled, client) {
        (false, Some(_)) => {
            debug!(tier = %tier, "Tier disabled by policy, ignoring supplied client");
            Ok(None)
        }
        (false, None) => Ok(None),
        (true, None) => Err(Error::configuration(format!(
            "{tier} parser cache is enabled but no {tier} tier client was supplied"
        ))),
        (true, Some(client)) if client.kind() != tier => Err(Error::configuration(format!(
            "{tier} parser cache was given a {} tier client",
            client.kind()
        ))),
        (true, Some(client)) => Ok(Some(client)),
    }
}
