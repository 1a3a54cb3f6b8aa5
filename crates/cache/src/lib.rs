//! Tiered cache for build-file parse results
//!
//! This crate provides the runtime side of the parse cache:
//! - [`CacheCoordinator`]: routes `lookup`/`store` across the local and remote tiers
//! - [`LocalDirTier`]: the directory-backed local tier
//! - [`SerializedTier`]: per-tier serialization for clients that are not concurrency-safe
//! - [`CacheStats`]: hit/miss/failure counters for telemetry
//!
//! Policy resolution and the tier contract live in `parsecache-core` and are
//! re-exported here.
//!
//! # Usage
//!
//! ```rust,no_run
//! use parsecache::{CacheCoordinator, CacheKey, CachePolicy, ConfigSnapshot, LocalDirTier, ProjectPaths};
//!
//! # async fn run() -> parsecache::Result<()> {
//! let config = ConfigSnapshot::load(".parsecache.toml")?;
//! let policy = CachePolicy::resolve(&config, &ProjectPaths::new("/repo"));
//!
//! let mut builder = CacheCoordinator::builder(policy.clone());
//! if let Some(root) = policy.local_cache_root() {
//!     builder = builder.local(LocalDirTier::new(root));
//! }
//! let coordinator = builder.build()?;
//!
//! let key = CacheKey::from("fingerprint-of-BUCK");
//! if coordinator.lookup(&key).await.is_none() {
//!     coordinator.store(&key, b"serialized parse result".as_slice().into()).await;
//! }
//! coordinator.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod coordinator;
pub mod local;
pub mod serialized;
pub mod stats;

pub use coordinator::{CacheCoordinator, CacheCoordinatorBuilder};
pub use local::LocalDirTier;
pub use serialized::SerializedTier;
pub use stats::{CacheStats, CacheStatsSnapshot, TierStatsSnapshot};

pub use parsecache_core::{
    AccessMode, CacheKey, CachePolicy, CachePolicyResolver, CacheValue, ConfigSnapshot,
    ConfigSource, Error, LocalTierPolicy, PathResolver, ProjectPaths, RemoteTierPolicy, Result,
    TierClient, TierKind,
};
pub use parsecache_core::paths::DEFAULT_OUTPUT_DIR;
