//! Policy layer for the tiered build-file parse cache
//!
//! Instead of re-parsing every build file on every invocation, parse results
//! can be fetched from a cache. The cache has two independently configured
//! tiers:
//! - a local, directory-backed tier (`parser.dir`, `parser.dir_mode`)
//! - a remote, service-backed tier (`manifestservice.hybrid_thrift_endpoint`,
//!   `manifestservice.remote_parser_caching_access_mode`)
//!
//! This crate resolves, from a configuration snapshot, whether each tier is
//! enabled and in which [`AccessMode`], and defines the [`TierClient`]
//! contract both tiers implement. Routing across the tiers lives in the
//! `parsecache` crate.
//!
//! # Example
//!
//! ```rust
//! use parsecache_core::{AccessMode, CachePolicy, ConfigSnapshot, ProjectPaths};
//!
//! let config = ConfigSnapshot::builder()
//!     .set("parser", "dir", "parser-cache")
//!     .set("parser", "dir_mode", "readwrite")
//!     .build();
//! let policy = CachePolicy::resolve(&config, &ProjectPaths::new("/repo"));
//!
//! assert_eq!(policy.local_mode(), AccessMode::ReadWrite);
//! assert!(!policy.is_remote_enabled());
//! ```

mod error;

pub mod config;
pub mod mode;
pub mod paths;
pub mod policy;
pub mod tier;

pub use config::{ConfigSnapshot, ConfigSnapshotBuilder, ConfigSource};
pub use error::{Error, Result};
pub use mode::AccessMode;
pub use paths::{PathResolver, ProjectPaths};
pub use policy::{
    CachePolicy, CachePolicyResolver, LocalTierPolicy, RemoteTierPolicy,
    resolve_local_tier_policy, resolve_remote_tier_policy,
};
pub use tier::{CacheKey, CacheValue, TierClient, TierKind};
