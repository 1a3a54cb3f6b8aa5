//! Tier policy resolution
//!
//! Turns raw configuration into two immutable policy records, one per tier.
//! Absent options mean "disabled" and are never an error. A present but
//! unparseable mode string is logged and degrades that tier to
//! [`AccessMode::Disabled`]; it never aborts the build.

use crate::config::{
    ConfigSource, DEFAULT_MODE_VALUE, LOCAL_DIR_KEY, LOCAL_MODE_KEY, MANIFEST_SERVICE_SECTION,
    PARSER_SECTION, REMOTE_ENDPOINT_KEY, REMOTE_MODE_KEY,
};
use crate::mode::AccessMode;
use crate::paths::PathResolver;
use crate::{Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, error};

/// Policy for the directory-backed tier
///
/// Invariant: when the mode is not `Disabled`, `cache_root` is present and absolute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalTierPolicy {
    cache_root: Option<PathBuf>,
    mode: AccessMode,
}

impl LocalTierPolicy {
    /// The local tier is not configured
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            cache_root: None,
            mode: AccessMode::Disabled,
        }
    }

    /// An enabled local tier rooted at `cache_root`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `mode` is `Disabled` or the root is
    /// not absolute.
    pub fn enabled(cache_root: impl Into<PathBuf>, mode: AccessMode) -> Result<Self> {
        let cache_root = cache_root.into();
        if !mode.is_enabled() {
            return Err(Error::configuration(
                "an enabled local tier needs a READONLY or READWRITE mode",
            ));
        }
        if !cache_root.is_absolute() {
            return Err(Error::configuration(format!(
                "local cache root must be absolute, got {}",
                cache_root.display()
            )));
        }
        Ok(Self {
            cache_root: Some(cache_root),
            mode,
        })
    }

    /// Resolved cache directory, present only when the tier is enabled
    #[must_use]
    pub fn cache_root(&self) -> Option<&Path> {
        self.cache_root.as_deref()
    }

    /// Access mode
    #[must_use]
    pub const fn mode(&self) -> AccessMode {
        self.mode
    }

    /// Whether the tier takes part in lookups
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.cache_root.is_some() && self.mode.is_enabled()
    }
}

impl Default for LocalTierPolicy {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Policy for the service-backed tier
///
/// Invariant: `Disabled` whenever no endpoint is configured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RemoteTierPolicy {
    mode: AccessMode,
}

impl RemoteTierPolicy {
    /// A remote tier with the given mode
    #[must_use]
    pub const fn new(mode: AccessMode) -> Self {
        Self { mode }
    }

    /// The remote tier is not configured
    #[must_use]
    pub const fn disabled() -> Self {
        Self::new(AccessMode::Disabled)
    }

    /// Access mode
    #[must_use]
    pub const fn mode(&self) -> AccessMode {
        self.mode
    }

    /// Whether the tier takes part in lookups
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.mode.is_enabled()
    }
}

/// Resolved policy for both tiers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CachePolicy {
    local: LocalTierPolicy,
    remote: RemoteTierPolicy,
}

impl CachePolicy {
    /// Pair two tier policies
    #[must_use]
    pub const fn new(local: LocalTierPolicy, remote: RemoteTierPolicy) -> Self {
        Self { local, remote }
    }

    /// Both tiers disabled
    #[must_use]
    pub const fn disabled() -> Self {
        Self::new(LocalTierPolicy::disabled(), RemoteTierPolicy::disabled())
    }

    /// Resolve both tiers from a configuration snapshot in one shot
    #[must_use]
    pub fn resolve(config: &impl ConfigSource, paths: &impl PathResolver) -> Self {
        Self::new(
            resolve_local_tier_policy(config, paths),
            resolve_remote_tier_policy(config),
        )
    }

    /// Local tier policy
    #[must_use]
    pub const fn local(&self) -> &LocalTierPolicy {
        &self.local
    }

    /// Remote tier policy
    #[must_use]
    pub const fn remote(&self) -> &RemoteTierPolicy {
        &self.remote
    }

    /// Whether the local tier is enabled
    #[must_use]
    pub fn is_local_enabled(&self) -> bool {
        self.local.is_enabled()
    }

    /// Whether the remote tier is enabled
    #[must_use]
    pub const fn is_remote_enabled(&self) -> bool {
        self.remote.is_enabled()
    }

    /// Whether either tier is enabled
    #[must_use]
    pub fn is_any_enabled(&self) -> bool {
        self.is_local_enabled() || self.is_remote_enabled()
    }

    /// Alias of [`CachePolicy::is_any_enabled`] for telemetry consumers
    #[must_use]
    pub fn is_parser_cache_enabled(&self) -> bool {
        self.is_any_enabled()
    }

    /// Local tier mode
    #[must_use]
    pub const fn local_mode(&self) -> AccessMode {
        self.local.mode()
    }

    /// Remote tier mode
    #[must_use]
    pub const fn remote_mode(&self) -> AccessMode {
        self.remote.mode()
    }

    /// Local cache directory, if the local tier is enabled
    #[must_use]
    pub fn local_cache_root(&self) -> Option<&Path> {
        self.local.cache_root()
    }
}

/// Read a mode option, degrading to `Disabled` on a malformed value
fn read_mode(config: &impl ConfigSource, section: &str, key: &str, tier: &str) -> AccessMode {
    let raw = config
        .value(section, key)
        .unwrap_or_else(|| DEFAULT_MODE_VALUE.to_string());
    match AccessMode::parse(&raw) {
        Ok(mode) => mode,
        Err(e) => {
            let err = e.for_option(section, key);
            error!(tier, error = %err, "Could not get access mode for parser cache tier, disabling it");
            AccessMode::Disabled
        }
    }
}

/// Resolve the local tier policy
///
/// Absent `parser.dir` disables the tier. A `Disabled` mode yields no cache
/// root even when a directory is configured.
pub fn resolve_local_tier_policy(
    config: &impl ConfigSource,
    paths: &impl PathResolver,
) -> LocalTierPolicy {
    let Some(dir) = config.value(PARSER_SECTION, LOCAL_DIR_KEY) else {
        debug!("No parser.dir configured, local parser cache disabled");
        return LocalTierPolicy::disabled();
    };

    let mode = read_mode(config, PARSER_SECTION, LOCAL_MODE_KEY, "local");
    if !mode.is_enabled() {
        return LocalTierPolicy::disabled();
    }

    let cache_root = paths.resolve(&dir);
    // A custom resolver returning a relative root disables the tier.
    match LocalTierPolicy::enabled(cache_root, mode) {
        Ok(policy) => {
            debug!(mode = %mode, root = ?policy.cache_root(), "Local parser cache enabled");
            policy
        }
        Err(e) => {
            error!(error = %e, "Could not resolve local parser cache directory, disabling it");
            LocalTierPolicy::disabled()
        }
    }
}

/// Resolve the remote tier policy
///
/// Without `manifestservice.hybrid_thrift_endpoint` the tier is disabled no
/// matter what mode is configured.
pub fn resolve_remote_tier_policy(config: &impl ConfigSource) -> RemoteTierPolicy {
    if config
        .value(MANIFEST_SERVICE_SECTION, REMOTE_ENDPOINT_KEY)
        .is_none()
    {
        debug!("No manifest service endpoint configured, remote parser cache disabled");
        return RemoteTierPolicy::disabled();
    }

    let mode = read_mode(config, MANIFEST_SERVICE_SECTION, REMOTE_MODE_KEY, "remote");
    debug!(mode = %mode, "Remote parser cache mode resolved");
    RemoteTierPolicy::new(mode)
}

/// Memoizing resolver bound to one configuration snapshot
///
/// Each tier policy is computed at most once, on first use, and shared
/// read-only afterwards. A different snapshot needs a new resolver.
#[derive(Debug)]
pub struct CachePolicyResolver<C, P> {
    config: C,
    paths: P,
    local: OnceLock<LocalTierPolicy>,
    remote: OnceLock<RemoteTierPolicy>,
}

impl<C: ConfigSource, P: PathResolver> CachePolicyResolver<C, P> {
    /// Bind a resolver to a configuration snapshot and project layout
    pub const fn new(config: C, paths: P) -> Self {
        Self {
            config,
            paths,
            local: OnceLock::new(),
            remote: OnceLock::new(),
        }
    }

    /// The configuration snapshot this resolver reads
    pub const fn config(&self) -> &C {
        &self.config
    }

    /// Local tier policy, resolved on first call
    pub fn local(&self) -> &LocalTierPolicy {
        self.local
            .get_or_init(|| resolve_local_tier_policy(&self.config, &self.paths))
    }

    /// Remote tier policy, resolved on first call
    pub fn remote(&self) -> &RemoteTierPolicy {
        self.remote
            .get_or_init(|| resolve_remote_tier_policy(&self.config))
    }

    /// Both tier policies as one record
    pub fn policy(&self) -> CachePolicy {
        CachePolicy::new(self.local().clone(), *self.remote())
    }

    /// Whether the local tier is enabled
    pub fn is_local_enabled(&self) -> bool {
        self.local().is_enabled()
    }

    /// Whether the remote tier is enabled
    pub fn is_remote_enabled(&self) -> bool {
        self.remote().is_enabled()
    }

    /// Whether either tier is enabled
    pub fn is_parser_cache_enabled(&self) -> bool {
        self.is_local_enabled() || self.is_remote_enabled()
    }

    /// Local tier mode
    pub fn local_mode(&self) -> AccessMode {
        self.local().mode()
    }

    /// Remote tier mode
    pub fn remote_mode(&self) -> AccessMode {
        self.remote().mode()
    }

    /// Local cache directory, if the local tier is enabled
    pub fn local_cache_root(&self) -> Option<&Path> {
        self.local().cache_root()
    }
}
