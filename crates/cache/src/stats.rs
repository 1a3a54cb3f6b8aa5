//! Parser cache counters
//!
//! Lock-free counters updated by the coordinator on every tier interaction.
//! Each increment is also emitted as a `debug!` event carrying a `metric`
//! field so log-based collectors can aggregate without polling.

use parsecache_core::TierKind;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one tier
#[derive(Debug, Default)]
struct TierCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    read_errors: AtomicU64,
    writes: AtomicU64,
    write_failures: AtomicU64,
}

impl TierCounters {
    fn snapshot(&self) -> TierStatsSnapshot {
        TierStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            read_errors: self.read_errors.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
        }
    }
}

/// Parser cache metrics collector
#[derive(Debug, Default)]
pub struct CacheStats {
    local: TierCounters,
    remote: TierCounters,
    lookups: AtomicU64,
    misses: AtomicU64,
    warmups: AtomicU64,
    warmup_failures: AtomicU64,
}

impl CacheStats {
    /// Create a new collector
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    const fn tier(&self, tier: TierKind) -> &TierCounters {
        match tier {
            TierKind::Local => &self.local,
            TierKind::Remote => &self.remote,
        }
    }

    pub(crate) fn record_lookup(&self) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_hit(&self, tier: TierKind) {
        self.tier(tier).hits.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(tier = %tier, metric = "parser_cache_hit_total", "Cache hit recorded");
    }

    pub(crate) fn record_tier_miss(&self, tier: TierKind) {
        self.tier(tier).misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(metric = "parser_cache_miss_total", "Cache miss recorded");
    }

    pub(crate) fn record_read_error(&self, tier: TierKind) {
        self.tier(tier).read_errors.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            tier = %tier,
            metric = "parser_cache_read_error_total",
            "Cache read error recorded"
        );
    }

    pub(crate) fn record_write(&self, tier: TierKind) {
        self.tier(tier).writes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_write_failure(&self, tier: TierKind) {
        self.tier(tier).write_failures.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            tier = %tier,
            metric = "parser_cache_write_failure_total",
            "Cache write failure recorded"
        );
    }

    pub(crate) fn record_warmup(&self, succeeded: bool) {
        self.warmups.fetch_add(1, Ordering::Relaxed);
        if !succeeded {
            self.warmup_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Point-in-time copy of all counters
    #[must_use]
    pub fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            lookups: self.lookups.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            warmups: self.warmups.load(Ordering::Relaxed),
            warmup_failures: self.warmup_failures.load(Ordering::Relaxed),
            local: self.local.snapshot(),
            remote: self.remote.snapshot(),
        }
    }
}

/// Counters for one tier at a point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierStatsSnapshot {
    /// Reads that returned an entry
    pub hits: u64,
    /// Reads that found nothing
    pub misses: u64,
    /// Reads that failed and were treated as misses
    pub read_errors: u64,
    /// Successful writes, warm-ups included
    pub writes: u64,
    /// Writes that failed and were dropped
    pub write_failures: u64,
}

/// All coordinator counters at a point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStatsSnapshot {
    /// Total `lookup` calls
    pub lookups: u64,
    /// Lookups no tier could satisfy
    pub misses: u64,
    /// Warm-up writes attempted into the local tier
    pub warmups: u64,
    /// Warm-up writes that failed
    pub warmup_failures: u64,
    /// Local tier counters
    pub local: TierStatsSnapshot,
    /// Remote tier counters
    pub remote: TierStatsSnapshot,
}

impl CacheStatsSnapshot {
    /// Lookups answered by some tier
    #[must_use]
    pub const fn hits(&self) -> u64 {
        self.local.hits + self.remote.hits
    }
}
