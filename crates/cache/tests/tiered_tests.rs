//! End-to-end tests: directory tier on disk plus remote tier over an
//! in-memory manifest service

use async_trait::async_trait;
use bytes::Bytes;
use parsecache::{
    CacheCoordinator, CacheKey, CachePolicy, CacheValue, ConfigSnapshot, LocalDirTier,
    ProjectPaths,
};
use parsecache_remote::{RemoteConfig, RemoteError, RemoteTier, RemoteTransport, RetryConfig};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

#[derive(Default)]
struct MemoryService {
    entries: Mutex<HashMap<String, Bytes>>,
    down: AtomicBool,
    puts: AtomicUsize,
}

impl MemoryService {
    fn seed(&self, key: &str, value: &'static str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), Bytes::from_static(value.as_bytes()));
    }

    fn has(&self, key: &str) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }
}

#[async_trait]
impl RemoteTransport for MemoryService {
    async fn get(&self, key: &str) -> parsecache_remote::Result<Option<Bytes>> {
        if self.down.load(Ordering::SeqCst) {
            return Err(RemoteError::connection_failed("mem://manifest", "refused"));
        }
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn put(&self, key: &str, value: Bytes) -> parsecache_remote::Result<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.down.load(Ordering::SeqCst) {
            return Err(RemoteError::connection_failed("mem://manifest", "refused"));
        }
        self.entries.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    fn endpoint(&self) -> &str {
        "mem://manifest"
    }
}

fn fast_remote_config() -> RemoteConfig {
    RemoteConfig {
        timeout_ms: 500,
        retry: RetryConfig {
            max_attempts: 2,
            initial_backoff_ms: 1,
            max_backoff_ms: 5,
            backoff_multiplier: 2.0,
        },
    }
}

fn setup(
    tmp: &TempDir,
    local_mode: &str,
    remote_mode: &str,
) -> (CacheCoordinator, Arc<LocalDirTier>, Arc<MemoryService>) {
    let config = ConfigSnapshot::builder()
        .set("parser", "dir", "parser-cache")
        .set("parser", "dir_mode", local_mode)
        .set("manifestservice", "hybrid_thrift_endpoint", "mem://manifest")
        .set("manifestservice", "remote_parser_caching_access_mode", remote_mode)
        .build();
    let policy = CachePolicy::resolve(&config, &ProjectPaths::new(tmp.path()));

    let local = Arc::new(LocalDirTier::new(tmp.path().join("buck-out/parser-cache")));
    let service = Arc::new(MemoryService::default());
    let coordinator = CacheCoordinator::builder(policy)
        .local(local.clone())
        .remote(RemoteTier::new(service.clone(), fast_remote_config()))
        .build()
        .unwrap();
    (coordinator, local, service)
}

#[tokio::test]
async fn test_remote_hit_lands_on_disk() {
    let tmp = TempDir::new().unwrap();
    let (cache, local, service) = setup(&tmp, "READWRITE", "READONLY");
    service.seed("//lib:BUCK", "remote manifest");
    let key = CacheKey::from("//lib:BUCK");

    assert_eq!(
        cache.lookup(&key).await,
        Some(CacheValue::from("remote manifest"))
    );
    cache.shutdown().await;

    assert!(local.contains(&key).await);
    let on_disk = tokio::fs::read(local.entry_path(&key)).await.unwrap();
    assert_eq!(on_disk, b"remote manifest");
    assert_eq!(service.puts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_second_lookup_served_locally() {
    let tmp = TempDir::new().unwrap();
    let (cache, _local, service) = setup(&tmp, "readwrite", "readonly");
    service.seed("k", "v");
    let key = CacheKey::from("k");

    let _ = cache.lookup(&key).await;
    cache.shutdown().await;
    service.down.store(true, Ordering::SeqCst);

    assert_eq!(cache.lookup(&key).await, Some(CacheValue::from("v")));
    let stats = cache.stats();
    assert_eq!(stats.local.hits, 1);
    assert_eq!(stats.remote.hits, 1);
    assert_eq!(stats.remote.read_errors, 0);
}

#[tokio::test]
async fn test_store_reaches_both_tiers() {
    let tmp = TempDir::new().unwrap();
    let (cache, local, service) = setup(&tmp, "READWRITE", "READWRITE");
    let key = CacheKey::from("//app:BUCK");

    cache.store(&key, CacheValue::from(vec![1u8, 2, 3])).await;

    assert!(local.contains(&key).await);
    assert!(service.has("//app:BUCK"));
}

#[tokio::test]
async fn test_service_outage_is_a_miss() {
    let tmp = TempDir::new().unwrap();
    let (cache, local, service) = setup(&tmp, "READWRITE", "READWRITE");
    service.down.store(true, Ordering::SeqCst);
    let key = CacheKey::from("k");

    assert_eq!(cache.lookup(&key).await, None);
    cache.store(&key, CacheValue::from("v")).await;

    assert!(local.contains(&key).await);
    assert_eq!(service.puts.load(Ordering::SeqCst), 2);
    let stats = cache.stats();
    assert_eq!(stats.remote.read_errors, 1);
    assert_eq!(stats.remote.write_failures, 1);
    assert_eq!(stats.local.writes, 1);
}

#[tokio::test]
async fn test_missing_endpoint_never_calls_service() {
    let tmp = TempDir::new().unwrap();
    let config = ConfigSnapshot::builder()
        .set("manifestservice", "remote_parser_caching_access_mode", "READWRITE")
        .build();
    let policy = CachePolicy::resolve(&config, &ProjectPaths::new(tmp.path()));
    let service = Arc::new(MemoryService::default());
    service.seed("k", "v");

    let cache = CacheCoordinator::builder(policy)
        .remote(RemoteTier::new(service.clone(), fast_remote_config()))
        .build()
        .unwrap();

    assert_eq!(cache.lookup(&CacheKey::from("k")).await, None);
    cache.store(&CacheKey::from("k2"), CacheValue::from("v")).await;
    assert_eq!(service.puts.load(Ordering::SeqCst), 0);
}
