//! Tests for the remote tier client against a scripted transport

use async_trait::async_trait;
use bytes::Bytes;
use parsecache_core::{CacheKey, CacheValue, Error, TierClient, TierKind};
use parsecache_remote::{RemoteConfig, RemoteError, RemoteTier, RemoteTransport, RetryConfig};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// What the transport does on its next calls
#[derive(Clone, Copy)]
enum Behaviour {
    Normal,
    /// Fail this many calls with a transport error, then behave normally
    FailTimes(usize),
    /// Never answer within the client deadline
    Hang,
    /// Reject every call
    Reject,
}

struct ScriptedTransport {
    entries: Mutex<HashMap<String, Bytes>>,
    behaviour: Mutex<Behaviour>,
    gets: AtomicUsize,
    puts: AtomicUsize,
}

impl ScriptedTransport {
    fn new(behaviour: Behaviour) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            behaviour: Mutex::new(behaviour),
            gets: AtomicUsize::new(0),
            puts: AtomicUsize::new(0),
        }
    }

    fn seed(self, key: &str, value: &'static [u8]) -> Self {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), Bytes::from_static(value));
        self
    }

    async fn before_call(&self, operation: &str) -> Result<(), RemoteError> {
        let behaviour = *self.behaviour.lock().unwrap();
        match behaviour {
            Behaviour::Normal => Ok(()),
            Behaviour::FailTimes(0) => Ok(()),
            Behaviour::FailTimes(n) => {
                *self.behaviour.lock().unwrap() = Behaviour::FailTimes(n - 1);
                Err(RemoteError::transport(operation, "connection reset"))
            }
            Behaviour::Hang => {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            }
            Behaviour::Reject => Err(RemoteError::rejected(operation, "forbidden")),
        }
    }
}

#[async_trait]
impl RemoteTransport for ScriptedTransport {
    async fn get(&self, key: &str) -> parsecache_remote::Result<Option<Bytes>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.before_call("get").await?;
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn put(&self, key: &str, value: Bytes) -> parsecache_remote::Result<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.before_call("put").await?;
        self.entries.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    fn endpoint(&self) -> &str {
        "manifest.test:9090"
    }
}

fn fast_config(max_attempts: usize) -> RemoteConfig {
    RemoteConfig {
        timeout_ms: 50,
        retry: RetryConfig {
            max_attempts,
            initial_backoff_ms: 5,
            max_backoff_ms: 20,
            backoff_multiplier: 2.0,
        },
    }
}

#[tokio::test]
async fn test_get_hit_and_miss() {
    let tier = RemoteTier::new(
        ScriptedTransport::new(Behaviour::Normal).seed("k2", b"v2"),
        fast_config(3),
    );

    let hit = tier.get(&CacheKey::from("k2")).await.unwrap();
    assert_eq!(hit, Some(CacheValue::from("v2")));

    let miss = tier.get(&CacheKey::from("absent")).await.unwrap();
    assert_eq!(miss, None);
    assert_eq!(tier.kind(), TierKind::Remote);
}

#[tokio::test]
async fn test_put_then_get() {
    let tier = RemoteTier::new(ScriptedTransport::new(Behaviour::Normal), fast_config(3));
    let key = CacheKey::from("k1");

    tier.put(&key, CacheValue::from("v1")).await.unwrap();

    assert_eq!(tier.get(&key).await.unwrap(), Some(CacheValue::from("v1")));
    assert_eq!(tier.transport().puts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let tier = RemoteTier::new(
        ScriptedTransport::new(Behaviour::FailTimes(2)).seed("k", b"v"),
        fast_config(3),
    );

    let value = tier.get(&CacheKey::from("k")).await.unwrap();

    assert_eq!(value, Some(CacheValue::from("v")));
    assert_eq!(tier.transport().gets.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_exhausted_retries_report_tier_unavailable() {
    let tier = RemoteTier::new(
        ScriptedTransport::new(Behaviour::FailTimes(10)),
        fast_config(2),
    );

    let err = tier.get(&CacheKey::from("k")).await.unwrap_err();

    assert!(matches!(
        err,
        Error::TierUnavailable {
            tier: TierKind::Remote,
            ..
        }
    ));
    assert_eq!(tier.transport().gets.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_hanging_service_reports_timeout() {
    let tier = RemoteTier::new(ScriptedTransport::new(Behaviour::Hang), fast_config(2));

    let err = tier
        .put(&CacheKey::from("k"), CacheValue::from("v"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::TierTimeout {
            tier: TierKind::Remote,
            ..
        }
    ));
    assert_eq!(tier.transport().puts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_rejection_is_not_retried() {
    let tier = RemoteTier::new(ScriptedTransport::new(Behaviour::Reject), fast_config(3));

    let err = tier
        .put(&CacheKey::from("k"), CacheValue::from("v"))
        .await
        .unwrap_err();

    assert!(err.is_tier_failure());
    assert_eq!(tier.transport().puts.load(Ordering::SeqCst), 1);
}
