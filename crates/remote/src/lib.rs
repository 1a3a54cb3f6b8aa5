//! Remote manifest service tier for the parse cache
//!
//! This crate adapts a byte-level [`RemoteTransport`] (GET/PUT over a key,
//! implemented by the build tool's service client) into a
//! [`parsecache_core::TierClient`] with per-attempt timeouts and retry with
//! exponential backoff.

pub mod config;
pub mod error;
pub mod retry;
pub mod transport;

mod tier;

pub use config::{RemoteConfig, RetryConfig};
pub use error::{RemoteError, Result};
pub use tier::RemoteTier;
pub use transport::RemoteTransport;
