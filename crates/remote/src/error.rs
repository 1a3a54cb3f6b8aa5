//! Error types for the remote tier

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use miette::Diagnostic;
use parsecache_core::TierKind;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while talking to the remote manifest service
#[derive(Error, Debug, Diagnostic)]
pub enum RemoteError {
    /// The service could not be reached
    #[error("Failed to connect to {endpoint}: {message}")]
    #[diagnostic(
        code(parsecache_remote::connection_failed),
        help("Check that the manifest service endpoint is reachable")
    )]
    ConnectionFailed {
        /// Endpoint that was dialled
        endpoint: String,
        /// Description of the connection failure
        message: String,
    },

    /// The connection failed mid-call
    #[error("Transport error during {operation}: {message}")]
    #[diagnostic(code(parsecache_remote::transport))]
    Transport {
        /// Operation that failed (e.g., "get", "put")
        operation: String,
        /// Description of the transport failure
        message: String,
    },

    /// The service answered but refused the call
    #[error("Service rejected {operation}: {message}")]
    #[diagnostic(code(parsecache_remote::rejected))]
    Rejected {
        /// Operation that was refused
        operation: String,
        /// Reason given by the service
        message: String,
    },

    /// A single attempt exceeded its deadline
    #[error("{operation} timed out after {}ms", timeout.as_millis())]
    #[diagnostic(code(parsecache_remote::timeout))]
    Timeout {
        /// Operation that timed out
        operation: String,
        /// Deadline that was exceeded
        timeout: Duration,
    },

    /// Every attempt failed with a transient error
    #[error("{operation} failed after {attempts} attempts: {last_error}")]
    #[diagnostic(code(parsecache_remote::retry_exhausted))]
    RetryExhausted {
        /// Operation that was retried
        operation: String,
        /// Attempts made, including the first
        attempts: usize,
        /// Message of the final failure
        last_error: String,
        /// Deadline of the final attempt, when that attempt timed out
        timeout: Option<Duration>,
    },

    /// Invalid remote tier setup
    #[error("Remote tier configuration error: {0}")]
    #[diagnostic(code(parsecache_remote::config))]
    ConfigError(String),
}

impl RemoteError {
    /// Whether another attempt might succeed
    ///
    /// Connection and transport failures and per-attempt timeouts are
    /// transient. A rejection or a configuration problem is not.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::Transport { .. } | Self::Timeout { .. }
        )
    }

    /// Create a connection failure error
    #[must_use]
    pub fn connection_failed(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create a transport error
    #[must_use]
    pub fn transport(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a rejection error
    #[must_use]
    pub fn rejected(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a per-attempt timeout error
    #[must_use]
    pub fn timeout(operation: impl Into<String>, timeout: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout,
        }
    }

    /// Create a retry exhausted error from the last failure
    ///
    /// Records the deadline when the last failure was a timeout.
    #[must_use]
    pub fn retry_exhausted(operation: impl Into<String>, attempts: usize, last: &Self) -> Self {
        let timeout = match last {
            Self::Timeout { timeout, .. } => Some(*timeout),
            _ => None,
        };
        Self::RetryExhausted {
            operation: operation.into(),
            attempts,
            last_error: last.to_string(),
            timeout,
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Convert into the tier-level error the coordinator understands
    ///
    /// A timeout, or retries that ended on a timeout, becomes
    /// [`parsecache_core::Error::TierTimeout`]; everything else is
    /// [`parsecache_core::Error::TierUnavailable`].
    pub fn into_tier_error(self, operation: &str) -> parsecache_core::Error {
        match self {
            Self::Timeout { timeout, .. }
            | Self::RetryExhausted {
                timeout: Some(timeout),
                ..
            } => parsecache_core::Error::tier_timeout(TierKind::Remote, operation, timeout),
            other => parsecache_core::Error::tier_unavailable(
                TierKind::Remote,
                operation,
                other.to_string(),
            ),
        }
    }
}

/// Result type for remote tier operations
pub type Result<T> = std::result::Result<T, RemoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_maps_to_tier_timeout() {
        let err = RemoteError::timeout("get", Duration::from_millis(50)).into_tier_error("get");
        assert!(matches!(
            err,
            parsecache_core::Error::TierTimeout {
                tier: TierKind::Remote,
                ..
            }
        ));
    }

    #[test]
    fn test_exhausted_timeouts_map_to_tier_timeout() {
        let last = RemoteError::timeout("put", Duration::from_millis(50));
        let err = RemoteError::retry_exhausted("put", 3, &last).into_tier_error("put");
        assert!(matches!(err, parsecache_core::Error::TierTimeout { .. }));
    }

    #[test]
    fn test_transient_classification() {
        assert!(RemoteError::connection_failed("tcp://x", "refused").is_transient());
        assert!(RemoteError::timeout("get", Duration::from_millis(1)).is_transient());
        assert!(!RemoteError::rejected("put", "too large").is_transient());
        assert!(!RemoteError::config_error("bad").is_transient());
        let last = RemoteError::transport("get", "reset");
        assert!(!RemoteError::retry_exhausted("get", 3, &last).is_transient());
    }

    #[test]
    fn test_transport_maps_to_tier_unavailable() {
        let err = RemoteError::transport("get", "connection reset").into_tier_error("get");
        assert!(matches!(
            err,
            parsecache_core::Error::TierUnavailable {
                tier: TierKind::Remote,
                ..
            }
        ));
        assert!(err.to_string().contains("connection reset"));
    }
}
