//! Error types for the parse cache

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use crate::tier::TierKind;
use miette::Diagnostic;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Error type for parse cache operations
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// A configuration option is present but its value is unusable
    #[error("Unusable {}'{value}'", option_label(section.as_deref(), key.as_deref()))]
    #[diagnostic(
        code(parsecache::config::invalid_value),
        help("Valid access modes are NONE, READONLY and READWRITE (case-insensitive)")
    )]
    InvalidConfigValue {
        /// Configuration section holding the option, when known
        section: Option<String>,
        /// Option name within the section, when known
        key: Option<String>,
        /// The raw value that failed to parse
        value: String,
    },

    /// Configuration or API-usage error
    #[error("Parse cache configuration error: {message}")]
    #[diagnostic(code(parsecache::config))]
    Configuration {
        /// Error message describing the configuration issue
        message: String,
    },

    /// A cache tier could not be reached or failed mid-operation
    #[error("{tier} cache tier unavailable during {operation}: {message}")]
    #[diagnostic(
        code(parsecache::tier::unavailable),
        help("The build continues without this tier; check the tier's storage or service health")
    )]
    TierUnavailable {
        /// Which tier failed
        tier: TierKind,
        /// Operation that failed (e.g., "get", "put")
        operation: String,
        /// Description of the underlying failure
        message: String,
    },

    /// A cache tier did not answer within its deadline
    #[error("{tier} cache tier timed out during {operation} after {}ms", timeout.as_millis())]
    #[diagnostic(code(parsecache::tier::timeout))]
    TierTimeout {
        /// Which tier timed out
        tier: TierKind,
        /// Operation that timed out
        operation: String,
        /// Deadline that was exceeded
        timeout: Duration,
    },

    /// I/O error while reading configuration or cache entries
    #[error("I/O {operation} failed{}", path.as_ref().map_or(String::new(), |p| format!(": {}", p.display())))]
    #[diagnostic(
        code(parsecache::io),
        help("Check file permissions and ensure the path exists")
    )]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// Path that caused the error, if available
        path: Option<Box<Path>>,
        /// Operation that failed (e.g., "read", "write", "rename")
        operation: String,
    },

    /// Configuration document could not be parsed
    #[error("Serialization error: {message}")]
    #[diagnostic(code(parsecache::serialization))]
    Serialization {
        /// Error message describing the serialization issue
        message: String,
    },
}

impl Error {
    /// Create an invalid configuration value error
    #[must_use]
    pub fn invalid_config_value(
        section: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidConfigValue {
            section: Some(section.into()),
            key: Some(key.into()),
            value: value.into(),
        }
    }

    /// Create an invalid access mode error for a value not yet tied to an option
    #[must_use]
    pub fn invalid_mode(value: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            section: None,
            key: None,
            value: value.into(),
        }
    }

    /// Attach the option an [`Error::InvalidConfigValue`] was read from
    ///
    /// Other variants are returned unchanged.
    #[must_use]
    pub fn for_option(self, section: impl Into<String>, key: impl Into<String>) -> Self {
        match self {
            Self::InvalidConfigValue { value, .. } => {
                Self::invalid_config_value(section, key, value)
            }
            other => other,
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration {
            message: msg.into(),
        }
    }

    /// Create a tier unavailable error
    #[must_use]
    pub fn tier_unavailable(
        tier: TierKind,
        operation: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::TierUnavailable {
            tier,
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a tier timeout error
    #[must_use]
    pub fn tier_timeout(tier: TierKind, operation: impl Into<String>, timeout: Duration) -> Self {
        Self::TierTimeout {
            tier,
            operation: operation.into(),
            timeout,
        }
    }

    /// Create an I/O error with path context
    #[must_use]
    pub fn io(
        source: std::io::Error,
        path: impl AsRef<Path>,
        operation: impl Into<String>,
    ) -> Self {
        Self::Io {
            source,
            path: Some(path.as_ref().into()),
            operation: operation.into(),
        }
    }

    /// Create a serialization error
    #[must_use]
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
        }
    }

    /// Whether this error came from talking to a tier rather than from configuration
    #[must_use]
    pub const fn is_tier_failure(&self) -> bool {
        matches!(self, Self::TierUnavailable { .. } | Self::TierTimeout { .. })
    }
}

fn option_label(section: Option<&str>, key: Option<&str>) -> String {
    match (section, key) {
        (Some(section), Some(key)) => format!("{section}.{key}: "),
        _ => "access mode ".to_string(),
    }
}

/// Result type for parse cache operations
pub type Result<T> = std::result::Result<T, Error>;
