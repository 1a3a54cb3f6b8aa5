//! Configuration surface consumed by the parse cache
//!
//! The build tool owns configuration loading. This module only names the
//! options the parse cache reads and provides [`ConfigSnapshot`], an
//! immutable in-memory source that can also be parsed from a TOML document
//! whose top-level tables are sections:
//!
//! ```toml
//! [parser]
//! dir = "parser-cache"
//! dir_mode = "readwrite"
//!
//! [manifestservice]
//! hybrid_thrift_endpoint = "manifest.example.com:9090"
//! remote_parser_caching_access_mode = "readonly"
//! ```

use crate::{Error, Result};
use std::collections::BTreeMap;
use std::path::Path;

/// Section holding the local tier options
pub const PARSER_SECTION: &str = "parser";
/// Local cache directory (empty = default output directory, absent = local tier disabled)
pub const LOCAL_DIR_KEY: &str = "dir";
/// Local tier access mode
pub const LOCAL_MODE_KEY: &str = "dir_mode";

/// Section holding the remote tier options
pub const MANIFEST_SERVICE_SECTION: &str = "manifestservice";
/// Remote service endpoint (absent = remote tier forced off)
pub const REMOTE_ENDPOINT_KEY: &str = "hybrid_thrift_endpoint";
/// Remote tier access mode
pub const REMOTE_MODE_KEY: &str = "remote_parser_caching_access_mode";

/// Mode used when a mode option is absent
pub const DEFAULT_MODE_VALUE: &str = "NONE";

/// A read-only view of build configuration keyed by (section, key)
pub trait ConfigSource: Send + Sync {
    /// Look up a raw option value
    fn value(&self, section: &str, key: &str) -> Option<String>;
}

impl<T: ConfigSource + ?Sized> ConfigSource for &T {
    fn value(&self, section: &str, key: &str) -> Option<String> {
        (**self).value(section, key)
    }
}

impl<T: ConfigSource + ?Sized> ConfigSource for std::sync::Arc<T> {
    fn value(&self, section: &str, key: &str) -> Option<String> {
        (**self).value(section, key)
    }
}

/// Immutable snapshot of configuration values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSnapshot {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl ConfigSnapshot {
    /// An empty snapshot: every option is absent
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Start building a snapshot programmatically
    #[must_use]
    pub fn builder() -> ConfigSnapshotBuilder {
        ConfigSnapshotBuilder::default()
    }

    /// Parse a snapshot from a TOML document
    ///
    /// Top-level tables become sections. String values are taken verbatim;
    /// integers, floats and booleans are stringified.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] for malformed TOML, top-level scalars,
    /// or nested tables and arrays inside a section.
    pub fn from_toml_str(document: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(document)
            .map_err(|e| Error::serialization(format!("Failed to parse configuration: {e}")))?;

        let mut sections = BTreeMap::new();
        for (section, body) in table {
            let toml::Value::Table(options) = body else {
                return Err(Error::serialization(format!(
                    "Top-level key '{section}' must be a table"
                )));
            };
            let mut values = BTreeMap::new();
            for (key, value) in options {
                let raw = match value {
                    toml::Value::String(s) => s,
                    toml::Value::Integer(i) => i.to_string(),
                    toml::Value::Float(f) => f.to_string(),
                    toml::Value::Boolean(b) => b.to_string(),
                    other => {
                        return Err(Error::serialization(format!(
                            "Option {section}.{key} must be a scalar, found {}",
                            other.type_str()
                        )));
                    }
                };
                values.insert(key, raw);
            }
            sections.insert(section, values);
        }

        Ok(Self { sections })
    }

    /// Load a snapshot from a TOML file
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, or the errors of
    /// [`ConfigSnapshot::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| Error::io(e, path, "read"))?;
        Self::from_toml_str(&contents)
    }

    /// Whether the snapshot holds no options
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.values().all(BTreeMap::is_empty)
    }
}

impl ConfigSource for ConfigSnapshot {
    fn value(&self, section: &str, key: &str) -> Option<String> {
        self.sections
            .get(section)
            .and_then(|options| options.get(key))
            .cloned()
    }
}

/// Builder for [`ConfigSnapshot`]
#[derive(Debug, Default)]
pub struct ConfigSnapshotBuilder {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl ConfigSnapshotBuilder {
    /// Set an option, replacing any previous value
    #[must_use]
    pub fn set(
        mut self,
        section: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.sections
            .entry(section.into())
            .or_default()
            .insert(key.into(), value.into());
        self
    }

    /// Freeze the snapshot
    #[must_use]
    pub fn build(self) -> ConfigSnapshot {
        ConfigSnapshot {
            sections: self.sections,
        }
    }
}
