//! Per-tier access modes

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a cache tier may be used
///
/// Variants are ordered by capability: `Disabled < ReadOnly < ReadWrite`.
/// In configuration the modes are spelled `NONE`, `READONLY` and `READWRITE`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum AccessMode {
    /// The tier is skipped entirely
    #[default]
    #[serde(rename = "NONE")]
    Disabled,
    /// The tier may be read but never written
    #[serde(rename = "READONLY")]
    ReadOnly,
    /// The tier may be read and written
    #[serde(rename = "READWRITE")]
    ReadWrite,
}

impl AccessMode {
    /// Parse a raw configuration value, trimmed and case-insensitive
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfigValue`] when the value names none of the
    /// modes. The error carries no option name; callers that know it attach
    /// it with [`Error::for_option`].
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "NONE" => Ok(Self::Disabled),
            "READONLY" => Ok(Self::ReadOnly),
            "READWRITE" => Ok(Self::ReadWrite),
            _ => Err(Error::invalid_mode(raw)),
        }
    }

    /// Canonical configuration spelling
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Disabled => "NONE",
            Self::ReadOnly => "READONLY",
            Self::ReadWrite => "READWRITE",
        }
    }

    /// Whether the tier takes part in lookups or stores at all
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }

    /// Whether the tier may be read
    #[must_use]
    pub const fn can_read(&self) -> bool {
        self.is_enabled()
    }

    /// Whether the tier may be written
    #[must_use]
    pub const fn can_write(&self) -> bool {
        matches!(self, Self::ReadWrite)
    }
}

impl FromStr for AccessMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive_and_trimmed() {
        assert_eq!(AccessMode::parse("none").unwrap(), AccessMode::Disabled);
        assert_eq!(AccessMode::parse("ReadOnly").unwrap(), AccessMode::ReadOnly);
        assert_eq!(
            AccessMode::parse("  readwrite\n").unwrap(),
            AccessMode::ReadWrite
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(AccessMode::parse("").is_err());
        assert!(AccessMode::parse("read_write").is_err());
        assert!(AccessMode::parse("WRITEONLY").is_err());
    }

    #[test]
    fn test_parse_error_is_invalid_config_value() {
        let err = AccessMode::parse("bogus").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidConfigValue {
                section: None,
                key: None,
                ref value,
            } if value == "bogus"
        ));

        let err = "sometimes".parse::<AccessMode>().unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue { .. }));
    }

    #[test]
    fn test_capability_order() {
        assert!(AccessMode::Disabled < AccessMode::ReadOnly);
        assert!(AccessMode::ReadOnly < AccessMode::ReadWrite);
        assert_eq!(AccessMode::default(), AccessMode::Disabled);
    }

    #[test]
    fn test_predicates() {
        assert!(!AccessMode::Disabled.can_read());
        assert!(!AccessMode::Disabled.can_write());
        assert!(AccessMode::ReadOnly.can_read());
        assert!(!AccessMode::ReadOnly.can_write());
        assert!(AccessMode::ReadWrite.can_read());
        assert!(AccessMode::ReadWrite.can_write());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for mode in [
            AccessMode::Disabled,
            AccessMode::ReadOnly,
            AccessMode::ReadWrite,
        ] {
            assert_eq!(mode.to_string().parse::<AccessMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_serde_uses_config_spelling() {
        let json = serde_json::to_string(&AccessMode::ReadOnly).unwrap();
        assert_eq!(json, "\"READONLY\"");
        let mode: AccessMode = serde_json::from_str("\"NONE\"").unwrap();
        assert_eq!(mode, AccessMode::Disabled);
    }
}
