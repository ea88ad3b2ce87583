//! Argument reader policies (`[reader]` section)
//!
//! The defaults reproduce the lenient behaviour native functions have always
//! relied on: a string that does not parse as a number and a negative value
//! read into an unsigned target are both reported as warnings, and unread
//! trailing arguments are not checked.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What to do when a number is read from a string that does not parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericStringPolicy {
    /// Coerce anyway and queue a warning
    #[default]
    Warn,
    /// Record a "Bad argument" error
    Error,
}

/// What to do when a negative number is read into an unsigned target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignPolicy {
    /// Coerce anyway and queue a warning
    #[default]
    Warn,
    /// Record a "Bad argument" error
    Error,
    /// Coerce silently
    Ignore,
}

/// Reader configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReaderConfig {
    /// Policy for non-convertible numeric strings
    pub numeric_strings: NumericStringPolicy,

    /// Policy for negative values read into unsigned targets
    pub negative_unsigned: SignPolicy,

    /// Treat unread trailing arguments as an error in `has_errors`
    pub check_trailing: bool,
}

impl ReaderConfig {
    /// Configuration where every lenient path becomes an error
    pub fn strict() -> Self {
        Self {
            numeric_strings: NumericStringPolicy::Error,
            negative_unsigned: SignPolicy::Error,
            check_trailing: true,
        }
    }
}

impl fmt::Display for NumericStringPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericStringPolicy::Warn => write!(f, "warn"),
            NumericStringPolicy::Error => write!(f, "error"),
        }
    }
}

impl fmt::Display for SignPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignPolicy::Warn => write!(f, "warn"),
            SignPolicy::Error => write!(f, "error"),
            SignPolicy::Ignore => write!(f, "ignore"),
        }
    }
}

impl FromStr for NumericStringPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "warn" => Ok(NumericStringPolicy::Warn),
            "error" => Ok(NumericStringPolicy::Error),
            other => Err(ConfigError::InvalidValue {
                field: "reader.numeric_strings".to_string(),
                reason: format!("must be 'warn' or 'error', got '{}'", other),
            }),
        }
    }
}

impl FromStr for SignPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "warn" => Ok(SignPolicy::Warn),
            "error" => Ok(SignPolicy::Error),
            "ignore" => Ok(SignPolicy::Ignore),
            other => Err(ConfigError::InvalidValue {
                field: "reader.negative_unsigned".to_string(),
                reason: format!("must be 'warn', 'error', or 'ignore', got '{}'", other),
            }),
        }
    }
}
