//! Common enumerations used throughout the bootstrap tool.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::errors::{BootstrapError, Result};

/// Log level written into the environment document for the n8n services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// No logging
    Silent,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    #[default]
    Info,
    /// Debug messages
    Debug,
}

impl FromStr for LogLevel {
    type Err = BootstrapError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "silent" | "none" => Ok(LogLevel::Silent),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            _ => Err(BootstrapError::Validation(format!("Invalid log level: {}", s))),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Silent => write!(f, "silent"),
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
        }
    }
}

/// Character domain of a generated secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SecretKind {
    /// Password drawn from alphanumerics plus a small safe symbol set.
    ///
    /// Length counts characters.
    PasswordAscii,
    /// Lowercase hex encoding of random bytes.
    ///
    /// Length counts bytes; the encoded value is twice as long.
    HexKey,
}

impl SecretKind {
    /// Number of characters a value of this kind has for a given length.
    pub fn encoded_len(&self, length: usize) -> usize {
        match self {
            SecretKind::PasswordAscii => length,
            SecretKind::HexKey => length * 2,
        }
    }

    /// Human-readable description used in the disclosure summary.
    pub fn describe(&self, length: usize) -> String {
        match self {
            SecretKind::PasswordAscii => format!("password, {} characters", length),
            SecretKind::HexKey => format!("hex key, {} bytes", length),
        }
    }
}

impl fmt::Display for SecretKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretKind::PasswordAscii => write!(f, "password"),
            SecretKind::HexKey => write!(f, "hex-key"),
        }
    }
}

/// What to do when a credential artifact already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OverwritePolicy {
    /// Preserve the existing secret.
    #[default]
    Skip,
    /// Regenerate and replace the existing secret.
    Force,
}

impl From<bool> for OverwritePolicy {
    fn from(overwrite_existing: bool) -> Self {
        if overwrite_existing {
            OverwritePolicy::Force
        } else {
            OverwritePolicy::Skip
        }
    }
}

/// What to do with the remaining writes after one secret fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Attempt every secret and report each outcome.
    #[default]
    BestEffort,
    /// Stop at the first failure; the rest are reported as not attempted.
    Abort,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parse() {
        assert_eq!("INFO".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
        assert_eq!(LogLevel::Debug.to_string(), "debug");
    }

    #[test]
    fn test_encoded_len() {
        assert_eq!(SecretKind::PasswordAscii.encoded_len(24), 24);
        assert_eq!(SecretKind::HexKey.encoded_len(32), 64);
    }

    #[test]
    fn test_overwrite_from_bool() {
        assert_eq!(OverwritePolicy::from(false), OverwritePolicy::Skip);
        assert_eq!(OverwritePolicy::from(true), OverwritePolicy::Force);
        assert_eq!(OverwritePolicy::default(), OverwritePolicy::Skip);
    }
}
