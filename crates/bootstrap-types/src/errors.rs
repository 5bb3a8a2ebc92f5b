//! Error types for bootstrap operations.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for bootstrap operations.
///
/// Every variant that concerns an artifact carries the artifact path so the
/// operator can remediate without guessing.
#[derive(Error, Debug)]
pub enum BootstrapError {
    /// No cryptographically secure randomness source is available.
    ///
    /// Fatal for the whole run: nothing may be written after this.
    #[error("Secure random source unavailable: {0}")]
    GenerationUnavailable(String),

    /// A destination directory or file could not be written.
    #[error("Cannot write {}: {reason}", path.display())]
    PathUnwritable {
        /// Artifact or directory that failed
        path: PathBuf,
        /// Underlying cause
        reason: String,
    },

    /// The artifact already exists and a fresh value was required.
    #[error("Artifact already exists: {}", path.display())]
    ArtifactAlreadyExists {
        /// Existing artifact
        path: PathBuf,
    },

    /// Another run holds the lock on the destination.
    #[error("Another bootstrap run holds the lock at {} (use --break-lock if it is stale)", path.display())]
    Locked {
        /// Lock file path
        path: PathBuf,
    },

    /// Configuration-related error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal bug - should never happen in production
    #[error("Bug detected: {0}\n\nThis is an internal error. Please report this issue at:\nhttps://github.com/n8n-bootstrap/n8n-bootstrap/issues")]
    Bug(String),
}

impl BootstrapError {
    /// Build a `PathUnwritable` from a path and any displayable cause.
    pub fn unwritable(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        BootstrapError::PathUnwritable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// A specialized Result type for bootstrap operations.
pub type Result<T> = std::result::Result<T, BootstrapError>;

/// Helper macro to create and return a BootstrapError::Bug
///
/// This should be used for conditions that should never occur
/// in normal operation.
#[macro_export]
macro_rules! bug {
    ($msg:expr) => {
        return Err($crate::BootstrapError::Bug($msg.to_string()))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::BootstrapError::Bug(format!($fmt, $($arg)*)))
    };
}

/// Helper macro to bail out with a message-carrying BootstrapError variant.
///
/// # Example
///
/// ```ignore
/// if length == 0 {
///     bail!(Validation, "length must be greater than 0 for {}", name);
/// }
/// ```
#[macro_export]
macro_rules! bail {
    ($variant:ident, $msg:expr) => {
        return Err($crate::BootstrapError::$variant($msg.to_string()))
    };
    ($variant:ident, $fmt:expr, $($arg:tt)*) => {
        return Err($crate::BootstrapError::$variant(format!($fmt, $($arg)*)))
    };
}
