//! # Bootstrap Types
//!
//! Core types, traits, and enums shared across all bootstrap crates.
//!
//! This crate provides the fundamental building blocks for the n8n
//! deployment bootstrap tool, including:
//!
//! - A validated identifier for secret names
//! - Enums for secret kinds, overwrite and failure policies, and log levels
//! - The credential store trait implemented by storage backends
//! - Error types and result aliases
//!
//! ## Example
//!
//! ```
//! use bootstrap_types::{SecretName, SecretKind};
//!
//! let name = SecretName::new("postgres_password").unwrap();
//! assert_eq!(name.as_str(), "postgres_password");
//!
//! assert_eq!(SecretKind::HexKey.to_string(), "hex-key");
//! assert!(SecretName::new("Bad Name").is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod identifiers;
pub mod enums;
pub mod traits;
pub mod config;

// Re-export common types for convenience
pub use errors::{BootstrapError, Result};
pub use identifiers::SecretName;
pub use enums::{LogLevel, SecretKind, OverwritePolicy, FailurePolicy};
pub use config::BootstrapConfig;
pub use traits::{CredentialStore, EntropySource, Secret, ValidationResult};
