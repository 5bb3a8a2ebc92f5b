//! # Bootstrap Core
//!
//! Core utilities, configuration management, logging, and filesystem
//! primitives for the n8n deployment bootstrap tool.
//!
//! This crate provides:
//!
//! - **Configuration**: Multi-layer configuration (defaults, `bootstrap.yml`,
//!   command-line values, `N8N_BOOTSTRAP_*` environment variables) validated
//!   against a JSON schema
//! - **Logging**: `tracing` subscriber setup with verbosity and format control
//! - **File Operations**: owner-only atomic writes, staged writes, run locks
//!
//! ## Example
//!
//! ```no_run
//! use bootstrap_core::config::Config;
//!
//! let config = Config::load("/srv/n8n/bootstrap.yml")?
//!     .with_env()
//!     .into_bootstrap_config()?;
//! println!("deploying {}", config.domain);
//! # Ok::<(), bootstrap_core::BootstrapError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod log;
pub mod util;

// Re-export commonly used items
pub use config::Config;
pub use bootstrap_types::{BootstrapError, Result};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "n8n-bootstrap";
