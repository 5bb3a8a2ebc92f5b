//! Logging setup.
//!
//! Library crates emit `tracing` events; the binary installs the subscriber
//! once at startup. Secret values are never passed to a log macro.

use bootstrap_types::{BootstrapError, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Crate targets whose events are shown by default.
const TARGETS: &[&str] = &["n8n_bootstrap", "bootstrap_core", "bootstrap_secrets", "bootstrap_env"];

/// Console verbosity selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Errors only
    Quiet,
    /// Informational messages
    #[default]
    Normal,
    /// Debug messages
    Verbose,
    /// Everything
    Trace,
}

impl Verbosity {
    /// Pick the verbosity from the global flags; quiet wins.
    pub fn from_flags(quiet: bool, verbose: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Trace
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }

    fn level(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "info",
            Verbosity::Verbose => "debug",
            Verbosity::Trace => "trace",
        }
    }

    /// Filter directive covering every crate of the tool.
    pub fn directive(&self) -> String {
        TARGETS
            .iter()
            .map(|target| format!("{}={}", target, self.level()))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable single-line format
    #[default]
    Compact,
    /// Multi-line format with span context
    Pretty,
    /// JSON format for machine parsing
    Json,
}

/// Initialize the logging system.
///
/// `RUST_LOG` takes precedence over the verbosity flags. Logs go to stderr
/// so command output on stdout stays clean.
pub fn init(verbosity: Verbosity, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr);

    let result = match format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    result.map_err(|e| BootstrapError::Config(format!("Failed to initialize logging: {}", e)))
}
