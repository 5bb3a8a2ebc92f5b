//! Configuration types and structures.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::{FailurePolicy, LogLevel};

/// Placeholder domain used when the operator supplies none.
pub const DEFAULT_DOMAIN: &str = "n8n.localhost";

/// Placeholder contact email used when the operator supplies none.
pub const DEFAULT_CONTACT_EMAIL: &str = "admin@example.com";

/// Bootstrap configuration, after all layers are merged.
///
/// Relative paths are resolved against the base directory by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Public domain n8n is served on
    #[serde(default = "default_domain")]
    pub domain: String,

    /// Contact email for ACME certificate registration
    #[serde(default = "default_contact_email")]
    pub contact_email: String,

    /// Directory receiving the credential artifacts
    #[serde(default = "default_secrets_dir")]
    pub secrets_dir: PathBuf,

    /// Regenerate secrets that already exist
    #[serde(default)]
    pub overwrite_existing: bool,

    /// Treat an existing artifact as a failure instead of skipping it
    #[serde(default)]
    pub require_fresh: bool,

    /// Behaviour after a secret fails to write
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Timezone for n8n schedules
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Environment document file name
    #[serde(default = "default_env_file")]
    pub env_file: PathBuf,

    /// Disclosure summary file name
    #[serde(default = "default_summary_file")]
    pub summary_file: PathBuf,

    /// Path the orchestrator mounts the secrets directory at, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secrets_mount_path: Option<PathBuf>,

    /// Concurrent executions per queue worker
    #[serde(default = "default_worker_concurrency")]
    pub worker_concurrency: u32,

    /// n8n log level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_domain() -> String {
    DEFAULT_DOMAIN.to_string()
}

fn default_contact_email() -> String {
    DEFAULT_CONTACT_EMAIL.to_string()
}

fn default_secrets_dir() -> PathBuf {
    PathBuf::from("secrets")
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_env_file() -> PathBuf {
    PathBuf::from(".env")
}

fn default_summary_file() -> PathBuf {
    PathBuf::from("CREDENTIALS.txt")
}

fn default_worker_concurrency() -> u32 {
    10
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            domain: default_domain(),
            contact_email: default_contact_email(),
            secrets_dir: default_secrets_dir(),
            overwrite_existing: false,
            require_fresh: false,
            failure_policy: FailurePolicy::default(),
            timezone: default_timezone(),
            env_file: default_env_file(),
            summary_file: default_summary_file(),
            secrets_mount_path: None,
            worker_concurrency: default_worker_concurrency(),
            log_level: LogLevel::default(),
        }
    }
}
