//! Static configuration defaults of the deployment.

use bootstrap_types::config::{DEFAULT_CONTACT_EMAIL, DEFAULT_DOMAIN};
use bootstrap_types::{BootstrapConfig, LogLevel};

/// Fixed schema values written into every environment document.
///
/// Service host names match the service names of the compose project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    /// Domain placeholder
    pub domain: String,
    /// Contact email placeholder
    pub contact_email: String,
    /// Timezone
    pub timezone: String,
    /// Public protocol (TLS terminates at the proxy)
    pub protocol: String,
    /// n8n listen port
    pub n8n_port: u16,
    /// Initial admin user name
    pub admin_user: String,
    /// PostgreSQL service host
    pub postgres_host: String,
    /// PostgreSQL port
    pub postgres_port: u16,
    /// Database name
    pub postgres_db: String,
    /// Database user
    pub postgres_user: String,
    /// Redis service host
    pub redis_host: String,
    /// Redis port
    pub redis_port: u16,
    /// Concurrent executions per worker
    pub worker_concurrency: u32,
    /// Prune old execution data
    pub prune_data: bool,
    /// Execution data retention, in hours
    pub prune_max_age_hours: u32,
    /// Default execution timeout, in seconds
    pub execution_timeout_secs: u32,
    /// Maximum execution timeout, in seconds
    pub execution_timeout_max_secs: u32,
    /// n8n log level
    pub log_level: LogLevel,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            domain: DEFAULT_DOMAIN.to_string(),
            contact_email: DEFAULT_CONTACT_EMAIL.to_string(),
            timezone: "UTC".to_string(),
            protocol: "https".to_string(),
            n8n_port: 5678,
            admin_user: "admin".to_string(),
            postgres_host: "postgres".to_string(),
            postgres_port: 5432,
            postgres_db: "n8n".to_string(),
            postgres_user: "n8n".to_string(),
            redis_host: "redis".to_string(),
            redis_port: 6379,
            worker_concurrency: 10,
            prune_data: true,
            prune_max_age_hours: 168,
            execution_timeout_secs: 3600,
            execution_timeout_max_secs: 7200,
            log_level: LogLevel::Info,
        }
    }
}

impl Defaults {
    /// Defaults with the tunables a configuration may override.
    pub fn from_config(config: &BootstrapConfig) -> Self {
        Self {
            worker_concurrency: config.worker_concurrency,
            log_level: config.log_level,
            ..Self::default()
        }
    }
}
