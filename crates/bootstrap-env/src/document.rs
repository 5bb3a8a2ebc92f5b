//! The environment document consumed by the orchestrator.
//!
//! Every secret is referenced through a `*_FILE` key pointing at its
//! credential artifact. No raw secret value is ever placed in the document.

use bootstrap_secrets::catalogue;
use bootstrap_types::{BootstrapError, Result, SecretName};
use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use crate::defaults::Defaults;
use crate::inputs::DeploymentInputs;

/// Sections of the document, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Group {
    /// Public endpoint and certificate contact
    DomainTls,
    /// Core n8n settings
    N8n,
    /// PostgreSQL connection
    Database,
    /// Redis queue
    Queue,
    /// Execution retention and timeouts
    Execution,
    /// Log settings
    Logging,
    /// Credential file references
    Credentials,
}

impl Group {
    /// All groups in output order.
    pub const ALL: [Group; 7] = [
        Group::DomainTls,
        Group::N8n,
        Group::Database,
        Group::Queue,
        Group::Execution,
        Group::Logging,
        Group::Credentials,
    ];

    /// Section header.
    pub fn title(&self) -> &'static str {
        match self {
            Group::DomainTls => "Domain & TLS",
            Group::N8n => "n8n",
            Group::Database => "Database",
            Group::Queue => "Queue",
            Group::Execution => "Execution",
            Group::Logging => "Logging",
            Group::Credentials => "Credentials",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Value of a document entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvValue {
    /// Literal, non-secret value
    Plain(String),
    /// Path to a credential artifact
    SecretFile(PathBuf),
}

impl EnvValue {
    fn render(&self) -> String {
        match self {
            EnvValue::Plain(value) => quote(value),
            EnvValue::SecretFile(path) => quote(&path.to_string_lossy()),
        }
    }
}

/// Which keys reference which secret.
const SECRET_KEYS: &[(&str, &str)] = &[
    ("DB_POSTGRESDB_PASSWORD_FILE", catalogue::POSTGRES_PASSWORD),
    ("POSTGRES_PASSWORD_FILE", catalogue::POSTGRES_PASSWORD),
    ("QUEUE_BULL_REDIS_PASSWORD_FILE", catalogue::REDIS_PASSWORD),
    ("N8N_ENCRYPTION_KEY_FILE", catalogue::ENCRYPTION_KEY),
    ("N8N_BASIC_AUTH_PASSWORD_FILE", catalogue::ADMIN_PASSWORD),
    ("N8N_USER_MANAGEMENT_JWT_SECRET_FILE", catalogue::JWT_SECRET),
    ("WEBHOOK_AUTH_TOKEN_FILE", catalogue::WEBHOOK_TOKEN),
];

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    group: Group,
    value: EnvValue,
}

/// Ordered set of key/value pairs grouped into sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentDocument {
    entries: IndexMap<String, Entry>,
}

impl EnvironmentDocument {
    /// Empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a literal value.
    pub fn insert_plain(&mut self, group: Group, key: &str, value: impl ToString) -> Result<()> {
        self.insert(group, key, EnvValue::Plain(value.to_string()))
    }

    /// Add a reference to a credential artifact. The key must end in `_FILE`.
    pub fn insert_secret(&mut self, group: Group, key: &str, path: impl Into<PathBuf>) -> Result<()> {
        if !key.ends_with("_FILE") {
            return Err(BootstrapError::Validation(format!(
                "Secret reference key must end in _FILE: {}",
                key
            )));
        }
        self.insert(group, key, EnvValue::SecretFile(path.into()))
    }

    fn insert(&mut self, group: Group, key: &str, value: EnvValue) -> Result<()> {
        if !is_valid_key(key) {
            return Err(BootstrapError::Validation(format!("Invalid environment key: {}", key)));
        }
        if self.entries.contains_key(key) {
            return Err(BootstrapError::Validation(format!("Duplicate environment key: {}", key)));
        }
        self.entries.insert(key.to_string(), Entry { group, value });
        Ok(())
    }

    /// Value of a key.
    pub fn get(&self, key: &str) -> Option<&EnvValue> {
        self.entries.get(key).map(|e| &e.value)
    }

    /// Literal value of a key, if it is not a secret reference.
    pub fn plain(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            EnvValue::Plain(value) => Some(value),
            EnvValue::SecretFile(_) => None,
        }
    }

    /// All credential paths the document points at.
    pub fn secret_references(&self) -> Vec<(&str, &Path)> {
        self.entries
            .iter()
            .filter_map(|(key, entry)| match &entry.value {
                EnvValue::SecretFile(path) => Some((key.as_str(), path.as_path())),
                EnvValue::Plain(_) => None,
            })
            .collect()
    }

    /// Serialize as `KEY=VALUE` lines under `# group` headers.
    ///
    /// Output depends only on the entries, so equal documents produce
    /// byte-identical files.
    pub fn to_env_string(&self) -> String {
        let mut out = String::new();
        out.push_str("# n8n deployment environment\n");
        out.push_str("# Secrets are referenced by *_FILE paths and never stored here.\n");

        for group in Group::ALL {
            let mut lines = self
                .entries
                .iter()
                .filter(|(_, entry)| entry.group == group)
                .peekable();
            if lines.peek().is_none() {
                continue;
            }

            out.push('\n');
            out.push_str(&format!("# {}\n", group.title()));
            for (key, entry) in lines {
                out.push_str(&format!("{}={}\n", key, entry.value.render()));
            }
        }
        out
    }
}

/// Build the environment document for a deployment.
///
/// `secret_paths` maps each catalogue secret to the path the orchestrator
/// should read it from. Every catalogue secret must be present.
pub fn render(
    inputs: &DeploymentInputs,
    secret_paths: &BTreeMap<SecretName, PathBuf>,
    defaults: &Defaults,
) -> Result<EnvironmentDocument> {
    let domain = inputs.domain(defaults);
    let email = inputs.contact_email(defaults);
    let timezone = inputs.timezone(defaults);
    let base_url = format!("{}://{}/", defaults.protocol, domain);

    let mut doc = EnvironmentDocument::new();

    doc.insert_plain(Group::DomainTls, "DOMAIN_NAME", domain)?;
    doc.insert_plain(Group::DomainTls, "ACME_EMAIL", email)?;

    doc.insert_plain(Group::N8n, "N8N_HOST", domain)?;
    doc.insert_plain(Group::N8n, "N8N_PORT", defaults.n8n_port)?;
    doc.insert_plain(Group::N8n, "N8N_PROTOCOL", &defaults.protocol)?;
    doc.insert_plain(Group::N8n, "WEBHOOK_URL", &base_url)?;
    doc.insert_plain(Group::N8n, "N8N_EDITOR_BASE_URL", &base_url)?;
    doc.insert_plain(Group::N8n, "GENERIC_TIMEZONE", timezone)?;
    doc.insert_plain(Group::N8n, "TZ", timezone)?;
    doc.insert_plain(Group::N8n, "N8N_BASIC_AUTH_ACTIVE", true)?;
    doc.insert_plain(Group::N8n, "N8N_BASIC_AUTH_USER", &defaults.admin_user)?;

    doc.insert_plain(Group::Database, "DB_TYPE", "postgresdb")?;
    doc.insert_plain(Group::Database, "DB_POSTGRESDB_HOST", &defaults.postgres_host)?;
    doc.insert_plain(Group::Database, "DB_POSTGRESDB_PORT", defaults.postgres_port)?;
    doc.insert_plain(Group::Database, "DB_POSTGRESDB_DATABASE", &defaults.postgres_db)?;
    doc.insert_plain(Group::Database, "DB_POSTGRESDB_USER", &defaults.postgres_user)?;
    doc.insert_plain(Group::Database, "POSTGRES_DB", &defaults.postgres_db)?;
    doc.insert_plain(Group::Database, "POSTGRES_USER", &defaults.postgres_user)?;

    doc.insert_plain(Group::Queue, "EXECUTIONS_MODE", "queue")?;
    doc.insert_plain(Group::Queue, "QUEUE_BULL_REDIS_HOST", &defaults.redis_host)?;
    doc.insert_plain(Group::Queue, "QUEUE_BULL_REDIS_PORT", defaults.redis_port)?;
    doc.insert_plain(Group::Queue, "QUEUE_HEALTH_CHECK_ACTIVE", true)?;
    doc.insert_plain(
        Group::Queue,
        "N8N_CONCURRENCY_PRODUCTION_LIMIT",
        defaults.worker_concurrency,
    )?;

    doc.insert_plain(Group::Execution, "EXECUTIONS_DATA_PRUNE", defaults.prune_data)?;
    doc.insert_plain(Group::Execution, "EXECUTIONS_DATA_MAX_AGE", defaults.prune_max_age_hours)?;
    doc.insert_plain(Group::Execution, "EXECUTIONS_TIMEOUT", defaults.execution_timeout_secs)?;
    doc.insert_plain(
        Group::Execution,
        "EXECUTIONS_TIMEOUT_MAX",
        defaults.execution_timeout_max_secs,
    )?;

    doc.insert_plain(Group::Logging, "N8N_LOG_LEVEL", n8n_log_level(defaults))?;
    doc.insert_plain(Group::Logging, "N8N_LOG_OUTPUT", "console")?;

    for &(key, name) in SECRET_KEYS {
        let path = secret_paths
            .iter()
            .find(|(n, _)| n.as_str() == name)
            .map(|(_, p)| p)
            .ok_or_else(|| {
                BootstrapError::Validation(format!(
                    "No credential artifact for {} (needed by {})",
                    name, key
                ))
            })?;
        doc.insert_secret(Group::Credentials, key, path.clone())?;
    }

    Ok(doc)
}

fn n8n_log_level(defaults: &Defaults) -> String {
    use bootstrap_types::LogLevel;
    // n8n has no "silent"; its quietest level is "error".
    match defaults.log_level {
        LogLevel::Silent => LogLevel::Error.to_string(),
        level => level.to_string(),
    }
}

fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase() || c == '_')
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

/// Quote a value only when the env-file parser would otherwise misread it.
fn quote(value: &str) -> String {
    let safe = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-.,:/@+".contains(c));
    if safe {
        value.to_string()
    } else {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bootstrap_secrets::deployment_secrets;

    fn paths(dir: &str) -> BTreeMap<SecretName, PathBuf> {
        deployment_secrets(dir)
            .into_iter()
            .map(|s| (s.name, s.destination))
            .collect()
    }

    fn inputs() -> DeploymentInputs {
        DeploymentInputs {
            domain: Some("n8n.example.com".to_string()),
            contact_email: Some("admin@example.com".to_string()),
            timezone: None,
        }
    }

    #[test]
    fn test_render_is_deterministic() {
        let defaults = Defaults::default();
        let a = render(&inputs(), &paths("/srv/n8n/secrets"), &defaults).unwrap();
        let b = render(&inputs(), &paths("/srv/n8n/secrets"), &defaults).unwrap();
        assert_eq!(a.to_env_string().as_bytes(), b.to_env_string().as_bytes());
    }

    #[test]
    fn test_render_references_every_secret_by_path() {
        let doc = render(&inputs(), &paths("/srv/n8n/secrets"), &Defaults::default()).unwrap();
        let text = doc.to_env_string();

        for spec in deployment_secrets("/srv/n8n/secrets") {
            assert!(
                text.contains(&spec.destination.to_string_lossy().to_string()),
                "missing reference to {}",
                spec.name
            );
        }
        assert!(text.contains("DB_POSTGRESDB_PASSWORD_FILE=/srv/n8n/secrets/postgres_password.txt\n"));
        assert!(text.contains("WEBHOOK_URL=https://n8n.example.com/\n"));
        assert!(text.contains("ACME_EMAIL=admin@example.com\n"));
        assert!(text.contains("GENERIC_TIMEZONE=UTC\n"));
        assert!(doc.secret_references().iter().all(|(key, _)| key.ends_with("_FILE")));
    }

    #[test]
    fn test_groups_appear_in_order() {
        let text = render(&inputs(), &paths("/s"), &Defaults::default())
            .unwrap()
            .to_env_string();
        let positions: Vec<usize> = Group::ALL
            .iter()
            .map(|g| text.find(&format!("# {}\n", g.title())).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_missing_secret_path_is_error() {
        let mut incomplete = paths("/s");
        incomplete.retain(|name, _| name.as_str() != catalogue::JWT_SECRET);
        let err = render(&inputs(), &incomplete, &Defaults::default()).unwrap_err();
        assert!(err.to_string().contains("jwt_secret"));
    }

    #[test]
    fn test_defaults_fill_unset_inputs() {
        let doc = render(&DeploymentInputs::default(), &paths("/s"), &Defaults::default()).unwrap();
        assert_eq!(doc.plain("N8N_HOST"), Some("n8n.localhost"));
        assert_eq!(doc.plain("N8N_CONCURRENCY_PRODUCTION_LIMIT"), Some("10"));
        assert_eq!(doc.plain("EXECUTIONS_DATA_MAX_AGE"), Some("168"));
        assert_eq!(doc.plain("N8N_LOG_LEVEL"), Some("info"));
    }

    #[test]
    fn test_secret_key_needs_file_suffix() {
        let mut doc = EnvironmentDocument::new();
        assert!(doc.insert_secret(Group::Credentials, "DB_PASSWORD", "/s/x.txt").is_err());
        assert!(doc.insert_plain(Group::N8n, "lower", "x").is_err());
        doc.insert_plain(Group::N8n, "A", "1").unwrap();
        assert!(doc.insert_plain(Group::N8n, "A", "2").is_err());
    }

    #[test]
    fn test_values_with_spaces_are_quoted() {
        assert_eq!(quote("/srv/n8n/secrets/a.txt"), "/srv/n8n/secrets/a.txt");
        assert_eq!(quote("/my secrets/a.txt"), "\"/my secrets/a.txt\"");
        assert_eq!(quote("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(quote(""), "\"\"");
    }
}
