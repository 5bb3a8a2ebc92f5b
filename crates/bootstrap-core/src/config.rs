//! Configuration management for the bootstrap tool.
//!
//! This module provides multi-layer configuration support with:
//! - File-based configuration (`bootstrap.yml` in the base directory)
//! - Environment variable overrides (`N8N_BOOTSTRAP_*`)
//! - Programmatic updates (command-line flags)
//! - Schema validation
//!
//! ## Configuration Layers
//!
//! Configuration values are resolved in this priority order:
//! 1. Environment variables
//! 2. Programmatically set values
//! 3. Values loaded from file
//! 4. Default values
//!
//! ## Example
//!
//! ```rust
//! use bootstrap_core::config::Config;
//!
//! let mut config = Config::empty();
//! config.set("domain", "n8n.example.com")?;
//!
//! let domain: String = config.get("domain").unwrap();
//! assert_eq!(domain, "n8n.example.com");
//!
//! let typed = config.into_bootstrap_config()?;
//! assert_eq!(typed.timezone, "UTC");
//! # Ok::<(), bootstrap_core::BootstrapError>(())
//! ```

use bootstrap_types::{BootstrapError, Result};
use bootstrap_types::config::BootstrapConfig;
use schema::SCHEMA;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Name of the configuration file looked up in the base directory.
pub const CONFIG_FILE_NAME: &str = "bootstrap.yml";

/// Prefix of environment variables overriding configuration keys.
pub const ENV_PREFIX: &str = "N8N_BOOTSTRAP_";

/// Configuration layer priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigLayer {
    /// Default values
    Default = 0,
    /// Values loaded from file
    Loaded = 1,
    /// Values set programmatically
    Set = 2,
    /// Values from environment variables
    Environment = 3,
}

/// How an environment variable's text is turned into a configuration value.
#[derive(Debug, Clone, Copy)]
enum EnvValueType {
    Text,
    Flag,
    Number,
}

/// Environment variable suffixes and the configuration keys they override.
const ENV_KEYS: &[(&str, &str, EnvValueType)] = &[
    ("DOMAIN", "domain", EnvValueType::Text),
    ("CONTACT_EMAIL", "contact_email", EnvValueType::Text),
    ("SECRETS_DIR", "secrets_dir", EnvValueType::Text),
    ("OVERWRITE", "overwrite_existing", EnvValueType::Flag),
    ("TIMEZONE", "timezone", EnvValueType::Text),
    ("SECRETS_MOUNT_PATH", "secrets_mount_path", EnvValueType::Text),
    ("WORKER_CONCURRENCY", "worker_concurrency", EnvValueType::Number),
    ("LOG_LEVEL", "log_level", EnvValueType::Text),
];

/// Layered configuration.
///
/// This is the low-level configuration type; [`Config::into_bootstrap_config`]
/// produces the typed [`BootstrapConfig`] the pipeline consumes.
#[derive(Clone, Debug)]
pub struct Config {
    layers: HashMap<ConfigLayer, Value>,
    schema: Value,
}

impl Config {
    /// Create a configuration with no layers besides the defaults.
    pub fn empty() -> Self {
        let mut layers = HashMap::new();
        layers.insert(ConfigLayer::Default, default_layer());

        Self {
            layers,
            schema: SCHEMA.clone(),
        }
    }

    /// Create a new configuration from a file path.
    ///
    /// If the file doesn't exist, only the defaults are present.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = Self::empty();

        if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| BootstrapError::Config(format!("Failed to read {}: {}", path.display(), e)))?;

            let value: Value = serde_yaml::from_str(&content)
                .map_err(|e| BootstrapError::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

            // An empty file parses as null.
            if !value.is_null() {
                config.layers.insert(ConfigLayer::Loaded, value);
            }
            tracing::debug!("Loaded configuration from {}", path.display());
        }

        Ok(config)
    }

    /// Load `bootstrap.yml` from a base directory.
    pub fn load_from_dir(base_dir: impl AsRef<Path>) -> Result<Self> {
        Self::load(base_dir.as_ref().join(CONFIG_FILE_NAME))
    }

    /// Apply `N8N_BOOTSTRAP_*` overrides from the process environment.
    pub fn with_env(self) -> Self {
        self.with_env_from(std::env::vars())
    }

    /// Apply `N8N_BOOTSTRAP_*` overrides from the given variables.
    ///
    /// Unknown variables are ignored; values that cannot be parsed for their
    /// key are logged and skipped.
    pub fn with_env_from<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut layer = serde_json::Map::new();

        for (name, raw) in vars {
            let Some(suffix) = name.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let Some((_, key, kind)) = ENV_KEYS.iter().find(|(s, _, _)| *s == suffix) else {
                continue;
            };

            let raw = raw.as_ref().trim();
            let value = match kind {
                EnvValueType::Text => Some(Value::String(raw.to_string())),
                EnvValueType::Flag => parse_flag(raw).map(Value::Bool),
                EnvValueType::Number => raw.parse::<u64>().ok().map(Value::from),
            };

            match value {
                Some(value) => {
                    layer.insert(key.to_string(), value);
                }
                None => {
                    tracing::warn!("Ignoring {}{}: cannot parse '{}'", ENV_PREFIX, suffix, raw);
                }
            }
        }

        if !layer.is_empty() {
            self.layers.insert(ConfigLayer::Environment, Value::Object(layer));
        }
        self
    }

    /// Get a configuration value by key, respecting layer priority.
    ///
    /// Returns None if the key doesn't exist in any layer.
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        // Check layers in priority order (highest to lowest)
        let layers = [
            ConfigLayer::Environment,
            ConfigLayer::Set,
            ConfigLayer::Loaded,
            ConfigLayer::Default,
        ];

        for layer in &layers {
            if let Some(value) = self.layers.get(layer).and_then(|data| get_value_at_path(data, key)) {
                if let Ok(typed_value) = serde_json::from_value(value.clone()) {
                    return Some(typed_value);
                }
            }
        }

        None
    }

    /// Set a configuration value programmatically.
    pub fn set(&mut self, key: &str, value: impl Serialize) -> Result<()> {
        let value = serde_json::to_value(value)
            .map_err(|e| BootstrapError::Config(format!("Failed to serialize value: {}", e)))?;

        let set_layer = self
            .layers
            .entry(ConfigLayer::Set)
            .or_insert_with(|| Value::Object(Default::default()));

        set_value_at_path(set_layer, key, value)
    }

    /// Set a value only when one is given.
    pub fn set_opt<T: Serialize>(&mut self, key: &str, value: Option<T>) -> Result<()> {
        match value {
            Some(value) => self.set(key, value),
            None => Ok(()),
        }
    }

    /// Get merged data from all layers.
    pub fn merged_data(&self) -> Value {
        let layers = [
            ConfigLayer::Default,
            ConfigLayer::Loaded,
            ConfigLayer::Set,
            ConfigLayer::Environment,
        ];

        let mut merged = Value::Object(serde_json::Map::new());

        for layer in &layers {
            if let Some(layer_data) = self.layers.get(layer) {
                merged = crate::util::data::deep_merge(merged, layer_data.clone());
            }
        }

        merged
    }

    /// Validate the merged configuration against the schema.
    pub fn validate(&self) -> Result<()> {
        let instance = self.merged_data();

        let compiled = jsonschema::JSONSchema::compile(&self.schema)
            .map_err(|e| BootstrapError::Bug(format!("Invalid configuration schema: {}", e)))?;

        let result = compiled.validate(&instance);
        if let Err(errors) = result {
            let error_msgs: Vec<String> = errors
                .map(|e| {
                    let path = e.instance_path.to_string();
                    if path.is_empty() {
                        e.to_string()
                    } else {
                        format!("{}: {}", path.trim_start_matches('/'), e)
                    }
                })
                .collect();
            return Err(BootstrapError::Config(format!(
                "Validation failed: {}",
                error_msgs.join(", ")
            )));
        }
        Ok(())
    }

    /// Validate and convert into the typed configuration.
    pub fn into_bootstrap_config(self) -> Result<BootstrapConfig> {
        self.validate()?;
        serde_json::from_value(self.merged_data())
            .map_err(|e| BootstrapError::Config(format!("Failed to parse configuration: {}", e)))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::empty()
    }
}

fn default_layer() -> Value {
    serde_json::to_value(BootstrapConfig::default()).unwrap_or_else(|_| Value::Object(Default::default()))
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

fn get_value_at_path<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = data;
    for part in path.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}

fn set_value_at_path(data: &mut Value, path: &str, value: Value) -> Result<()> {
    let parts: Vec<&str> = path.split('.').collect();
    let Some((last, parents)) = parts.split_last() else {
        return Err(BootstrapError::Config("Empty path".to_string()));
    };
    if last.is_empty() {
        return Err(BootstrapError::Config("Empty path".to_string()));
    }

    // Navigate to parent, creating intermediate objects as needed
    let mut current = data;
    for part in parents {
        current = as_mapping(current)
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    as_mapping(current).insert(last.to_string(), value);
    Ok(())
}

/// The value as a mapping, replacing anything else with an empty one.
fn as_mapping(value: &mut Value) -> &mut Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => {
            *other = Value::Object(Map::new());
            as_mapping(other)
        }
    }
}

mod schema {
    use once_cell::sync::Lazy;
    use serde_json::{json, Value};

    /// JSON schema for `bootstrap.yml` after all layers are merged.
    pub(super) static SCHEMA: Lazy<Value> = Lazy::new(|| {
        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "domain": { "type": "string", "pattern": "^[A-Za-z0-9]([A-Za-z0-9.-]*[A-Za-z0-9])?$" },
                "contact_email": { "type": "string", "pattern": "^[^@\\s]+@[^@\\s]+$" },
                "secrets_dir": { "type": "string", "minLength": 1 },
                "overwrite_existing": { "type": "boolean" },
                "require_fresh": { "type": "boolean" },
                "failure_policy": { "enum": ["best-effort", "abort"] },
                "timezone": { "type": "string", "minLength": 1 },
                "env_file": { "type": "string", "minLength": 1 },
                "summary_file": { "type": "string", "minLength": 1 },
                "secrets_mount_path": { "type": "string", "pattern": "^/" },
                "worker_concurrency": { "type": "integer", "minimum": 1 },
                "log_level": { "enum": ["silent", "error", "warn", "info", "debug"] }
            }
        })
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use bootstrap_types::FailurePolicy;
    use tempfile::TempDir;

    #[test]
    fn test_config_layers() {
        let mut config = Config::empty();

        config.layers.insert(
            ConfigLayer::Loaded,
            serde_json::json!({"domain": "loaded.example.com"}),
        );

        let value: String = config.get("domain").unwrap();
        assert_eq!(value, "loaded.example.com");

        config.set("domain", "set.example.com").unwrap();
        let value: String = config.get("domain").unwrap();
        assert_eq!(value, "set.example.com");

        let config = config.with_env_from([("N8N_BOOTSTRAP_DOMAIN", "env.example.com")]);
        let value: String = config.get("domain").unwrap();
        assert_eq!(value, "env.example.com");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap();
        let typed = config.into_bootstrap_config().unwrap();
        assert_eq!(typed, BootstrapConfig::default());
    }

    #[test]
    fn test_load_yaml_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "domain: n8n.example.com\ncontact_email: ops@example.com\nfailure_policy: abort\n",
        )
        .unwrap();

        let typed = Config::load_from_dir(dir.path()).unwrap().into_bootstrap_config().unwrap();
        assert_eq!(typed.domain, "n8n.example.com");
        assert_eq!(typed.contact_email, "ops@example.com");
        assert_eq!(typed.failure_policy, FailurePolicy::Abort);
    }

    #[test]
    fn test_env_flag_and_number_parsing() {
        let typed = Config::empty()
            .with_env_from([
                ("N8N_BOOTSTRAP_OVERWRITE", "yes"),
                ("N8N_BOOTSTRAP_WORKER_CONCURRENCY", "4"),
                ("N8N_BOOTSTRAP_UNKNOWN", "ignored"),
                ("HOME", "/root"),
            ])
            .into_bootstrap_config()
            .unwrap();
        assert!(typed.overwrite_existing);
        assert_eq!(typed.worker_concurrency, 4);
    }

    #[test]
    fn test_unparseable_env_flag_is_ignored() {
        let config = Config::empty().with_env_from([("N8N_BOOTSTRAP_OVERWRITE", "maybe")]);
        let overwrite: bool = config.get("overwrite_existing").unwrap();
        assert!(!overwrite);
    }

    #[test]
    fn test_schema_rejects_typos_and_bad_values() {
        let mut config = Config::empty();
        config.set("domian", "n8n.example.com").unwrap();
        assert!(matches!(config.validate(), Err(BootstrapError::Config(_))));

        let mut config = Config::empty();
        config.set("contact_email", "not-an-email").unwrap();
        let err = config.into_bootstrap_config().unwrap_err().to_string();
        assert!(err.contains("contact_email"), "{}", err);

        let mut config = Config::empty();
        config.set("worker_concurrency", 0).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_set_nested_path() {
        let mut value = serde_json::json!({});
        set_value_at_path(&mut value, "a.b.c", serde_json::json!(1)).unwrap();
        assert_eq!(value, serde_json::json!({"a": {"b": {"c": 1}}}));
        assert!(set_value_at_path(&mut value, "", serde_json::json!(1)).is_err());
    }

    #[test]
    fn test_set_through_scalar_replaces_it() {
        let mut value = serde_json::json!({"a": 1, "keep": true});
        set_value_at_path(&mut value, "a.b", serde_json::json!("x")).unwrap();
        assert_eq!(value, serde_json::json!({"a": {"b": "x"}, "keep": true}));

        let mut value = serde_json::json!("scalar");
        set_value_at_path(&mut value, "a.b.c", serde_json::json!(2)).unwrap();
        assert_eq!(value, serde_json::json!({"a": {"b": {"c": 2}}}));
    }
}
