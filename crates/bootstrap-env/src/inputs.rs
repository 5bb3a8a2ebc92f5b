//! Operator-supplied deployment parameters.

use bootstrap_types::BootstrapConfig;
use serde::{Deserialize, Serialize};
use crate::defaults::Defaults;

/// Values the operator may supply; unset ones fall back to [`Defaults`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentInputs {
    /// Public domain
    pub domain: Option<String>,
    /// ACME contact email
    pub contact_email: Option<String>,
    /// Timezone for schedules
    pub timezone: Option<String>,
}

impl DeploymentInputs {
    /// Inputs taken from a merged configuration.
    pub fn from_config(config: &BootstrapConfig) -> Self {
        Self {
            domain: Some(config.domain.clone()),
            contact_email: Some(config.contact_email.clone()),
            timezone: Some(config.timezone.clone()),
        }
    }

    /// Domain, or the default placeholder.
    pub fn domain<'a>(&'a self, defaults: &'a Defaults) -> &'a str {
        non_empty(&self.domain).unwrap_or(&defaults.domain)
    }

    /// Contact email, or the default placeholder.
    pub fn contact_email<'a>(&'a self, defaults: &'a Defaults) -> &'a str {
        non_empty(&self.contact_email).unwrap_or(&defaults.contact_email)
    }

    /// Timezone, or the default.
    pub fn timezone<'a>(&'a self, defaults: &'a Defaults) -> &'a str {
        non_empty(&self.timezone).unwrap_or(&defaults.timezone)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_and_blank_fall_back() {
        let defaults = Defaults::default();
        let inputs = DeploymentInputs {
            domain: Some("  ".to_string()),
            contact_email: None,
            timezone: Some("Europe/Berlin".to_string()),
        };
        assert_eq!(inputs.domain(&defaults), "n8n.localhost");
        assert_eq!(inputs.contact_email(&defaults), "admin@example.com");
        assert_eq!(inputs.timezone(&defaults), "Europe/Berlin");
    }
}
