//! Type-safe identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::errors::{BootstrapError, Result};

/// A validated secret name.
///
/// Secret names double as artifact file stems, so they must:
/// - Start with a lowercase letter
/// - Contain only lowercase letters, digits, and underscores
///
/// # Example
///
/// ```
/// use bootstrap_types::SecretName;
///
/// let name = SecretName::new("redis_password").unwrap();
/// assert_eq!(name.file_name(), "redis_password.txt");
///
/// assert!(SecretName::new("../escape").is_err());
/// assert!(SecretName::new("_hidden").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SecretName(String);

impl SecretName {
    /// Create a new validated secret name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name doesn't meet validation requirements.
    pub fn new(name: impl AsRef<str>) -> Result<Self> {
        let name = name.as_ref();
        if !Self::is_valid(name) {
            return Err(BootstrapError::Validation(format!(
                "Invalid secret name '{}': must contain only lowercase letters, digits, and underscores, \
                and must start with a letter",
                name
            )));
        }
        Ok(Self(name.to_string()))
    }

    /// Check if a name is valid without allocating.
    pub fn is_valid(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) if first.is_ascii_lowercase() => {}
            _ => return false,
        }

        chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the credential artifact holding this secret.
    pub fn file_name(&self) -> String {
        format!("{}.txt", self.0)
    }
}

impl fmt::Display for SecretName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SecretName {
    type Err = BootstrapError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for SecretName {
    type Error = BootstrapError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<SecretName> for String {
    fn from(name: SecretName) -> Self {
        name.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rejects_path_like_names() {
        assert!(SecretName::new("").is_err());
        assert!(SecretName::new("a/b").is_err());
        assert!(SecretName::new("a.txt").is_err());
        assert!(SecretName::new("1abc").is_err());
        assert!(SecretName::new("Admin").is_err());
    }

    #[test]
    fn test_serde_validates() {
        let ok: SecretName = serde_json::from_str("\"jwt_secret\"").unwrap();
        assert_eq!(ok.as_str(), "jwt_secret");
        assert!(serde_json::from_str::<SecretName>("\"bad name\"").is_err());
    }

    proptest! {
        #[test]
        fn valid_names_never_contain_separators(name in "[a-z][a-z0-9_]{0,20}") {
            let parsed = SecretName::new(&name).unwrap();
            prop_assert!(!parsed.file_name().contains('/'));
            prop_assert_eq!(parsed.file_name(), format!("{}.txt", name));
        }
    }
}
