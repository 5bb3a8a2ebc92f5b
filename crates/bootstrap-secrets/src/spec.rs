//! Secret definitions and generated values.

use bootstrap_types::{BootstrapError, EntropySource, Result, Secret, SecretKind, SecretName};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;
use crate::types::create_secret;

/// One credential to produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretSpec {
    /// Unique name within a run
    pub name: SecretName,
    /// Character domain
    pub kind: SecretKind,
    /// Characters for passwords, bytes for hex keys
    pub length: usize,
    /// Credential artifact path
    pub destination: PathBuf,
    /// Whether the literal value goes into the disclosure summary
    #[serde(default)]
    pub disclose: bool,
}

impl SecretSpec {
    /// Create a secret definition.
    pub fn new(name: SecretName, kind: SecretKind, length: usize, destination: impl Into<PathBuf>) -> Self {
        Self {
            name,
            kind,
            length,
            destination: destination.into(),
            disclose: false,
        }
    }

    /// Mark the value for literal disclosure to the operator.
    pub fn disclosed(mut self) -> Self {
        self.disclose = true;
        self
    }

    /// Typed secret implementation for this definition.
    pub fn secret(&self) -> Result<Box<dyn Secret>> {
        create_secret(self.kind, self.name.clone(), self.length)
    }

    /// Check the definition is usable.
    pub fn validate(&self) -> Result<()> {
        self.secret()?;
        if self.destination.file_name().is_none() {
            return Err(BootstrapError::Validation(format!(
                "{}: destination {} is not a file path",
                self.name,
                self.destination.display()
            )));
        }
        Ok(())
    }

    /// Same secret stored under a different directory.
    pub fn relocated(&self, dir: impl AsRef<Path>) -> Self {
        let mut spec = self.clone();
        spec.destination = dir.as_ref().join(self.name.file_name());
        spec
    }
}

/// A secret value paired with its definition.
///
/// The value is wiped from memory on drop and never shown by `Debug`.
pub struct GeneratedSecret {
    spec: SecretSpec,
    value: Zeroizing<String>,
    created_at: DateTime<Utc>,
}

impl GeneratedSecret {
    /// Generate a fresh value for a definition.
    pub fn generate(spec: &SecretSpec, entropy: &mut dyn EntropySource) -> Result<Self> {
        let value = spec.secret()?.generate(entropy)?;
        Ok(Self {
            spec: spec.clone(),
            value: Zeroizing::new(value),
            created_at: Utc::now(),
        })
    }

    /// Wrap a value read back from an existing artifact.
    pub fn existing(spec: &SecretSpec, value: String) -> Self {
        Self {
            spec: spec.clone(),
            value: Zeroizing::new(value),
            created_at: Utc::now(),
        }
    }

    /// The definition this value satisfies.
    pub fn spec(&self) -> &SecretSpec {
        &self.spec
    }

    /// The raw secret value.
    pub fn expose(&self) -> &str {
        &self.value
    }

    /// When the value was generated or loaded.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl fmt::Debug for GeneratedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedSecret")
            .field("spec", &self.spec)
            .field("value", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::OsEntropy;

    fn spec() -> SecretSpec {
        SecretSpec::new(
            SecretName::new("redis_password").unwrap(),
            SecretKind::PasswordAscii,
            32,
            "/srv/secrets/redis_password.txt",
        )
    }

    #[test]
    fn test_debug_redacts_value() {
        let generated = GeneratedSecret::generate(&spec(), &mut OsEntropy).unwrap();
        let debug = format!("{:?}", generated);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains(generated.expose()));
        assert_eq!(generated.expose().len(), 32);
    }

    #[test]
    fn test_validate_rejects_zero_length() {
        let mut spec = spec();
        spec.length = 0;
        assert!(matches!(spec.validate(), Err(BootstrapError::Validation(_))));
    }

    #[test]
    fn test_relocated() {
        let moved = spec().relocated("/run/secrets");
        assert_eq!(moved.destination, PathBuf::from("/run/secrets/redis_password.txt"));
    }
}
