//! Core trait definitions for bootstrap abstractions.

use std::path::Path;
use crate::{SecretKind, SecretName};
use crate::errors::Result;

/// Validation result for an existing secret value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Secret is valid
    Ok,
    /// Secret is missing
    Missing,
    /// Secret is usable but has warnings
    Warning(Vec<String>),
    /// Secret is invalid
    Error(Vec<String>),
}

/// A source of cryptographically secure random bytes.
///
/// Implementations must fail with
/// [`BootstrapError::GenerationUnavailable`](crate::BootstrapError::GenerationUnavailable)
/// rather than fall back to a predictable source.
pub trait EntropySource {
    /// Fill `buf` entirely with random bytes.
    fn fill(&mut self, buf: &mut [u8]) -> Result<()>;
}

/// Trait for secret types.
///
/// Each secret kind (password, hex key) implements this trait.
pub trait Secret: Send + Sync {
    /// Get the secret kind.
    fn kind(&self) -> SecretKind;

    /// Get the secret name.
    fn name(&self) -> &SecretName;

    /// Configured length (characters for passwords, bytes for keys).
    fn length(&self) -> usize;

    /// Validate the secret definition.
    fn validate_definition(&self) -> Result<()>;

    /// Generate a new secret value from a secure entropy source.
    fn generate(&self, entropy: &mut dyn EntropySource) -> Result<String>;

    /// Validate an existing secret value.
    fn validate_value(&self, value: &str) -> ValidationResult;
}

/// Trait for credential storage backends.
///
/// A store addresses each secret individually by path and must never expose
/// a partially written or world-readable artifact.
pub trait CredentialStore {
    /// Check whether an artifact exists.
    fn exists(&self, path: &Path) -> Result<bool>;

    /// Read a secret value.
    fn read(&self, path: &Path) -> Result<String>;

    /// Persist a secret value with owner-only permissions.
    fn write(&self, path: &Path, value: &str) -> Result<()>;

    /// Report whether an artifact's permissions are owner-only.
    fn is_restricted(&self, path: &Path) -> Result<bool>;
}
