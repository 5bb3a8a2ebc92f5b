//! Alphanumeric password secret type.

use bootstrap_types::{BootstrapError, EntropySource, Result, Secret, SecretKind, SecretName, ValidationResult};
use crate::generator::{password_from, PASSWORD_ALPHABET};

/// Password drawn from [`PASSWORD_ALPHABET`].
#[derive(Debug, Clone)]
pub struct PasswordSecret {
    name: SecretName,
    length: usize,
}

impl PasswordSecret {
    /// Create a password definition of `length` characters.
    pub fn new(name: SecretName, length: usize) -> Self {
        Self { name, length }
    }
}

impl Secret for PasswordSecret {
    fn kind(&self) -> SecretKind {
        SecretKind::PasswordAscii
    }

    fn name(&self) -> &SecretName {
        &self.name
    }

    fn length(&self) -> usize {
        self.length
    }

    fn validate_definition(&self) -> Result<()> {
        if self.length == 0 {
            return Err(BootstrapError::Validation(format!(
                "{}: length must be greater than 0",
                self.name
            )));
        }
        Ok(())
    }

    fn generate(&self, entropy: &mut dyn EntropySource) -> Result<String> {
        password_from(entropy, self.length)
    }

    fn validate_value(&self, value: &str) -> ValidationResult {
        if value.is_empty() {
            return ValidationResult::Error(vec!["Password is empty".to_string()]);
        }

        // Operator-supplied passwords are allowed; they only draw a warning.
        let mut warnings = Vec::new();
        if value.chars().count() != self.length {
            warnings.push(format!(
                "Password length is {} but expected {}",
                value.chars().count(),
                self.length
            ));
        }
        if !value.bytes().all(|b| PASSWORD_ALPHABET.contains(&b)) {
            warnings.push("Password contains characters outside the generated alphabet".to_string());
        }

        if warnings.is_empty() {
            ValidationResult::Ok
        } else {
            ValidationResult::Warning(warnings)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::OsEntropy;

    fn secret() -> PasswordSecret {
        PasswordSecret::new(SecretName::new("admin_password").unwrap(), 24)
    }

    #[test]
    fn test_generated_value_validates() {
        let s = secret();
        let value = s.generate(&mut OsEntropy).unwrap();
        assert_eq!(s.validate_value(&value), ValidationResult::Ok);
    }

    #[test]
    fn test_foreign_value_warns() {
        let s = secret();
        assert!(matches!(s.validate_value("short pw\n"), ValidationResult::Warning(w) if w.len() == 2));
        assert!(matches!(s.validate_value(""), ValidationResult::Error(_)));
    }
}
