//! Hex-encoded key secret type.

use bootstrap_types::{BootstrapError, EntropySource, Result, Secret, SecretKind, SecretName, ValidationResult};
use crate::generator::hex_key_from;

/// Random bytes encoded as lowercase hex.
///
/// Consumers such as n8n's encryption key expect exactly this encoding, so
/// a malformed value is an error rather than a warning.
#[derive(Debug, Clone)]
pub struct HexKeySecret {
    name: SecretName,
    bytes: usize,
}

impl HexKeySecret {
    /// Create a key definition of `bytes` random bytes.
    pub fn new(name: SecretName, bytes: usize) -> Self {
        Self { name, bytes }
    }
}

impl Secret for HexKeySecret {
    fn kind(&self) -> SecretKind {
        SecretKind::HexKey
    }

    fn name(&self) -> &SecretName {
        &self.name
    }

    fn length(&self) -> usize {
        self.bytes
    }

    fn validate_definition(&self) -> Result<()> {
        if self.bytes == 0 {
            return Err(BootstrapError::Validation(format!(
                "{}: byte length must be greater than 0",
                self.name
            )));
        }
        Ok(())
    }

    fn generate(&self, entropy: &mut dyn EntropySource) -> Result<String> {
        hex_key_from(entropy, self.bytes)
    }

    fn validate_value(&self, value: &str) -> ValidationResult {
        let mut errors = Vec::new();

        if !value.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')) {
            errors.push("Key is not lowercase hex".to_string());
        }
        let expected = SecretKind::HexKey.encoded_len(self.bytes);
        if value.len() != expected {
            errors.push(format!(
                "Key has {} hex characters but expected {}",
                value.len(),
                expected
            ));
        }

        if errors.is_empty() {
            ValidationResult::Ok
        } else {
            ValidationResult::Error(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::OsEntropy;

    #[test]
    fn test_hex_validation() {
        let s = HexKeySecret::new(SecretName::new("encryption_key").unwrap(), 4);
        let value = s.generate(&mut OsEntropy).unwrap();
        assert_eq!(value.len(), 8);
        assert_eq!(s.validate_value(&value), ValidationResult::Ok);
        assert!(matches!(s.validate_value("DEADBEEF"), ValidationResult::Error(_)));
        assert!(matches!(s.validate_value("deadbe"), ValidationResult::Error(_)));
    }
}
