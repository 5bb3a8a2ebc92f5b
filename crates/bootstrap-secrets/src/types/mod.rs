//! Secret type implementations.

pub mod password;
pub mod hex_key;

pub use password::PasswordSecret;
pub use hex_key::HexKeySecret;

use bootstrap_types::{Result, Secret, SecretKind, SecretName};

/// Factory function to create a secret from its kind and length.
pub fn create_secret(kind: SecretKind, name: SecretName, length: usize) -> Result<Box<dyn Secret>> {
    let secret: Box<dyn Secret> = match kind {
        SecretKind::PasswordAscii => Box::new(PasswordSecret::new(name, length)),
        SecretKind::HexKey => Box::new(HexKeySecret::new(name, length)),
    };
    secret.validate_definition()?;
    Ok(secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_validates() {
        let name = SecretName::new("k").unwrap();
        assert!(create_secret(SecretKind::HexKey, name.clone(), 0).is_err());
        let secret = create_secret(SecretKind::HexKey, name, 8).unwrap();
        assert_eq!(secret.kind(), SecretKind::HexKey);
        assert_eq!(secret.length(), 8);
    }
}
