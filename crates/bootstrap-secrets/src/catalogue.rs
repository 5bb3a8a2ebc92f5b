//! The credentials of a queue-mode n8n deployment.

use bootstrap_types::{SecretKind, SecretName};
use std::path::Path;
use crate::spec::SecretSpec;

/// PostgreSQL password for the n8n database user.
pub const POSTGRES_PASSWORD: &str = "postgres_password";
/// Redis password protecting the Bull queue.
pub const REDIS_PASSWORD: &str = "redis_password";
/// n8n credential encryption key.
pub const ENCRYPTION_KEY: &str = "encryption_key";
/// Password of the initial admin login.
pub const ADMIN_PASSWORD: &str = "admin_password";
/// Signing secret for user-management JWTs.
pub const JWT_SECRET: &str = "jwt_secret";
/// Token authenticating inbound webhook calls.
pub const WEBHOOK_TOKEN: &str = "webhook_token";

const CATALOGUE: &[(&str, SecretKind, usize, bool)] = &[
    (POSTGRES_PASSWORD, SecretKind::PasswordAscii, 32, false),
    (REDIS_PASSWORD, SecretKind::PasswordAscii, 32, false),
    (ENCRYPTION_KEY, SecretKind::HexKey, 32, false),
    (ADMIN_PASSWORD, SecretKind::PasswordAscii, 24, true),
    (JWT_SECRET, SecretKind::HexKey, 32, false),
    (WEBHOOK_TOKEN, SecretKind::HexKey, 24, false),
];

/// The six secrets of the deployment, stored under `secrets_dir`.
///
/// Only the admin password is marked for disclosure.
pub fn deployment_secrets(secrets_dir: impl AsRef<Path>) -> Vec<SecretSpec> {
    let dir = secrets_dir.as_ref();
    CATALOGUE
        .iter()
        .filter_map(|&(name, kind, length, disclose)| {
            let name = SecretName::new(name).ok()?;
            let spec = SecretSpec::new(name.clone(), kind, length, dir.join(name.file_name()));
            Some(if disclose { spec.disclosed() } else { spec })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_six_valid_secrets_one_disclosed() {
        let specs = deployment_secrets("/srv/n8n/secrets");
        assert_eq!(specs.len(), 6);
        assert!(specs.iter().all(|s| s.validate().is_ok()));

        let disclosed: Vec<_> = specs.iter().filter(|s| s.disclose).collect();
        assert_eq!(disclosed.len(), 1);
        assert_eq!(disclosed[0].name.as_str(), ADMIN_PASSWORD);
        assert_eq!(
            disclosed[0].destination,
            Path::new("/srv/n8n/secrets/admin_password.txt")
        );
    }
}
