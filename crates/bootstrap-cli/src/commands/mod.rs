//! CLI command implementations.

pub mod check;
pub mod generate;
pub mod render;
pub mod rotate;

use crate::cli::DeploymentArgs;
use anyhow::{Context, Result};
use bootstrap_core::Config;
use bootstrap_env::Bootstrap;
use bootstrap_types::BootstrapConfig;
use std::path::Path;

/// Merge bootstrap.yml, command-line overrides, and `N8N_BOOTSTRAP_*`
/// variables into a typed configuration.
pub fn load_config(
    base_dir: &Path,
    deployment: &DeploymentArgs,
    tweak: impl FnOnce(&mut Config) -> bootstrap_types::Result<()>,
) -> Result<BootstrapConfig> {
    let mut config = Config::load_from_dir(base_dir).context("Failed to load bootstrap.yml")?;

    config.set_opt("domain", deployment.domain.as_deref())?;
    config.set_opt("contact_email", deployment.email.as_deref())?;
    config.set_opt("secrets_dir", deployment.secrets_dir.as_deref())?;
    config.set_opt("timezone", deployment.timezone.as_deref())?;
    config.set_opt("secrets_mount_path", deployment.mount_path.as_deref())?;
    tweak(&mut config)?;

    config
        .with_env()
        .into_bootstrap_config()
        .context("Invalid configuration")
}

/// Resolve the deployment directory and bind the configuration to it.
pub fn open(
    base_dir: &Path,
    deployment: &DeploymentArgs,
    tweak: impl FnOnce(&mut Config) -> bootstrap_types::Result<()>,
) -> Result<Bootstrap> {
    let base_dir = base_dir
        .canonicalize()
        .with_context(|| format!("Deployment directory not found: {}", base_dir.display()))?;
    tracing::debug!("Deployment directory {}", base_dir.display());
    let config = load_config(&base_dir, deployment, tweak)?;
    Ok(Bootstrap::new(base_dir, config))
}
