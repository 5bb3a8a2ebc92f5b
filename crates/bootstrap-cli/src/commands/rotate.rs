//! Rotate selected credentials.

use anyhow::{bail, Context, Result};
use bootstrap_secrets::OsEntropy;
use bootstrap_types::SecretName;
use colored::Colorize;
use dialoguer::Confirm;
use std::path::Path;
use crate::cli::DeploymentArgs;
use crate::ui::output;

pub fn execute(base_dir: &Path, deployment: &DeploymentArgs, secrets: &[String], yes: bool) -> Result<()> {
    let bootstrap = super::open(base_dir, deployment, |_| Ok(()))?;

    let names: Vec<SecretName> = if secrets.is_empty() {
        bootstrap.secrets().into_iter().map(|s| s.name).collect()
    } else {
        secrets
            .iter()
            .map(|s| SecretName::new(s).with_context(|| format!("Invalid credential name '{}'", s)))
            .collect::<Result<Vec<_>>>()?
    };

    let listed: Vec<&str> = names.iter().map(SecretName::as_str).collect();
    println!(
        "{} credentials: {}",
        "Rotating".yellow().bold(),
        listed.join(", ").cyan()
    );

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Rotate {} credential(s)? Running services must be restarted afterwards{}",
                names.len(),
                if listed.contains(&"encryption_key") {
                    "; stored n8n credentials become unreadable with a new encryption key"
                } else {
                    ""
                }
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".yellow());
            return Ok(());
        }
    }

    let outcome = bootstrap.rotate(&names, &mut OsEntropy).context("Rotation failed")?;

    output::print_report(&outcome);
    output::print_documents(&outcome.documents);

    if !outcome.is_success() {
        bail!("Rotation incomplete");
    }

    println!("\n{} Rotated {} credential(s)", "✓".green().bold(), names.len());
    Ok(())
}
