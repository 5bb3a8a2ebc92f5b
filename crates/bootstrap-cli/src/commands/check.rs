//! Inspect credential files.

use anyhow::{bail, Result};
use colored::Colorize;
use std::path::Path;
use crate::cli::DeploymentArgs;
use crate::ui::output;

pub fn execute(base_dir: &Path, deployment: &DeploymentArgs) -> Result<()> {
    let bootstrap = super::open(base_dir, deployment, |_| Ok(()))?;

    println!(
        "{} credentials in: {}",
        "Checking".cyan().bold(),
        bootstrap.paths().secrets_dir.display()
    );

    let entries = bootstrap.check()?;
    let width = entries.iter().map(|e| e.name.as_str().len()).max().unwrap_or(0);
    let problems = entries.iter().filter(|e| output::print_check(e, width)).count();

    if problems > 0 {
        bail!("{} of {} credentials are missing or invalid", problems, entries.len());
    }

    println!("\n{} All credentials are valid", "✓".green().bold());
    Ok(())
}
