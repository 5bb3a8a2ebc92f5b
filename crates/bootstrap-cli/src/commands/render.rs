//! Rewrite the generated files from existing credentials.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use crate::cli::DeploymentArgs;
use crate::ui::output;

pub fn execute(base_dir: &Path, deployment: &DeploymentArgs) -> Result<()> {
    let bootstrap = super::open(base_dir, deployment, |_| Ok(()))?;

    let written = bootstrap
        .render_existing()
        .context("Failed to render environment")?;

    println!("{} Wrote {}", "✓".green().bold(), written.env_file.display());
    println!("{} Wrote {}", "✓".green().bold(), written.summary_file.display());
    output::print_summary_warning();
    Ok(())
}
