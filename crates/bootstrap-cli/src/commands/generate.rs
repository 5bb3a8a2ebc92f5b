//! Generate credentials and write the deployment environment.

use anyhow::{bail, Context, Result};
use bootstrap_core::util::RunLock;
use bootstrap_secrets::OsEntropy;
use bootstrap_types::FailurePolicy;
use colored::Colorize;
use std::path::Path;
use crate::cli::DeploymentArgs;
use crate::ui::{output, progress};

/// Flags specific to `generate`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    pub force: bool,
    pub require_fresh: bool,
    pub abort_on_error: bool,
    pub break_lock: bool,
}

pub fn execute(base_dir: &Path, deployment: &DeploymentArgs, options: Options) -> Result<()> {
    let bootstrap = super::open(base_dir, deployment, |config| {
        if options.force {
            config.set("overwrite_existing", true)?;
        }
        if options.require_fresh {
            config.set("require_fresh", true)?;
        }
        if options.abort_on_error {
            config.set("failure_policy", FailurePolicy::Abort)?;
        }
        Ok(())
    })?;

    if options.break_lock && RunLock::break_stale(&bootstrap.paths().base_dir)? {
        println!("{} Removed stale lock", "!".yellow().bold());
    }

    println!(
        "{} credentials for: {}",
        "Generating".green().bold(),
        bootstrap.config().domain.cyan()
    );

    let spinner = progress::spinner("Writing credential files");
    let outcome = bootstrap.run(&mut OsEntropy);
    spinner.finish_and_clear();
    let outcome = outcome.context("Bootstrap failed")?;

    output::print_report(&outcome);
    output::print_documents(&outcome.documents);

    if !outcome.is_success() {
        let failed = outcome.report.failed().len();
        if failed > 0 {
            bail!("{} of {} credentials could not be written", failed, outcome.report.entries().len());
        }
        bail!("Bootstrap incomplete");
    }

    println!("\n{} Deployment ready in {}", "✓".green().bold(), bootstrap.paths().base_dir.display());
    Ok(())
}
