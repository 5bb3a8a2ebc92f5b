//! n8n-bootstrap CLI entry point.

use anyhow::Result;
use bootstrap_core::log::{self, Verbosity};
use clap::Parser;
use colored::Colorize;

mod cli;
mod commands;
mod ui;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose, cli.debug);
    if let Err(e) = log::init(verbosity, cli.log_format.into()) {
        eprintln!("{} {}", "Warning:".yellow().bold(), e);
    }

    match cli.execute() {
        Ok(_) => Ok(()),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}
