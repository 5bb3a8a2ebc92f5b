//! CLI structure and command definitions.

use anyhow::Result;
use bootstrap_core::log::LogFormat;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "n8n-bootstrap")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Generate credentials and environment for a queue-mode n8n deployment", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Deployment directory holding bootstrap.yml and the generated files
    #[arg(short = 'C', long, global = true, default_value = ".")]
    pub base_dir: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log format on stderr
    #[arg(long, global = true, value_enum, default_value_t = LogFormatArg::Compact)]
    pub log_format: LogFormatArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Compact,
    Pretty,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

/// Settings that override bootstrap.yml for one invocation.
#[derive(Debug, Clone, Default, Args)]
pub struct DeploymentArgs {
    /// Public domain of the n8n instance
    #[arg(long)]
    pub domain: Option<String>,

    /// Contact email for TLS certificates
    #[arg(long)]
    pub email: Option<String>,

    /// Directory for credential files
    #[arg(long)]
    pub secrets_dir: Option<PathBuf>,

    /// Timezone for schedules
    #[arg(long)]
    pub timezone: Option<String>,

    /// Path at which services see the credential files
    #[arg(long)]
    pub mount_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate missing credentials and write .env and the credential summary
    Generate {
        #[command(flatten)]
        deployment: DeploymentArgs,

        /// Replace existing credentials
        #[arg(short, long)]
        force: bool,

        /// Fail instead of keeping existing credentials
        #[arg(long, conflicts_with = "force")]
        require_fresh: bool,

        /// Stop at the first failed credential
        #[arg(long)]
        abort_on_error: bool,

        /// Remove a lock left behind by an interrupted run
        #[arg(long)]
        break_lock: bool,
    },

    /// Check credential files without changing anything
    Check {
        #[command(flatten)]
        deployment: DeploymentArgs,
    },

    /// Regenerate selected credentials and refresh the generated files
    Rotate {
        /// Credential to rotate (repeatable; all if omitted)
        #[arg(short, long = "secret", value_name = "NAME")]
        secrets: Vec<String>,

        #[command(flatten)]
        deployment: DeploymentArgs,

        /// Skip confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Rewrite .env and the credential summary from existing credentials
    Render {
        #[command(flatten)]
        deployment: DeploymentArgs,
    },
}

impl Cli {
    pub fn execute(&self) -> Result<()> {
        use crate::commands::*;

        let base_dir = self.base_dir.as_path();
        match &self.command {
            Commands::Generate {
                deployment,
                force,
                require_fresh,
                abort_on_error,
                break_lock,
            } => generate::execute(
                base_dir,
                deployment,
                generate::Options {
                    force: *force,
                    require_fresh: *require_fresh,
                    abort_on_error: *abort_on_error,
                    break_lock: *break_lock,
                },
            ),
            Commands::Check { deployment } => check::execute(base_dir, deployment),
            Commands::Rotate {
                secrets,
                deployment,
                yes,
            } => rotate::execute(base_dir, deployment, secrets, *yes),
            Commands::Render { deployment } => render::execute(base_dir, deployment),
        }
    }
}
