//! # Bootstrap Environment
//!
//! Turns operator inputs and credential artifact paths into the files the
//! orchestrator consumes:
//! - The environment document (`.env`), which references secrets only by path
//! - The disclosure summary, the single artifact allowed a raw secret value
//! - The end-to-end pipeline: lock, generate, persist, render

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod defaults;
pub mod document;
pub mod inputs;
pub mod materialize;
pub mod pipeline;

// Re-export main types
pub use defaults::Defaults;
pub use document::{render, EnvValue, EnvironmentDocument, Group};
pub use inputs::DeploymentInputs;
pub use materialize::{
    materialize, materialize_disclosure_summary, materialize_env_file, stage_disclosure_summary,
    stage_env_file, Materialized, Targets,
};
pub use pipeline::{Bootstrap, BootstrapPaths, Documents, RunOutcome};
