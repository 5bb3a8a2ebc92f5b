//! # Bootstrap Secrets
//!
//! Secret generation, owner-only persistence, and plan execution.
//!
//! Provides:
//! - Password and hex-key generation from the OS CSPRNG, with no weak fallback
//! - The six-secret catalogue of a queue-mode n8n deployment
//! - A file-backed credential store writing atomically with mode `0600`
//! - Plan execution with skip/force overwrite and an itemized write report

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalogue;
pub mod generator;
pub mod plan;
pub mod report;
pub mod spec;
pub mod store;
pub mod types;

pub use catalogue::deployment_secrets;
pub use generator::{generate_hex_key, generate_password, OsEntropy};
pub use plan::{CheckEntry, SecretPlan};
pub use report::{ReportEntry, SecretOutcome, WriteReport};
pub use spec::{GeneratedSecret, SecretSpec};
pub use store::FileStore;
pub use types::*;
