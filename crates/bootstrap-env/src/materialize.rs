//! Writing the environment document and the disclosure summary.

use bootstrap_core::util::fs::{remove_if_exists, stage_restricted, StagedFile};
use bootstrap_secrets::{GeneratedSecret, SecretSpec};
use bootstrap_types::{BootstrapError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use crate::document::EnvironmentDocument;

/// Where the two documents go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Targets {
    /// Environment document path
    pub env_file: PathBuf,
    /// Disclosure summary path
    pub summary_file: PathBuf,
}

/// Paths of documents that were written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Materialized {
    /// Environment document
    pub env_file: PathBuf,
    /// Disclosure summary
    pub summary_file: PathBuf,
}

/// Stage the environment document next to `path` without making it visible.
pub fn stage_env_file(doc: &EnvironmentDocument, path: impl AsRef<Path>) -> Result<StagedFile> {
    stage_restricted(path, doc.to_env_string().as_bytes())
}

/// Stage the disclosure summary next to `path` without making it visible.
///
/// Only `admin` is written in the clear; every other secret is listed by path.
pub fn stage_disclosure_summary(
    doc: &EnvironmentDocument,
    secrets: &[SecretSpec],
    admin: &GeneratedSecret,
    path: impl AsRef<Path>,
) -> Result<StagedFile> {
    let summary = render_disclosure_summary(doc, secrets, admin, Utc::now());
    stage_restricted(path, summary.as_bytes())
}

/// Write the environment document atomically with owner-only permissions.
pub fn materialize_env_file(doc: &EnvironmentDocument, path: impl AsRef<Path>) -> Result<PathBuf> {
    let written = stage_env_file(doc, path)?.commit()?;
    tracing::info!("Wrote environment file {}", written.display());
    Ok(written)
}

/// Write the disclosure summary atomically with owner-only permissions.
pub fn materialize_disclosure_summary(
    doc: &EnvironmentDocument,
    secrets: &[SecretSpec],
    admin: &GeneratedSecret,
    path: impl AsRef<Path>,
) -> Result<PathBuf> {
    let written = stage_disclosure_summary(doc, secrets, admin, path)?.commit()?;
    tracing::info!("Wrote credential summary {}", written.display());
    Ok(written)
}

/// Write both documents, or neither.
///
/// Both files are staged before either becomes visible. If the second
/// rename fails, the environment file is put back the way it was: the
/// previous contents are restored, or the new file is removed when there
/// was none.
pub fn materialize(
    doc: &EnvironmentDocument,
    secrets: &[SecretSpec],
    admin: &GeneratedSecret,
    targets: &Targets,
) -> Result<Materialized> {
    let env_staged = stage_env_file(doc, &targets.env_file)?;
    let summary_staged = stage_disclosure_summary(doc, secrets, admin, &targets.summary_file)?;
    let previous = stage_previous(&targets.env_file)?;

    let env_file = env_staged.commit()?;
    let summary_file = match summary_staged.commit() {
        Ok(path) => path,
        Err(e) => {
            tracing::error!(
                "Could not write {}; rolling back {}",
                targets.summary_file.display(),
                env_file.display()
            );
            let rollback = match previous {
                Some(staged) => staged.commit().map(|_| ()),
                None => remove_if_exists(&env_file),
            };
            if let Err(cleanup) = rollback {
                tracing::warn!("Failed to roll back {}: {}", env_file.display(), cleanup);
            }
            return Err(e);
        }
    };

    tracing::info!("Wrote environment file {}", env_file.display());
    tracing::info!("Wrote credential summary {}", summary_file.display());
    Ok(Materialized { env_file, summary_file })
}

/// Copy of the current file at `path`, staged so it can be put back.
fn stage_previous(path: &Path) -> Result<Option<StagedFile>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(stage_restricted(path, &bytes)?)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(BootstrapError::unwritable(path, e)),
    }
}

/// Text of the disclosure summary.
pub fn render_disclosure_summary(
    doc: &EnvironmentDocument,
    secrets: &[SecretSpec],
    admin: &GeneratedSecret,
    generated_at: DateTime<Utc>,
) -> String {
    let url = doc.plain("WEBHOOK_URL").unwrap_or_default();
    let contact = doc.plain("ACME_EMAIL").unwrap_or_default();
    let user = doc.plain("N8N_BASIC_AUTH_USER").unwrap_or("admin");

    let mut out = String::new();
    out.push_str("# n8n deployment credentials\n");
    out.push_str("#\n");
    out.push_str("# SENSITIVE: this file contains a plaintext password.\n");
    out.push_str("# Never commit it to version control. Delete it once the\n");
    out.push_str("# password is stored in a password manager.\n");
    out.push('\n');
    out.push_str(&format!(
        "Generated: {}\n",
        generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    ));
    out.push_str(&format!("URL:       {}\n", url));
    out.push_str(&format!("Contact:   {}\n", contact));
    out.push('\n');
    out.push_str("Admin login\n");
    out.push_str(&format!("  User:     {}\n", user));
    out.push_str(&format!("  Password: {}\n", admin.expose()));
    out.push('\n');
    out.push_str("Credential files\n");

    let width = secrets.iter().map(|s| s.name.as_str().len()).max().unwrap_or(0);
    for spec in secrets {
        out.push_str(&format!(
            "  {:<width$}  {:<26}  {}\n",
            spec.name.as_str(),
            spec.kind.describe(spec.length),
            spec.destination.display(),
            width = width
        ));
    }
    out
}
