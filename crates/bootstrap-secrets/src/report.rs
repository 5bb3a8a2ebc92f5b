//! Itemized outcome of a plan execution.

use bootstrap_types::{BootstrapError, SecretKind, SecretName};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use crate::spec::{GeneratedSecret, SecretSpec};

/// What happened to one secret.
#[derive(Debug)]
pub enum SecretOutcome {
    /// A fresh value was generated and persisted
    Written,
    /// The existing artifact was preserved
    Skipped,
    /// The secret could not be produced or persisted
    Failed(BootstrapError),
    /// An earlier failure stopped the run before this secret
    NotAttempted,
}

impl SecretOutcome {
    /// Whether the artifact exists after the run.
    pub fn is_present(&self) -> bool {
        matches!(self, SecretOutcome::Written | SecretOutcome::Skipped)
    }
}

impl fmt::Display for SecretOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretOutcome::Written => write!(f, "written"),
            SecretOutcome::Skipped => write!(f, "kept existing"),
            SecretOutcome::Failed(e) => write!(f, "failed: {}", e),
            SecretOutcome::NotAttempted => write!(f, "not attempted"),
        }
    }
}

/// Outcome for one secret.
#[derive(Debug)]
pub struct ReportEntry {
    /// Secret name
    pub name: SecretName,
    /// Secret kind
    pub kind: SecretKind,
    /// Artifact path
    pub path: PathBuf,
    /// What happened
    pub outcome: SecretOutcome,
}

/// Per-secret results of a run, in plan order.
///
/// Also carries the values marked for disclosure, so they can reach the
/// summary without being read back from disk.
#[derive(Debug, Default)]
pub struct WriteReport {
    entries: Vec<ReportEntry>,
    disclosed: Vec<GeneratedSecret>,
}

impl WriteReport {
    pub(crate) fn push(&mut self, spec: &SecretSpec, outcome: SecretOutcome) {
        self.entries.push(ReportEntry {
            name: spec.name.clone(),
            kind: spec.kind,
            path: spec.destination.clone(),
            outcome,
        });
    }

    pub(crate) fn disclose(&mut self, secret: GeneratedSecret) {
        self.disclosed.push(secret);
    }

    /// All entries in plan order.
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// True when every secret is present after the run.
    pub fn is_success(&self) -> bool {
        self.entries.iter().all(|e| e.outcome.is_present())
    }

    /// Names of freshly written secrets.
    pub fn written(&self) -> Vec<&SecretName> {
        self.filter(|o| matches!(o, SecretOutcome::Written))
    }

    /// Names of preserved secrets.
    pub fn skipped(&self) -> Vec<&SecretName> {
        self.filter(|o| matches!(o, SecretOutcome::Skipped))
    }

    /// Failed entries.
    pub fn failed(&self) -> Vec<&ReportEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, SecretOutcome::Failed(_)))
            .collect()
    }

    /// Paths of artifacts known to exist, keyed by name.
    ///
    /// Only these may be referenced by the environment document.
    pub fn present_paths(&self) -> BTreeMap<SecretName, PathBuf> {
        self.entries
            .iter()
            .filter(|e| e.outcome.is_present())
            .map(|e| (e.name.clone(), e.path.clone()))
            .collect()
    }

    /// A disclosed value by name.
    pub fn disclosed(&self, name: &str) -> Option<&GeneratedSecret> {
        self.disclosed.iter().find(|s| s.spec().name.as_str() == name)
    }

    fn filter(&self, pred: impl Fn(&SecretOutcome) -> bool) -> Vec<&SecretName> {
        self.entries
            .iter()
            .filter(|e| pred(&e.outcome))
            .map(|e| &e.name)
            .collect()
    }
}

impl fmt::Display for WriteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} written, {} kept, {} failed, {} not attempted",
            self.written().len(),
            self.skipped().len(),
            self.failed().len(),
            self.entries
                .iter()
                .filter(|e| matches!(e.outcome, SecretOutcome::NotAttempted))
                .count()
        )
    }
}
