//! End-to-end bootstrap of a deployment directory.

use bootstrap_core::util::fs::resolve_path;
use bootstrap_core::util::RunLock;
use bootstrap_secrets::catalogue::ADMIN_PASSWORD;
use bootstrap_secrets::{
    deployment_secrets, CheckEntry, FileStore, GeneratedSecret, SecretPlan, SecretSpec, WriteReport,
};
use bootstrap_types::{
    BootstrapConfig, BootstrapError, CredentialStore, EntropySource, OverwritePolicy, Result,
    SecretName,
};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use crate::defaults::Defaults;
use crate::document::{render, EnvironmentDocument};
use crate::inputs::DeploymentInputs;
use crate::materialize::{materialize, Materialized, Targets};

/// Resolved locations of everything a run touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapPaths {
    /// Deployment directory
    pub base_dir: PathBuf,
    /// Credential artifact directory
    pub secrets_dir: PathBuf,
    /// Environment document
    pub env_file: PathBuf,
    /// Disclosure summary
    pub summary_file: PathBuf,
}

impl BootstrapPaths {
    /// Resolve configured paths against the deployment directory.
    pub fn resolve(base_dir: impl AsRef<Path>, config: &BootstrapConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        Self {
            secrets_dir: resolve_path(&base_dir, &config.secrets_dir),
            env_file: resolve_path(&base_dir, &config.env_file),
            summary_file: resolve_path(&base_dir, &config.summary_file),
            base_dir,
        }
    }

    fn targets(&self) -> Targets {
        Targets {
            env_file: self.env_file.clone(),
            summary_file: self.summary_file.clone(),
        }
    }
}

/// What happened to the environment document and summary.
#[derive(Debug)]
pub enum Documents {
    /// Both were written
    Written(Materialized),
    /// Not attempted because some credential artifact is missing
    Blocked,
    /// Writing failed; neither document was left behind
    Failed(BootstrapError),
}

/// Result of a generate or rotate run.
#[derive(Debug)]
pub struct RunOutcome {
    /// Per-secret results
    pub report: WriteReport,
    /// Document results
    pub documents: Documents,
}

impl RunOutcome {
    /// True when every secret is present and both documents were written.
    pub fn is_success(&self) -> bool {
        self.report.is_success() && matches!(self.documents, Documents::Written(_))
    }
}

/// A deployment directory with its merged configuration.
#[derive(Debug, Clone)]
pub struct Bootstrap {
    config: BootstrapConfig,
    paths: BootstrapPaths,
}

impl Bootstrap {
    /// Bind a configuration to a deployment directory.
    pub fn new(base_dir: impl AsRef<Path>, config: BootstrapConfig) -> Self {
        let paths = BootstrapPaths::resolve(base_dir, &config);
        Self { config, paths }
    }

    /// Resolved paths.
    pub fn paths(&self) -> &BootstrapPaths {
        &self.paths
    }

    /// Merged configuration.
    pub fn config(&self) -> &BootstrapConfig {
        &self.config
    }

    /// The catalogue secrets at their configured locations.
    pub fn secrets(&self) -> Vec<SecretSpec> {
        deployment_secrets(&self.paths.secrets_dir)
    }

    /// Secret plan honouring the configured policies.
    pub fn plan(&self) -> Result<SecretPlan> {
        Ok(SecretPlan::new(self.secrets())?
            .with_overwrite(OverwritePolicy::from(self.config.overwrite_existing))
            .with_failure_policy(self.config.failure_policy)
            .require_fresh(self.config.require_fresh))
    }

    /// Generate and persist missing secrets, then write both documents.
    ///
    /// The documents are only written when every secret is present.
    pub fn run(&self, entropy: &mut dyn EntropySource) -> Result<RunOutcome> {
        self.run_with(&FileStore, entropy)
    }

    /// [`Bootstrap::run`] against an arbitrary credential store.
    pub fn run_with(
        &self,
        store: &dyn CredentialStore,
        entropy: &mut dyn EntropySource,
    ) -> Result<RunOutcome> {
        let _lock = self.lock()?;
        let report = self.plan()?.execute(store, entropy)?;
        tracing::info!("Secrets: {}", report);
        self.finish(store, report)
    }

    /// Regenerate the named secrets, then refresh both documents.
    pub fn rotate(&self, names: &[SecretName], entropy: &mut dyn EntropySource) -> Result<RunOutcome> {
        let _lock = self.lock()?;
        let report = self
            .plan()?
            .with_overwrite(OverwritePolicy::Force)
            .require_fresh(false)
            .only(names)?
            .execute(&FileStore, entropy)?;
        tracing::info!("Rotation: {}", report);
        self.finish(&FileStore, report)
    }

    /// Rewrite both documents from artifacts already on disk.
    pub fn render_existing(&self) -> Result<Materialized> {
        let _lock = self.lock()?;
        self.render_from_store(&FileStore)
    }

    /// Validate the artifacts on disk without changing anything.
    pub fn check(&self) -> Result<Vec<CheckEntry>> {
        self.plan()?.check(&FileStore)
    }

    /// Build the environment document for the given artifact paths.
    pub fn document(&self, artifacts: &BTreeMap<SecretName, PathBuf>) -> Result<EnvironmentDocument> {
        let references = self.references(artifacts);
        render(
            &DeploymentInputs::from_config(&self.config),
            &references,
            &Defaults::from_config(&self.config),
        )
    }

    fn lock(&self) -> Result<RunLock> {
        if !self.paths.base_dir.is_dir() {
            return Err(BootstrapError::Config(format!(
                "Deployment directory does not exist: {}",
                self.paths.base_dir.display()
            )));
        }
        RunLock::acquire(&self.paths.base_dir)
    }

    fn finish(&self, store: &dyn CredentialStore, report: WriteReport) -> Result<RunOutcome> {
        if !report.is_success() {
            tracing::warn!("Not writing documents: some credential artifacts are missing");
            return Ok(RunOutcome {
                report,
                documents: Documents::Blocked,
            });
        }

        let documents = match self.render_from_report(store, &report) {
            Ok(written) => {
                self.update_gitignore();
                Documents::Written(written)
            }
            Err(e) => Documents::Failed(e),
        };
        Ok(RunOutcome { report, documents })
    }

    fn render_from_report(
        &self,
        store: &dyn CredentialStore,
        report: &WriteReport,
    ) -> Result<Materialized> {
        let secrets = self.secrets();
        let artifacts = report.present_paths();
        let complete = secrets.iter().all(|s| artifacts.contains_key(&s.name));

        match report.disclosed(ADMIN_PASSWORD) {
            Some(admin) if complete => {
                let doc = self.document(&artifacts)?;
                materialize(&doc, &secrets, admin, &self.paths.targets())
            }
            // A rotation only reports the secrets it touched.
            _ => self.render_from_store(store),
        }
    }

    fn render_from_store(&self, store: &dyn CredentialStore) -> Result<Materialized> {
        let secrets = self.secrets();

        let mut missing = Vec::new();
        for spec in &secrets {
            if !store.exists(&spec.destination)? {
                missing.push(spec.name.to_string());
            }
        }
        if !missing.is_empty() {
            return Err(BootstrapError::Validation(format!(
                "Missing credential artifacts: {}; run generate first",
                missing.join(", ")
            )));
        }

        let admin_spec = secrets
            .iter()
            .find(|s| s.name.as_str() == ADMIN_PASSWORD)
            .ok_or_else(|| BootstrapError::Bug("admin password not in catalogue".to_string()))?;
        let admin = GeneratedSecret::existing(admin_spec, store.read(&admin_spec.destination)?);

        let doc = self.document(&self.artifacts())?;
        materialize(&doc, &secrets, &admin, &self.paths.targets())
    }

    fn artifacts(&self) -> BTreeMap<SecretName, PathBuf> {
        self.secrets()
            .into_iter()
            .map(|s| (s.name, s.destination))
            .collect()
    }

    /// Paths as the services will see them.
    fn references(&self, artifacts: &BTreeMap<SecretName, PathBuf>) -> BTreeMap<SecretName, PathBuf> {
        match &self.config.secrets_mount_path {
            Some(mount) => self
                .secrets()
                .into_iter()
                .filter(|spec| artifacts.contains_key(&spec.name))
                .map(|spec| {
                    let relocated = spec.relocated(mount);
                    (relocated.name, relocated.destination)
                })
                .collect(),
            None => artifacts.clone(),
        }
    }

    fn update_gitignore(&self) {
        let entries: Vec<String> = [
            (&self.paths.secrets_dir, true),
            (&self.paths.env_file, false),
            (&self.paths.summary_file, false),
        ]
        .iter()
        .filter_map(|(path, is_dir)| {
            let relative = path.strip_prefix(&self.paths.base_dir).ok()?;
            let relative = relative.to_str()?;
            Some(if *is_dir {
                format!("/{}/", relative)
            } else {
                format!("/{}", relative)
            })
        })
        .collect();

        if let Err(e) = ensure_gitignore(&self.paths.base_dir, &entries) {
            tracing::warn!("Could not update .gitignore: {}", e);
        }
    }
}

/// Append entries missing from `<dir>/.gitignore`.
///
/// Returns the entries that were added.
pub fn ensure_gitignore(dir: impl AsRef<Path>, entries: &[String]) -> Result<Vec<String>> {
    let path = dir.as_ref().join(".gitignore");
    let existing = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };

    let present: Vec<&str> = existing.lines().map(str::trim).collect();
    let missing: Vec<String> = entries
        .iter()
        .filter(|entry| !present.contains(&entry.as_str()))
        .cloned()
        .collect();
    if missing.is_empty() {
        return Ok(missing);
    }

    let mut block = String::new();
    if !existing.is_empty() && !existing.ends_with('\n') {
        block.push('\n');
    }
    block.push_str("# n8n-bootstrap: credentials and generated configuration\n");
    for entry in &missing {
        block.push_str(entry);
        block.push('\n');
    }

    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    file.write_all(block.as_bytes())?;
    tracing::debug!("Added {} entries to {}", missing.len(), path.display());
    Ok(missing)
}
