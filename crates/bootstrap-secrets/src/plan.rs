//! Secret plan management and execution.

use bootstrap_types::{
    BootstrapError, CredentialStore, EntropySource, FailurePolicy, OverwritePolicy, Result,
    SecretName, ValidationResult,
};
use std::collections::HashSet;
use std::path::PathBuf;
use crate::report::{SecretOutcome, WriteReport};
use crate::spec::{GeneratedSecret, SecretSpec};

/// Validation state of one existing artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckEntry {
    /// Secret name
    pub name: SecretName,
    /// Artifact path
    pub path: PathBuf,
    /// Result of the check
    pub result: ValidationResult,
}

/// Ordered set of secrets to produce, and the policies for producing them.
#[derive(Debug, Clone)]
pub struct SecretPlan {
    specs: Vec<SecretSpec>,
    overwrite: OverwritePolicy,
    failure: FailurePolicy,
    require_fresh: bool,
}

/// What phase one decided for a secret.
enum Decision {
    Generate,
    Done(SecretOutcome),
}

impl SecretPlan {
    /// Create a plan, rejecting duplicate names and invalid definitions.
    pub fn new(specs: Vec<SecretSpec>) -> Result<Self> {
        let mut names = HashSet::new();
        let mut destinations = HashSet::new();

        for spec in &specs {
            spec.validate()?;
            if !names.insert(spec.name.clone()) {
                return Err(BootstrapError::Validation(format!(
                    "Duplicate secret name: {}",
                    spec.name
                )));
            }
            if !destinations.insert(spec.destination.clone()) {
                return Err(BootstrapError::Validation(format!(
                    "Secrets share destination {}",
                    spec.destination.display()
                )));
            }
        }

        Ok(Self {
            specs,
            overwrite: OverwritePolicy::default(),
            failure: FailurePolicy::default(),
            require_fresh: false,
        })
    }

    /// Set the policy for artifacts that already exist.
    pub fn with_overwrite(mut self, overwrite: OverwritePolicy) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Set the policy applied after a failed write.
    pub fn with_failure_policy(mut self, failure: FailurePolicy) -> Self {
        self.failure = failure;
        self
    }

    /// Treat existing artifacts as failures under the skip policy.
    pub fn require_fresh(mut self, require_fresh: bool) -> Self {
        self.require_fresh = require_fresh;
        self
    }

    /// Restrict the plan to the named secrets.
    pub fn only(mut self, names: &[SecretName]) -> Result<Self> {
        if let Some(unknown) = names.iter().find(|n| !self.specs.iter().any(|s| &s.name == *n)) {
            return Err(BootstrapError::Validation(format!("Unknown secret: {}", unknown)));
        }
        self.specs.retain(|s| names.contains(&s.name));
        Ok(self)
    }

    /// The secrets in plan order.
    pub fn specs(&self) -> &[SecretSpec] {
        &self.specs
    }

    /// Get count of secrets.
    pub fn count(&self) -> usize {
        self.specs.len()
    }

    /// Produce and persist every secret.
    ///
    /// Runs in three phases: existence checks, generation of everything that
    /// must be written, then writes. An `Err` is returned only for fatal
    /// errors; generation failures surface before any artifact is touched.
    /// Per-secret failures are recorded in the report.
    pub fn execute(
        &self,
        store: &dyn CredentialStore,
        entropy: &mut dyn EntropySource,
    ) -> Result<WriteReport> {
        let mut report = WriteReport::default();
        let mut halted = false;

        // Phase 1: decide per secret.
        let mut decisions = Vec::with_capacity(self.specs.len());
        for spec in &self.specs {
            if halted {
                decisions.push(Decision::Done(SecretOutcome::NotAttempted));
                continue;
            }

            let decision = self.decide(spec, store, &mut report);
            if matches!(decision, Decision::Done(SecretOutcome::Failed(_))) {
                halted = self.failure == FailurePolicy::Abort;
            }
            decisions.push(decision);
        }

        // Phase 2: generate. Fatal errors abort here, before any write.
        let mut generated = Vec::new();
        for (spec, decision) in self.specs.iter().zip(&decisions) {
            if matches!(decision, Decision::Generate) && !halted {
                generated.push(GeneratedSecret::generate(spec, entropy)?);
            }
        }
        let mut generated = generated.into_iter();

        // Phase 3: write, in plan order.
        for (spec, decision) in self.specs.iter().zip(decisions) {
            let outcome = match decision {
                Decision::Done(outcome) => outcome,
                Decision::Generate if halted => SecretOutcome::NotAttempted,
                Decision::Generate => {
                    let Some(secret) = generated.next() else {
                        bootstrap_types::bug!("no generated value for {}", spec.name);
                    };
                    match store.write(&spec.destination, secret.expose()) {
                        Ok(()) => {
                            tracing::info!("Generated {} ({})", spec.name, spec.kind);
                            tracing::debug!("Wrote {}", spec.destination.display());
                            if spec.disclose {
                                report.disclose(secret);
                            }
                            SecretOutcome::Written
                        }
                        Err(e) => {
                            tracing::warn!("Failed to write {}: {}", spec.name, e);
                            halted = self.failure == FailurePolicy::Abort;
                            SecretOutcome::Failed(e)
                        }
                    }
                }
            };
            report.push(spec, outcome);
        }

        Ok(report)
    }

    fn decide(&self, spec: &SecretSpec, store: &dyn CredentialStore, report: &mut WriteReport) -> Decision {
        let exists = match store.exists(&spec.destination) {
            Ok(exists) => exists,
            Err(e) => {
                tracing::warn!("Cannot inspect {}: {}", spec.destination.display(), e);
                return Decision::Done(SecretOutcome::Failed(e));
            }
        };

        if !exists || self.overwrite == OverwritePolicy::Force {
            if exists {
                tracing::info!("Overwriting existing {}", spec.name);
            }
            return Decision::Generate;
        }

        if self.require_fresh {
            tracing::warn!("{} already exists and a fresh value is required", spec.name);
            return Decision::Done(SecretOutcome::Failed(BootstrapError::ArtifactAlreadyExists {
                path: spec.destination.clone(),
            }));
        }

        if spec.disclose {
            match store.read(&spec.destination) {
                Ok(value) => report.disclose(GeneratedSecret::existing(spec, value)),
                Err(e) => return Decision::Done(SecretOutcome::Failed(e)),
            }
        }

        tracing::info!("Keeping existing {}", spec.name);
        Decision::Done(SecretOutcome::Skipped)
    }

    /// Validate every existing artifact: presence, permissions, and format.
    pub fn check(&self, store: &dyn CredentialStore) -> Result<Vec<CheckEntry>> {
        let mut entries = Vec::with_capacity(self.specs.len());

        for spec in &self.specs {
            let path = &spec.destination;
            let result = if !store.exists(path)? {
                ValidationResult::Missing
            } else {
                let secret = spec.secret()?;
                let mut result = match store.read(path) {
                    Ok(value) => secret.validate_value(&value),
                    Err(e) => ValidationResult::Error(vec![format!("Unreadable: {}", e)]),
                };
                if !store.is_restricted(path)? {
                    result = add_error(result, "Permissions are wider than 0600".to_string());
                }
                result
            };

            entries.push(CheckEntry {
                name: spec.name.clone(),
                path: path.clone(),
                result,
            });
        }

        Ok(entries)
    }
}

// A credential readable beyond its owner fails the check outright.
fn add_error(result: ValidationResult, issue: String) -> ValidationResult {
    match result {
        ValidationResult::Ok => ValidationResult::Error(vec![issue]),
        ValidationResult::Warning(mut e) | ValidationResult::Error(mut e) => {
            e.push(issue);
            ValidationResult::Error(e)
        }
        ValidationResult::Missing => ValidationResult::Missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::{deployment_secrets, ADMIN_PASSWORD};
    use crate::generator::testing::NoEntropy;
    use crate::generator::OsEntropy;
    use crate::store::FileStore;
    use bootstrap_types::SecretKind;
    use mockall::mock;
    use std::collections::HashMap;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    mock! {
        Store {}
        impl CredentialStore for Store {
            fn exists(&self, path: &Path) -> Result<bool>;
            fn read(&self, path: &Path) -> Result<String>;
            fn write(&self, path: &Path, value: &str) -> Result<()>;
            fn is_restricted(&self, path: &Path) -> Result<bool>;
        }
    }

    fn values(dir: &Path) -> HashMap<String, String> {
        deployment_secrets(dir)
            .into_iter()
            .map(|s| (s.name.to_string(), fs::read_to_string(&s.destination).unwrap()))
            .collect()
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut specs = deployment_secrets("/tmp/s");
        let mut dup = specs[0].clone();
        dup.destination = PathBuf::from("/tmp/s/other.txt");
        specs.push(dup);
        assert!(matches!(SecretPlan::new(specs), Err(BootstrapError::Validation(_))));
    }

    #[test]
    fn test_execute_writes_all_and_discloses_admin() {
        let dir = TempDir::new().unwrap();
        let plan = SecretPlan::new(deployment_secrets(dir.path())).unwrap();

        let report = plan.execute(&FileStore, &mut OsEntropy).unwrap();

        assert!(report.is_success());
        assert_eq!(report.written().len(), 6);
        let admin = report.disclosed(ADMIN_PASSWORD).unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("admin_password.txt")).unwrap(),
            admin.expose()
        );
        assert!(report.disclosed("postgres_password").is_none());
    }

    #[test]
    fn test_skip_policy_preserves_values() {
        let dir = TempDir::new().unwrap();
        let plan = SecretPlan::new(deployment_secrets(dir.path())).unwrap();

        plan.execute(&FileStore, &mut OsEntropy).unwrap();
        let first = values(dir.path());

        let report = plan.execute(&FileStore, &mut OsEntropy).unwrap();
        assert!(report.is_success());
        assert_eq!(report.skipped().len(), 6);
        assert_eq!(values(dir.path()), first);
        // The admin password is still available for the summary.
        assert_eq!(
            report.disclosed(ADMIN_PASSWORD).unwrap().expose(),
            first[ADMIN_PASSWORD]
        );
    }

    #[test]
    fn test_force_policy_changes_every_value() {
        let dir = TempDir::new().unwrap();
        let plan = SecretPlan::new(deployment_secrets(dir.path())).unwrap();

        plan.execute(&FileStore, &mut OsEntropy).unwrap();
        let first = values(dir.path());

        let forced = plan.clone().with_overwrite(OverwritePolicy::Force);
        let report = forced.execute(&FileStore, &mut OsEntropy).unwrap();
        assert_eq!(report.written().len(), 6);

        let second = values(dir.path());
        for (name, value) in &first {
            assert_ne!(&second[name], value, "{} was not rotated", name);
        }
    }

    #[test]
    fn test_require_fresh_fails_existing() {
        let dir = TempDir::new().unwrap();
        let plan = SecretPlan::new(deployment_secrets(dir.path())).unwrap();
        plan.execute(&FileStore, &mut OsEntropy).unwrap();

        let report = plan.require_fresh(true).execute(&FileStore, &mut OsEntropy).unwrap();
        assert!(!report.is_success());
        assert_eq!(report.failed().len(), 6);
        assert!(matches!(
            report.entries()[0].outcome,
            SecretOutcome::Failed(BootstrapError::ArtifactAlreadyExists { .. })
        ));
    }

    #[test]
    fn test_generation_failure_writes_nothing() {
        let mut store = MockStore::new();
        store.expect_exists().returning(|_| Ok(false));
        store.expect_write().times(0);

        let plan = SecretPlan::new(deployment_secrets("/srv/secrets")).unwrap();
        let err = plan.execute(&store, &mut NoEntropy).unwrap_err();
        assert!(matches!(err, BootstrapError::GenerationUnavailable(_)));
    }

    #[test]
    fn test_best_effort_attempts_every_secret() {
        let mut store = MockStore::new();
        store.expect_exists().returning(|_| Ok(false));
        store
            .expect_write()
            .times(6)
            .returning(|path, _| Err(BootstrapError::unwritable(path, "Read-only file system")));

        let plan = SecretPlan::new(deployment_secrets("/srv/secrets")).unwrap();
        let report = plan.execute(&store, &mut OsEntropy).unwrap();

        assert_eq!(report.failed().len(), 6);
        assert!(report.present_paths().is_empty());
        assert!(report.disclosed(ADMIN_PASSWORD).is_none());
    }

    #[test]
    fn test_abort_policy_stops_after_first_failure() {
        let mut store = MockStore::new();
        store.expect_exists().returning(|_| Ok(false));
        store
            .expect_write()
            .times(1)
            .returning(|path, _| Err(BootstrapError::unwritable(path, "No space left on device")));

        let plan = SecretPlan::new(deployment_secrets("/srv/secrets"))
            .unwrap()
            .with_failure_policy(FailurePolicy::Abort);
        let report = plan.execute(&store, &mut OsEntropy).unwrap();

        assert_eq!(report.failed().len(), 1);
        let not_attempted = report
            .entries()
            .iter()
            .filter(|e| matches!(e.outcome, SecretOutcome::NotAttempted))
            .count();
        assert_eq!(not_attempted, 5);
        assert_eq!(report.to_string(), "0 written, 0 kept, 1 failed, 5 not attempted");
    }

    #[test]
    fn test_only_filters_and_rejects_unknown() {
        let plan = SecretPlan::new(deployment_secrets("/srv/secrets")).unwrap();
        let name = SecretName::new("jwt_secret").unwrap();
        let only = plan.clone().only(&[name]).unwrap();
        assert_eq!(only.count(), 1);
        assert_eq!(only.specs()[0].kind, SecretKind::HexKey);

        let unknown = SecretName::new("nope").unwrap();
        assert!(plan.only(&[unknown]).is_err());
    }

    #[test]
    fn test_check_reports_missing_invalid_and_loose() {
        let dir = TempDir::new().unwrap();
        let plan = SecretPlan::new(deployment_secrets(dir.path())).unwrap();

        let entries = plan.check(&FileStore).unwrap();
        assert!(entries.iter().all(|e| e.result == ValidationResult::Missing));

        plan.execute(&FileStore, &mut OsEntropy).unwrap();
        let entries = plan.check(&FileStore).unwrap();
        assert!(entries.iter().all(|e| e.result == ValidationResult::Ok));

        fs::write(dir.path().join("encryption_key.txt"), "NOT-HEX").unwrap();
        let entries = plan.check(&FileStore).unwrap();
        let key = entries.iter().find(|e| e.name.as_str() == "encryption_key").unwrap();
        assert!(matches!(key.result, ValidationResult::Error(_)));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let path = dir.path().join("redis_password.txt");
            fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
            let entries = plan.check(&FileStore).unwrap();
            let redis = entries.iter().find(|e| e.name.as_str() == "redis_password").unwrap();
            assert!(matches!(&redis.result, ValidationResult::Error(e) if e[0].contains("0600")));
        }
    }
}
