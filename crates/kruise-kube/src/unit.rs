//! Installable units
//!
//! An [`InstallableUnit`] is one atomic change to the cluster, built fresh
//! from catalog templates for every run. Each variant knows its identity,
//! priority and init phase membership, how to validate itself, and which
//! commands install or remove it.
//!
//! Identity is a SHA-256 digest over the fields that make two units the same
//! change. Priority and the init flag never take part, and neither do secret
//! namespaces: the same secret requested in two namespaces is one unit that
//! is created in both.

use std::fmt;
use std::sync::Arc;

use sha2::{Digest, Sha256};

use kruise_core::{
    ChartSpec, DockerRegistrySecretSpec, GenericSecretSpec, KeyValue, ManifestSpec, RepositorySpec,
};

use crate::command::Tool;
use crate::error::{KubeError, Result};
use crate::helm;
use crate::kubectl::{self, DEFAULT_NAMESPACE, Literal};
use crate::prompt::{self, Credentials, MASKED, Prompter, Question};
use crate::runner::CommandRunner;

fn namespace_or_default(namespace: &str) -> String {
    if namespace.trim().is_empty() {
        DEFAULT_NAMESPACE.to_string()
    } else {
        namespace.to_string()
    }
}

/// A helm repository registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelmRepository {
    pub name: String,
    pub url: String,
    pub private: bool,
    pub init: bool,
}

impl From<&RepositorySpec> for HelmRepository {
    fn from(spec: &RepositorySpec) -> Self {
        Self {
            name: spec.name.clone(),
            url: spec.url.clone(),
            private: spec.private,
            init: spec.init.unwrap_or(true),
        }
    }
}

/// A helm release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelmChart {
    pub chart_name: String,
    pub repo_name: String,
    pub release_name: String,
    pub namespace: String,
    pub version: String,
    pub values: Vec<String>,
    pub set_values: Vec<String>,
    pub install_args: Vec<String>,
    pub uninstall_args: Vec<String>,
    pub priority: i32,
    pub init: bool,
}

impl HelmChart {
    /// `<repo>/<chart>`
    pub fn reference(&self) -> String {
        format!("{}/{}", self.repo_name, self.chart_name)
    }
}

impl From<&ChartSpec> for HelmChart {
    fn from(spec: &ChartSpec) -> Self {
        Self {
            chart_name: spec.chart_name.clone(),
            repo_name: spec.repo_name.clone(),
            release_name: spec.release_name.clone(),
            namespace: namespace_or_default(&spec.namespace),
            version: spec.version.clone(),
            values: spec.values.clone(),
            set_values: spec.set_values.clone(),
            install_args: spec.install_args.clone(),
            uninstall_args: spec.uninstall_args.clone(),
            priority: spec.priority,
            init: spec.init.unwrap_or(false),
        }
    }
}

/// A generic secret, created in every namespace that asked for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericSecret {
    pub name: String,
    pub namespace: String,
    pub literals: Vec<KeyValue>,
    /// Distinct target namespaces, first one is `namespace`
    pub namespaces: Vec<String>,
    pub init: bool,
}

impl From<&GenericSecretSpec> for GenericSecret {
    fn from(spec: &GenericSecretSpec) -> Self {
        let namespace = namespace_or_default(&spec.namespace);
        Self {
            name: spec.name.clone(),
            namespaces: vec![namespace.clone()],
            namespace,
            literals: spec.literal.clone(),
            init: spec.init.unwrap_or(true),
        }
    }
}

/// A docker-registry pull secret, created in every namespace that asked for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockerRegistrySecret {
    pub name: String,
    pub namespace: String,
    pub registry: String,
    pub namespaces: Vec<String>,
    pub init: bool,
}

impl From<&DockerRegistrySecretSpec> for DockerRegistrySecret {
    fn from(spec: &DockerRegistrySecretSpec) -> Self {
        let namespace = namespace_or_default(&spec.namespace);
        Self {
            name: spec.name.clone(),
            namespaces: vec![namespace.clone()],
            namespace,
            registry: spec.registry.clone(),
            init: spec.init.unwrap_or(true),
        }
    }
}

/// Raw manifests applied into one namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub namespace: String,
    pub paths: Vec<String>,
    pub priority: i32,
    pub init: bool,
}

impl From<&ManifestSpec> for Manifest {
    fn from(spec: &ManifestSpec) -> Self {
        Self {
            namespace: namespace_or_default(&spec.namespace),
            paths: spec.paths.clone(),
            priority: spec.priority,
            init: spec.init.unwrap_or(false),
        }
    }
}

/// One atomic change to the cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallableUnit {
    HelmRepository(HelmRepository),
    HelmChart(HelmChart),
    GenericSecret(GenericSecret),
    DockerRegistrySecret(DockerRegistrySecret),
    Manifest(Manifest),
}

/// Feeds length-prefixed fields into a digest
struct IdentityHasher(Sha256);

impl IdentityHasher {
    fn new(kind: &str) -> Self {
        let mut hasher = Self(Sha256::new());
        hasher.field(kind);
        hasher
    }

    fn field(&mut self, value: &str) -> &mut Self {
        self.0.update((value.len() as u64).to_le_bytes());
        self.0.update(value.as_bytes());
        self
    }

    fn list<S: AsRef<str>>(&mut self, values: &[S]) -> &mut Self {
        self.0.update((values.len() as u64).to_le_bytes());
        for value in values {
            self.field(value.as_ref());
        }
        self
    }

    fn flag(&mut self, value: bool) -> &mut Self {
        self.0.update([u8::from(value)]);
        self
    }

    fn finish(self) -> String {
        hex::encode(self.0.finalize())
    }
}

impl InstallableUnit {
    /// Stable fingerprint of the fields that make two units the same change
    pub fn identity_hash(&self) -> String {
        match self {
            InstallableUnit::HelmRepository(repo) => {
                let mut hasher = IdentityHasher::new("helm-repository");
                hasher.field(&repo.name).field(&repo.url).flag(repo.private);
                hasher.finish()
            }
            InstallableUnit::HelmChart(chart) => {
                let mut hasher = IdentityHasher::new("helm-chart");
                hasher
                    .field(&chart.repo_name)
                    .field(&chart.chart_name)
                    .field(&chart.release_name)
                    .field(&chart.namespace)
                    .field(&chart.version)
                    .list(&chart.values)
                    .list(&chart.set_values)
                    .list(&chart.install_args)
                    .list(&chart.uninstall_args);
                hasher.finish()
            }
            InstallableUnit::GenericSecret(secret) => {
                let mut hasher = IdentityHasher::new("generic-secret");
                hasher.field(&secret.name);
                hasher.0.update((secret.literals.len() as u64).to_le_bytes());
                for literal in &secret.literals {
                    hasher.field(&literal.key).field(&literal.value);
                }
                hasher.finish()
            }
            InstallableUnit::DockerRegistrySecret(secret) => {
                let mut hasher = IdentityHasher::new("docker-registry-secret");
                hasher.field(&secret.name).field(&secret.registry);
                hasher.finish()
            }
            InstallableUnit::Manifest(manifest) => {
                let mut hasher = IdentityHasher::new("manifest");
                hasher.field(&manifest.namespace).list(&manifest.paths);
                hasher.finish()
            }
        }
    }

    /// Position in the install order, lower runs first
    pub fn priority(&self) -> i32 {
        match self {
            InstallableUnit::HelmChart(chart) => chart.priority,
            InstallableUnit::Manifest(manifest) => manifest.priority,
            InstallableUnit::HelmRepository(_)
            | InstallableUnit::GenericSecret(_)
            | InstallableUnit::DockerRegistrySecret(_) => 0,
        }
    }

    /// Whether the unit belongs to the init phase
    pub fn is_init(&self) -> bool {
        match self {
            InstallableUnit::HelmRepository(repo) => repo.init,
            InstallableUnit::HelmChart(chart) => chart.init,
            InstallableUnit::GenericSecret(secret) => secret.init,
            InstallableUnit::DockerRegistrySecret(secret) => secret.init,
            InstallableUnit::Manifest(manifest) => manifest.init,
        }
    }

    pub fn is_repository(&self) -> bool {
        matches!(self, InstallableUnit::HelmRepository(_))
    }

    /// External tool the unit drives
    pub fn tool(&self) -> Tool {
        match self {
            InstallableUnit::HelmRepository(_) | InstallableUnit::HelmChart(_) => Tool::Helm,
            InstallableUnit::GenericSecret(_)
            | InstallableUnit::DockerRegistrySecret(_)
            | InstallableUnit::Manifest(_) => Tool::Kubectl,
        }
    }

    /// Namespaces a secret unit targets
    pub fn namespaces(&self) -> &[String] {
        match self {
            InstallableUnit::GenericSecret(secret) => &secret.namespaces,
            InstallableUnit::DockerRegistrySecret(secret) => &secret.namespaces,
            _ => &[],
        }
    }

    /// Fold another request for the same secret into this one
    ///
    /// Returns `false` for units that are not secrets.
    pub fn merge_namespaces(&mut self, other: &InstallableUnit) -> bool {
        let namespaces = match self {
            InstallableUnit::GenericSecret(secret) => &mut secret.namespaces,
            InstallableUnit::DockerRegistrySecret(secret) => &mut secret.namespaces,
            _ => return false,
        };
        for namespace in other.namespaces() {
            if !namespaces.contains(namespace) {
                namespaces.push(namespace.clone());
            }
        }
        true
    }

    /// Check the fields the unit cannot run without
    pub fn validate(&self) -> Result<()> {
        let missing = |field: &str| -> Result<()> {
            Err(KubeError::InvalidConfig(format!("{} requires {}", self, field)))
        };

        match self {
            InstallableUnit::HelmRepository(repo) => {
                if repo.name.trim().is_empty() {
                    return missing("a name");
                }
                if repo.url.trim().is_empty() {
                    return missing("a url");
                }
            }
            InstallableUnit::HelmChart(chart) => {
                if chart.chart_name.trim().is_empty() {
                    return missing("a chartName");
                }
                if chart.repo_name.trim().is_empty() {
                    return missing("a repoName");
                }
                if chart.release_name.trim().is_empty() {
                    return missing("a releaseName");
                }
            }
            InstallableUnit::GenericSecret(secret) => {
                if secret.name.trim().is_empty() {
                    return missing("a name");
                }
            }
            InstallableUnit::DockerRegistrySecret(secret) => {
                if secret.name.trim().is_empty() {
                    return missing("a name");
                }
                if secret.registry.trim().is_empty() {
                    return missing("a registry");
                }
            }
            InstallableUnit::Manifest(manifest) => {
                if manifest.paths.iter().all(|p| p.trim().is_empty()) {
                    return missing("at least one path");
                }
            }
        }
        Ok(())
    }

    /// Apply the unit to the cluster
    ///
    /// During a dry run credentials are replaced by `***` and the prompter is
    /// never called.
    pub async fn install(
        &self,
        runner: &dyn CommandRunner,
        prompter: &Arc<dyn Prompter>,
        dry_run: bool,
    ) -> Result<()> {
        match self {
            InstallableUnit::HelmRepository(repo) => {
                let credentials = if !repo.private {
                    None
                } else if dry_run {
                    Some(Credentials::masked())
                } else {
                    Some(prompt::ask_credentials(prompter, &format!("helm repository '{}'", repo.name)).await?)
                };
                runner.run(&helm::repo_add(repo, credentials.as_ref())).await?;
            }
            InstallableUnit::HelmChart(chart) => {
                runner.run(&helm::upgrade_install(chart)).await?;
            }
            InstallableUnit::Manifest(manifest) => {
                ensure_namespace(runner, &manifest.namespace).await;
                runner.run(&kubectl::apply(manifest)).await?;
            }
            InstallableUnit::GenericSecret(secret) => {
                let literals = secret_literals(secret, prompter, dry_run).await?;
                for_each_namespace(&secret.namespaces, |namespace| {
                    let create = kubectl::create_generic_secret(&secret.name, namespace, &literals);
                    recreate_secret(runner, &secret.name, namespace, create)
                })
                .await?;
            }
            InstallableUnit::DockerRegistrySecret(secret) => {
                let credentials = if dry_run {
                    Credentials::masked()
                } else {
                    prompt::ask_credentials(prompter, &format!("docker registry '{}'", secret.registry))
                        .await?
                };
                for_each_namespace(&secret.namespaces, |namespace| {
                    let create = kubectl::create_docker_registry_secret(
                        &secret.name,
                        namespace,
                        &secret.registry,
                        &credentials,
                    );
                    recreate_secret(runner, &secret.name, namespace, create)
                })
                .await?;
            }
        }
        Ok(())
    }

    /// Remove the unit from the cluster
    pub async fn uninstall(&self, runner: &dyn CommandRunner) -> Result<()> {
        match self {
            InstallableUnit::HelmRepository(repo) => {
                runner.run(&helm::repo_remove(repo)).await?;
            }
            InstallableUnit::HelmChart(chart) => {
                runner.run(&helm::uninstall(chart)).await?;
            }
            InstallableUnit::Manifest(manifest) => {
                runner.run(&kubectl::delete(manifest)).await?;
            }
            InstallableUnit::GenericSecret(GenericSecret { name, namespaces, .. })
            | InstallableUnit::DockerRegistrySecret(DockerRegistrySecret { name, namespaces, .. }) => {
                for_each_namespace(namespaces, |namespace| async move {
                    runner.run(&kubectl::delete_secret(name, namespace)).await.map(|_| ())
                })
                .await?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for InstallableUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallableUnit::HelmRepository(repo) => write!(f, "helm repository '{}'", repo.name),
            InstallableUnit::HelmChart(chart) => write!(
                f,
                "helm chart '{}' ({})",
                chart.release_name,
                chart.reference()
            ),
            InstallableUnit::GenericSecret(secret) => write!(f, "generic secret '{}'", secret.name),
            InstallableUnit::DockerRegistrySecret(secret) => {
                write!(f, "docker-registry secret '{}'", secret.name)
            }
            InstallableUnit::Manifest(manifest) => write!(
                f,
                "manifest {} in '{}'",
                manifest.paths.join(", "),
                manifest.namespace
            ),
        }
    }
}

/// Resolve literal values, prompting once for every empty one
///
/// All prompts of one secret are asked as a single block.
async fn secret_literals(
    secret: &GenericSecret,
    prompter: &Arc<dyn Prompter>,
    dry_run: bool,
) -> Result<Vec<Literal>> {
    let questions = if dry_run {
        Vec::new()
    } else {
        secret
            .literals
            .iter()
            .filter(|kv| kv.value.is_empty())
            .map(|kv| Question::hidden(format!("Enter the value for '{}' in secret '{}': ", kv.key, secret.name)))
            .collect()
    };
    let mut answers = prompt::ask_all(prompter, questions).await?.into_iter();

    let mut literals = Vec::with_capacity(secret.literals.len());
    for kv in &secret.literals {
        let (value, prompted) = if !kv.value.is_empty() {
            (kv.value.clone(), false)
        } else if dry_run {
            (MASKED.to_string(), true)
        } else {
            let value = answers
                .next()
                .ok_or_else(|| KubeError::Prompt(format!("no value for '{}'", kv.key)))?;
            (value, true)
        };
        literals.push(Literal {
            key: kv.key.clone(),
            value,
            prompted,
        });
    }
    Ok(literals)
}

/// Run `step` for every namespace, returning the most serious failure after all ran
///
/// A "not found" from one namespace never masks a different failure from another.
async fn for_each_namespace<'a, F, Fut>(namespaces: &'a [String], mut step: F) -> Result<()>
where
    F: FnMut(&'a str) -> Fut,
    Fut: std::future::Future<Output = Result<()>>,
{
    let mut failures = Vec::new();
    for namespace in namespaces {
        if let Err(e) = step(namespace.as_str()).await {
            failures.push((namespace.as_str(), e));
        }
    }
    if failures.is_empty() {
        return Ok(());
    }
    let worst = failures
        .iter()
        .position(|(_, e)| e.is_fatal())
        .or_else(|| failures.iter().position(|(_, e)| !e.is_not_found()))
        .unwrap_or(0);
    let (_, error) = failures.remove(worst);
    for (namespace, e) in &failures {
        tracing::warn!("Namespace '{}' also failed: {}", namespace, e);
    }
    Err(error)
}

/// Create the namespace, ignoring "already exists"
async fn ensure_namespace(runner: &dyn CommandRunner, namespace: &str) {
    if namespace == DEFAULT_NAMESPACE {
        return;
    }
    if let Err(e) = runner.run(&kubectl::create_namespace(namespace)).await {
        tracing::debug!("Namespace '{}' not created: {}", namespace, e);
    }
}

/// Replace any existing copy of a secret
async fn recreate_secret(
    runner: &dyn CommandRunner,
    name: &str,
    namespace: &str,
    create: crate::command::Command,
) -> Result<()> {
    ensure_namespace(runner, namespace).await;
    if let Err(e) = runner
        .run(&kubectl::delete_secret(name, namespace).quiet())
        .await
    {
        tracing::debug!("Secret '{}' not deleted from '{}': {}", name, namespace, e);
    }
    runner.run(&create).await?;
    Ok(())
}
