//! Installer expansion and deduplication
//!
//! Turns resolved deployment names into installable units. Units are keyed
//! by identity hash in insertion order: the first occurrence wins, except
//! that a repeated secret adds its namespace to the first occurrence.

use indexmap::IndexMap;
use indexmap::map::Entry;

use kruise_core::{Catalog, Deployment};

use crate::unit::{
    DockerRegistrySecret, GenericSecret, HelmChart, HelmRepository, InstallableUnit, Manifest,
};

/// Units split by phase
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
    /// Repositories and secrets (or anything flagged `init`)
    pub init: Vec<InstallableUnit>,
    /// Charts and manifests
    pub regular: Vec<InstallableUnit>,
}

impl Expansion {
    pub fn is_empty(&self) -> bool {
        self.init.is_empty() && self.regular.is_empty()
    }

    pub fn len(&self) -> usize {
        self.init.len() + self.regular.len()
    }

    /// Every unit, init units first
    pub fn iter(&self) -> impl Iterator<Item = &InstallableUnit> {
        self.init.iter().chain(self.regular.iter())
    }
}

/// Builds deduplicated units from catalog deployments
#[derive(Debug, Clone, Copy)]
pub struct Expander<'a> {
    catalog: &'a Catalog,
}

impl<'a> Expander<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Expand deployment names into init and regular units
    pub fn expand<S: AsRef<str>>(&self, names: &[S]) -> Expansion {
        let mut units: IndexMap<String, InstallableUnit> = IndexMap::new();

        for name in names.iter().map(AsRef::as_ref) {
            let Some(deployment) = self.catalog.deployment(name) else {
                tracing::warn!("Skipping unknown deployment '{}'", name);
                continue;
            };
            for unit in units_of(deployment) {
                insert(&mut units, unit);
            }
        }

        let (init, regular): (Vec<_>, Vec<_>) = units.into_values().partition(InstallableUnit::is_init);
        Expansion { init, regular }
    }
}

/// Units declared by one deployment, in declaration order
pub fn units_of(deployment: &Deployment) -> Vec<InstallableUnit> {
    let helm = &deployment.helm;
    let kubectl = &deployment.kubectl;

    helm.repositories
        .iter()
        .map(|r| InstallableUnit::HelmRepository(HelmRepository::from(r)))
        .chain(
            helm.charts
                .iter()
                .map(|c| InstallableUnit::HelmChart(HelmChart::from(c))),
        )
        .chain(
            kubectl
                .secrets
                .generic
                .iter()
                .map(|s| InstallableUnit::GenericSecret(GenericSecret::from(s))),
        )
        .chain(
            kubectl
                .secrets
                .docker_registry
                .iter()
                .map(|s| InstallableUnit::DockerRegistrySecret(DockerRegistrySecret::from(s))),
        )
        .chain(
            kubectl
                .manifests
                .iter()
                .map(|m| InstallableUnit::Manifest(Manifest::from(m))),
        )
        .collect()
}

fn insert(units: &mut IndexMap<String, InstallableUnit>, unit: InstallableUnit) {
    match units.entry(unit.identity_hash()) {
        Entry::Vacant(entry) => {
            entry.insert(unit);
        }
        Entry::Occupied(mut entry) => {
            if entry.get_mut().merge_namespaces(&unit) {
                tracing::debug!("Merged namespaces of duplicate {}", unit);
            } else {
                tracing::debug!("Dropping duplicate {}", unit);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kruise_core::{
        ChartSpec, DeployConfig, GenericSecretSpec, HelmSpec, KeyValue, KubectlSpec, ManifestSpec,
        RepositorySpec, SecretsSpec,
    };

    fn bitnami() -> RepositorySpec {
        RepositorySpec {
            name: "bitnami".to_string(),
            url: "https://charts.bitnami.com/bitnami".to_string(),
            ..Default::default()
        }
    }

    fn chart(name: &str, priority: i32) -> ChartSpec {
        ChartSpec {
            chart_name: name.to_string(),
            release_name: name.to_string(),
            repo_name: "bitnami".to_string(),
            namespace: "data".to_string(),
            priority,
            ..Default::default()
        }
    }

    fn secret(namespace: &str) -> GenericSecretSpec {
        GenericSecretSpec {
            name: "shared-creds".to_string(),
            namespace: namespace.to_string(),
            literal: vec![KeyValue {
                key: "token".to_string(),
                value: "abc".to_string(),
            }],
            init: None,
        }
    }

    fn deployment(name: &str, charts: Vec<ChartSpec>, secrets: Vec<GenericSecretSpec>) -> Deployment {
        Deployment {
            name: name.to_string(),
            helm: HelmSpec {
                repositories: vec![bitnami()],
                charts,
            },
            kubectl: KubectlSpec {
                secrets: SecretsSpec {
                    generic: secrets,
                    docker_registry: vec![],
                },
                manifests: vec![],
            },
            ..Default::default()
        }
    }

    fn catalog() -> Catalog {
        let mut mongodb = deployment("mongodb", vec![chart("mongodb", 1)], vec![secret("b")]);
        mongodb.aliases = vec!["mongo".to_string()];
        mongodb.kubectl.manifests = vec![ManifestSpec {
            namespace: "data".to_string(),
            paths: vec!["mongo-monitor.yaml".to_string()],
            priority: 2,
            init: None,
        }];

        Catalog::new(DeployConfig {
            deployments: vec![
                deployment("kafka", vec![chart("kafka", 1)], vec![secret("a")]),
                mongodb,
                deployment("kafka-again", vec![chart("kafka", 1)], vec![secret("a")]),
            ],
            profiles: vec![],
        })
        .unwrap()
    }

    #[test]
    fn test_shared_repository_collapses() {
        let catalog = catalog();
        let expansion = Expander::new(&catalog).expand(&["kafka", "mongodb"]);

        let repositories: Vec<_> = expansion.init.iter().filter(|u| u.is_repository()).collect();
        assert_eq!(repositories.len(), 1);
    }

    #[test]
    fn test_secret_namespaces_consolidate() {
        let catalog = catalog();
        let expansion = Expander::new(&catalog).expand(&["kafka", "mongodb", "kafka-again"]);

        let secrets: Vec<_> = expansion
            .init
            .iter()
            .filter(|u| matches!(u, InstallableUnit::GenericSecret(_)))
            .collect();
        assert_eq!(secrets.len(), 1);
        assert_eq!(secrets[0].namespaces(), ["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_partition_and_order() {
        let catalog = catalog();
        let expansion = Expander::new(&catalog).expand(&["mongo", "kafka"]);

        assert_eq!(expansion.init.len(), 2);
        let regular: Vec<String> = expansion.regular.iter().map(|u| u.to_string()).collect();
        assert_eq!(
            regular,
            vec![
                "helm chart 'mongodb' (bitnami/mongodb)",
                "manifest mongo-monitor.yaml in 'data'",
                "helm chart 'kafka' (bitnami/kafka)",
            ]
        );
    }

    #[test]
    fn test_identical_charts_collapse() {
        let catalog = catalog();
        let expansion = Expander::new(&catalog).expand(&["kafka", "kafka-again"]);
        assert_eq!(expansion.regular.len(), 1);
        assert_eq!(expansion.len(), 3);
    }

    #[test]
    fn test_expand_is_idempotent() {
        let catalog = catalog();
        let expander = Expander::new(&catalog);
        let names = ["kafka", "mongodb", "kafka-again"];
        assert_eq!(expander.expand(&names), expander.expand(&names));
    }

    #[test]
    fn test_unknown_and_empty() {
        let catalog = catalog();
        let expander = Expander::new(&catalog);
        assert!(expander.expand(&["redis"]).is_empty());
        assert!(expander.expand::<&str>(&[]).is_empty());
    }
}
