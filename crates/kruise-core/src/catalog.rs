//! Deployment catalog
//!
//! An immutable, validated view over the `deploy` section of the manifest.
//! The catalog is built once per run and handed to the resolver and the
//! installer expansion explicitly.

use std::collections::HashMap;

use crate::error::{CoreError, Result};
use crate::schema::{DeployConfig, Deployment, KruiseConfig, Profile};

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    deployments: Vec<Deployment>,
    profiles: Vec<Profile>,
}

impl Catalog {
    /// Build a catalog, rejecting ambiguous names and aliases
    pub fn new(deploy: DeployConfig) -> Result<Self> {
        check_unique(
            "deployment",
            deploy
                .deployments
                .iter()
                .map(|d| (d.name.as_str(), d.aliases.as_slice())),
        )?;
        check_unique(
            "profile",
            deploy
                .profiles
                .iter()
                .map(|p| (p.name.as_str(), p.aliases.as_slice())),
        )?;

        Ok(Self {
            deployments: deploy.deployments,
            profiles: deploy.profiles,
        })
    }

    pub fn from_config(config: &KruiseConfig) -> Result<Self> {
        Self::new(config.deploy.clone())
    }

    pub fn deployments(&self) -> &[Deployment] {
        &self.deployments
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    /// Look up a deployment by name or alias
    pub fn deployment(&self, token: &str) -> Option<&Deployment> {
        self.deployments.iter().find(|d| d.matches(token))
    }

    /// Look up a profile by name or alias
    pub fn profile(&self, token: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.matches(token))
    }

    /// Every token the command line accepts: deployments first, then profiles
    pub fn valid_args(&self) -> Vec<&str> {
        let deployments = self
            .deployments
            .iter()
            .flat_map(|d| std::iter::once(d.name.as_str()).chain(d.aliases.iter().map(String::as_str)));
        let profiles = self
            .profiles
            .iter()
            .flat_map(|p| std::iter::once(p.name.as_str()).chain(p.aliases.iter().map(String::as_str)));
        deployments.chain(profiles).collect()
    }

    pub fn is_valid_arg(&self, token: &str) -> bool {
        self.profile(token).is_some() || self.deployment(token).is_some()
    }
}

fn check_unique<'a>(
    kind: &str,
    entries: impl Iterator<Item = (&'a str, &'a [String])>,
) -> Result<()> {
    // token -> (entry index, entry name)
    let mut owners: HashMap<&str, (usize, &str)> = HashMap::new();

    for (index, (name, aliases)) in entries.enumerate() {
        if name.trim().is_empty() {
            return Err(CoreError::invalid_catalog(format!(
                "every {} needs a name",
                kind
            )));
        }
        for token in std::iter::once(name).chain(aliases.iter().map(String::as_str)) {
            if let Some((owner_index, owner)) = owners.insert(token, (index, name)) {
                return Err(CoreError::invalid_catalog(if owner_index == index {
                    format!("{} '{}' lists '{}' more than once", kind, name, token)
                } else {
                    format!(
                        "'{}' is claimed by {} '{}' and {} '{}'",
                        token, kind, owner, kind, name
                    )
                }));
            }
        }
    }
    Ok(())
}
