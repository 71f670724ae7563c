//! Argument resolution
//!
//! Turns raw command line tokens (deployment names, aliases and profile
//! names) into an ordered list of canonical deployment names. Order is the
//! order in which a deployment is first seen; later repeats are dropped.

use crate::catalog::Catalog;

/// Resolves command line tokens against a catalog
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    catalog: &'a Catalog,
}

impl<'a> Resolver<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Resolve tokens into canonical deployment names
    ///
    /// A token naming a profile expands into the profile's items, otherwise a
    /// token naming a deployment contributes that deployment. Tokens that
    /// match neither are ignored here; see [`Resolver::unknown_args`].
    pub fn resolve<S: AsRef<str>>(&self, args: &[S]) -> Vec<String> {
        let mut resolved: Vec<String> = Vec::new();

        for token in args.iter().map(AsRef::as_ref) {
            if let Some(profile) = self.catalog.profile(token) {
                tracing::debug!("Expanding profile '{}'", profile.name);
                for item in &profile.items {
                    match self.catalog.deployment(item) {
                        Some(deployment) => push_unique(&mut resolved, &deployment.name),
                        None if self.catalog.profile(item).is_some() => {
                            tracing::warn!(
                                "Profile '{}' lists profile '{}'; nested profiles are not expanded",
                                profile.name,
                                item
                            );
                        }
                        None => {
                            tracing::warn!(
                                "Profile '{}' lists unknown deployment '{}'",
                                profile.name,
                                item
                            );
                        }
                    }
                }
            } else if let Some(deployment) = self.catalog.deployment(token) {
                push_unique(&mut resolved, &deployment.name);
            } else {
                tracing::trace!("Ignoring unknown argument '{}'", token);
            }
        }

        resolved
    }

    /// Tokens that name neither a deployment nor a profile, in input order
    pub fn unknown_args<'t, S: AsRef<str>>(&self, args: &'t [S]) -> Vec<&'t str> {
        args.iter()
            .map(AsRef::as_ref)
            .filter(|token| !self.catalog.is_valid_arg(token))
            .collect()
    }
}

fn push_unique(resolved: &mut Vec<String>, name: &str) {
    if !resolved.iter().any(|n| n == name) {
        resolved.push(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DeployConfig, Deployment, Profile};

    fn deployment(name: &str, aliases: &[&str]) -> Deployment {
        Deployment {
            name: name.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            ..Default::default()
        }
    }

    fn profile(name: &str, items: &[&str]) -> Profile {
        Profile {
            name: name.to_string(),
            items: items.iter().map(|i| i.to_string()).collect(),
            ..Default::default()
        }
    }

    fn catalog() -> Catalog {
        Catalog::new(DeployConfig {
            deployments: vec![
                deployment("kafka", &[]),
                deployment("mongodb", &["mongo"]),
                deployment("jaeger", &[]),
                deployment("prometheus-operator", &["prom"]),
            ],
            profiles: vec![
                profile("data", &["kafka", "mongodb"]),
                profile("observability", &["jaeger", "prom"]),
                profile("everything", &["data", "jaeger", "redis"]),
            ],
        })
        .unwrap()
    }

    #[test]
    fn test_first_seen_order() {
        let catalog = catalog();
        let resolver = Resolver::new(&catalog);
        assert_eq!(
            resolver.resolve(&["kafka", "mongodb", "kafka"]),
            vec!["kafka", "mongodb"]
        );
        assert_eq!(
            resolver.resolve(&["mongodb", "kafka", "mongodb"]),
            vec!["mongodb", "kafka"]
        );
    }

    #[test]
    fn test_profile_expansion() {
        let catalog = catalog();
        let resolver = Resolver::new(&catalog);
        assert_eq!(
            resolver.resolve(&["observability"]),
            vec!["jaeger", "prometheus-operator"]
        );
        assert_eq!(
            resolver.resolve(&["jaeger", "observability"]),
            vec!["jaeger", "prometheus-operator"]
        );
    }

    #[test]
    fn test_profile_then_alias() {
        let catalog = catalog();
        let resolver = Resolver::new(&catalog);
        assert_eq!(resolver.resolve(&["data", "mongo"]), vec!["kafka", "mongodb"]);
    }

    #[test]
    fn test_nested_profile_and_unknown_items_are_skipped() {
        let catalog = catalog();
        let resolver = Resolver::new(&catalog);
        assert_eq!(resolver.resolve(&["everything"]), vec!["jaeger"]);
    }

    #[test]
    fn test_unknown_tokens_are_ignored() {
        let catalog = catalog();
        let resolver = Resolver::new(&catalog);
        assert_eq!(resolver.resolve(&["redis", "kafka"]), vec!["kafka"]);
        assert!(resolver.resolve::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_profile_wins_over_deployment() {
        let catalog = Catalog::new(DeployConfig {
            deployments: vec![deployment("istio", &[]), deployment("istiod", &[])],
            profiles: vec![profile("istio", &["istiod"])],
        })
        .unwrap();
        let resolver = Resolver::new(&catalog);
        assert_eq!(resolver.resolve(&["istio"]), vec!["istiod"]);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let catalog = catalog();
        let resolver = Resolver::new(&catalog);
        let args = ["prom", "data", "jaeger", "kafka"];
        let first = resolver.resolve(&args);
        assert_eq!(first, resolver.resolve(&args));
        assert_eq!(first, vec!["prometheus-operator", "kafka", "mongodb", "jaeger"]);
    }

    #[test]
    fn test_unknown_args() {
        let catalog = catalog();
        let resolver = Resolver::new(&catalog);
        let args = vec!["kafak".to_string(), "mongo".to_string(), "redis".to_string()];
        assert_eq!(resolver.unknown_args(&args), vec!["kafak", "redis"]);
    }
}
