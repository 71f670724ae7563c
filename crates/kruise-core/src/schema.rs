//! Kruise manifest schema
//!
//! The manifest is a versioned document with two top level sections that
//! matter to the engine: `logger` and `deploy`. Everything under `deploy` is
//! immutable catalog data once loaded.
//!
//! ```yaml
//! apiVersion: v1alpha3
//! kind: Config
//! deploy:
//!   deployments:
//!     - name: mongodb
//!       aliases: [mongo]
//!       helm:
//!         repositories:
//!           - name: bitnami
//!             url: https://charts.bitnami.com/bitnami
//!         charts:
//!           - chartName: mongodb
//!             releaseName: mongodb
//!             repoName: bitnami
//!             namespace: database
//!             priority: 1
//!   profiles:
//!     - name: data
//!       items: [kafka, mongodb]
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// The manifest `apiVersion` this release understands
pub const API_VERSION: &str = "v1alpha3";

fn default_api_version() -> String {
    API_VERSION.to_string()
}

/// Top level keys of the kruise manifest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct KruiseConfig {
    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default)]
    pub kind: String,

    #[serde(default)]
    pub logger: LoggerConfig,

    #[serde(default)]
    pub deploy: DeployConfig,
}

/// Log output configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoggerConfig {
    /// One of `debug`, `info`, `warn`, `error`
    #[serde(default)]
    pub level: Option<String>,

    /// Report the source location of each event
    #[serde(default)]
    pub enable_caller: bool,

    /// Prefix each event with a timestamp
    #[serde(default)]
    pub enable_timestamp: bool,

    /// Named time layout (`rfc3339`, `kitchen`, `datetime`, ...)
    #[serde(default)]
    pub time_format: Option<String>,
}

impl LoggerConfig {
    /// Validated level directive, if one is configured
    pub fn level_directive(&self) -> Result<Option<&'static str>> {
        let Some(level) = self.level.as_deref() else {
            return Ok(None);
        };
        let directive = match level.to_ascii_lowercase().as_str() {
            "" => return Ok(None),
            "debug" => "debug",
            "info" => "info",
            "warn" => "warn",
            "error" => "error",
            other => {
                return Err(CoreError::invalid_config(format!(
                    "invalid verbosity level '{}' (expected debug, info, warn or error)",
                    other
                )));
            }
        };
        Ok(Some(directive))
    }

    /// strftime pattern for the configured time layout
    pub fn time_pattern(&self) -> Result<Option<&'static str>> {
        let Some(format) = self.time_format.as_deref() else {
            return Ok(None);
        };
        let pattern = match format.to_ascii_lowercase().as_str() {
            "" => return Ok(None),
            "layout" => "%m/%d %I:%M:%S%p '%y %z",
            "ansic" => "%a %b %e %H:%M:%S %Y",
            "unixdate" => "%a %b %e %H:%M:%S %Z %Y",
            "rubydate" => "%a %b %d %H:%M:%S %z %Y",
            "rfc822" => "%d %b %y %H:%M %Z",
            "rfc822z" => "%d %b %y %H:%M %z",
            "rfc850" => "%A, %d-%b-%y %H:%M:%S %Z",
            "rfc1123" => "%a, %d %b %Y %H:%M:%S %Z",
            "rfc1123z" => "%a, %d %b %Y %H:%M:%S %z",
            "rfc3339" => "%Y-%m-%dT%H:%M:%S%:z",
            "rfc3339nano" => "%Y-%m-%dT%H:%M:%S%.9f%:z",
            "kitchen" => "%I:%M%p",
            "stamp" => "%b %e %H:%M:%S",
            "stampmilli" => "%b %e %H:%M:%S%.3f",
            "stampmicro" => "%b %e %H:%M:%S%.6f",
            "stampnano" => "%b %e %H:%M:%S%.9f",
            "datetime" => "%Y-%m-%d %H:%M:%S",
            "dateonly" => "%Y-%m-%d",
            "timeonly" => "%H:%M:%S",
            other => {
                return Err(CoreError::invalid_config(format!(
                    "invalid time format '{}'",
                    other
                )));
            }
        };
        Ok(Some(pattern))
    }
}

/// Deployments and profiles addressable from the command line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeployConfig {
    #[serde(default)]
    pub deployments: Vec<Deployment>,

    #[serde(default)]
    pub profiles: Vec<Profile>,
}

/// A named bundle of helm and kubectl templates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Deployment {
    pub name: String,

    #[serde(default)]
    pub aliases: Vec<String>,

    #[serde(default)]
    pub description: Description,

    #[serde(default)]
    pub helm: HelmSpec,

    #[serde(default)]
    pub kubectl: KubectlSpec,
}

impl Deployment {
    /// Whether `token` is this deployment's name or one of its aliases
    pub fn matches(&self, token: &str) -> bool {
        self.name == token || self.aliases.iter().any(|a| a == token)
    }
}

/// A named bundle of deployment names
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Profile {
    pub name: String,

    #[serde(default)]
    pub aliases: Vec<String>,

    #[serde(default)]
    pub items: Vec<String>,

    #[serde(default)]
    pub description: Description,
}

impl Profile {
    /// Whether `token` is this profile's name or one of its aliases
    pub fn matches(&self, token: &str) -> bool {
        self.name == token || self.aliases.iter().any(|a| a == token)
    }
}

/// Help text shown for the deploy and delete commands
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Description {
    #[serde(default)]
    pub deploy: String,

    #[serde(default)]
    pub delete: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HelmSpec {
    #[serde(default)]
    pub repositories: Vec<RepositorySpec>,

    #[serde(default)]
    pub charts: Vec<ChartSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct KubectlSpec {
    #[serde(default)]
    pub secrets: SecretsSpec,

    #[serde(default)]
    pub manifests: Vec<ManifestSpec>,
}

/// A helm repository registration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RepositorySpec {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub url: String,

    /// Credentials are requested before the repository is added
    #[serde(default)]
    pub private: bool,

    /// Overrides the default (repositories run in the init phase)
    #[serde(default)]
    pub init: Option<bool>,
}

/// A helm release
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChartSpec {
    #[serde(default)]
    pub chart_name: String,

    #[serde(default)]
    pub release_name: String,

    #[serde(default)]
    pub repo_name: String,

    #[serde(default)]
    pub namespace: String,

    /// Values files passed with `-f`
    #[serde(default)]
    pub values: Vec<String>,

    /// `key=value` pairs passed with `--set`
    #[serde(default)]
    pub set_values: Vec<String>,

    #[serde(default)]
    pub install_args: Vec<String>,

    #[serde(default)]
    pub uninstall_args: Vec<String>,

    #[serde(default)]
    pub priority: i32,

    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub init: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SecretsSpec {
    #[serde(default)]
    pub generic: Vec<GenericSecretSpec>,

    #[serde(default)]
    pub docker_registry: Vec<DockerRegistrySecretSpec>,
}

/// A generic secret built from literal key/value pairs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GenericSecretSpec {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub namespace: String,

    /// Entries with an empty value are prompted for at install time
    #[serde(default)]
    pub literal: Vec<KeyValue>,

    #[serde(default)]
    pub init: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct KeyValue {
    pub key: String,

    #[serde(default)]
    pub value: String,
}

/// A docker-registry pull secret
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DockerRegistrySecretSpec {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub namespace: String,

    #[serde(default)]
    pub registry: String,

    #[serde(default)]
    pub init: Option<bool>,
}

/// Raw manifests applied with kubectl
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ManifestSpec {
    #[serde(default)]
    pub namespace: String,

    #[serde(default)]
    pub priority: i32,

    #[serde(default)]
    pub paths: Vec<String>,

    #[serde(default)]
    pub init: Option<bool>,
}
