//! Kruise Core - manifest and catalog types for the kruise deployer
//!
//! This crate provides everything that happens before the cluster is touched:
//! - `KruiseConfig`: The manifest schema (`logger`, `deploy`)
//! - `Konfig`: Manifest discovery and loading (file, `KRUISE_CONFIG`, URL)
//! - `Catalog`: Validated deployments and profiles
//! - `Resolver`: Command line tokens to canonical deployment names
//! - `suggestions`: Close matches for mistyped arguments

pub mod catalog;
pub mod error;
pub mod konfig;
pub mod resolver;
pub mod schema;
pub mod suggestions;

pub use catalog::Catalog;
pub use error::{CoreError, Result};
pub use konfig::{CONFIG_ENV, ConfigSource, Konfig, search_locations};
pub use resolver::Resolver;
pub use schema::{
    API_VERSION, ChartSpec, DeployConfig, Deployment, Description, DockerRegistrySecretSpec,
    GenericSecretSpec, HelmSpec, KeyValue, KruiseConfig, KubectlSpec, LoggerConfig, ManifestSpec,
    Profile, RepositorySpec, SecretsSpec,
};
pub use suggestions::{Suggestion, find_closest_matches, suggest_argument};
