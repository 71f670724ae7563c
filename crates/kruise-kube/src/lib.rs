//! Kruise Kube - cluster operations for the kruise deployer
//!
//! This crate provides:
//! - **Installable units**: helm repositories and charts, generic and
//!   docker-registry secrets, raw manifests
//! - **Expansion**: deployment names to deduplicated units, split into init
//!   and regular phases
//! - **Orchestration**: sequential, priority-batched concurrent and parallel
//!   execution with a dry-run mode
//! - **Runners**: real subprocesses, dry-run printing, and an in-memory mock

pub mod command;
pub mod error;
pub mod expand;
pub mod helm;
pub mod kubectl;
pub mod orchestrator;
pub mod progress;
pub mod prompt;
pub mod report;
pub mod runner;
pub mod unit;

pub use command::{Command, CommandOutput, Tool};
pub use error::{KubeError, Result};
pub use expand::{Expander, Expansion};
pub use orchestrator::{ExecutionMode, Orchestrator};
pub use progress::{Operation, Progress};
pub use prompt::{Credentials, Echo, Prompter, Question, StaticPrompter};
pub use report::{RunReport, Severity, UnitFailure, log_failure};
pub use runner::{CommandRunner, DryRunRunner, Invocation, MockRunner, ProcessRunner};
pub use unit::{
    DockerRegistrySecret, GenericSecret, HelmChart, HelmRepository, InstallableUnit, Manifest,
};
