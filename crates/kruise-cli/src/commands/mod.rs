//! CLI commands

pub mod delete;
pub mod deploy;
pub mod list;

use std::sync::Arc;

use kruise_core::{Catalog, Konfig, Resolver, suggest_argument};
use kruise_kube::{ExecutionMode, Expander, Expansion, Orchestrator, ProcessRunner};

use crate::error::{CliError, Result};
use crate::logging;
use crate::prompt::TerminalPrompter;

/// Flags shared by `deploy` and `delete`
#[derive(Debug, Clone, Default)]
pub struct RunFlags {
    pub dry_run: bool,
    pub concurrent: bool,
    pub parallel: bool,
    pub init: bool,
}

impl RunFlags {
    pub fn mode(&self) -> ExecutionMode {
        ExecutionMode::from_flags(self.concurrent, self.parallel)
    }
}

/// Load the manifest and install the subscriber it configures
pub async fn load(debug: bool) -> Result<Catalog> {
    let konfig = Konfig::load().await?;
    logging::init(&konfig.manifest.logger, debug)?;
    konfig.announce();
    Ok(Catalog::from_config(&konfig.manifest)?)
}

/// Reject arguments the catalog does not know
pub fn validate_args(catalog: &Catalog, args: &[String]) -> Result<()> {
    let unknown = Resolver::new(catalog).unknown_args(args);
    let Some(first) = unknown.first() else {
        return Ok(());
    };

    let message = if unknown.len() == 1 {
        format!("Unknown deployment or profile '{}'", first)
    } else {
        format!(
            "Unknown deployments or profiles: {}",
            unknown
                .iter()
                .map(|a| format!("'{}'", a))
                .collect::<Vec<_>>()
                .join(", ")
        )
    };

    let suggestions = suggest_argument(catalog, first, 3);
    let help = if suggestions.is_empty() {
        Some("run `kruise list` to see what the manifest defines".to_string())
    } else {
        Some(format!("did you mean {}?", suggestions.join(", ")))
    };
    Err(CliError::usage(message, help))
}

/// Validate, resolve and expand command-line arguments
pub fn plan(catalog: &Catalog, args: &[String]) -> Result<Expansion> {
    validate_args(catalog, args)?;
    let names = Resolver::new(catalog).resolve(args);
    tracing::debug!("Resolved {:?} to {:?}", args, names);
    let expansion = Expander::new(catalog).expand(&names);
    tracing::debug!(
        "Expanded to {} init and {} regular unit(s)",
        expansion.init.len(),
        expansion.regular.len()
    );
    Ok(expansion)
}

pub fn orchestrator(flags: &RunFlags) -> Orchestrator {
    Orchestrator::new(
        Arc::new(ProcessRunner::new()),
        Arc::new(TerminalPrompter::new()),
    )
    .mode(flags.mode())
    .dry_run(flags.dry_run)
}
