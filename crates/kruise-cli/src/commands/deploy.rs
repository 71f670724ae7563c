//! Deploy command - install deployments and profiles by name

use std::time::Instant;

use console::style;
use kruise_kube::Operation;

use super::RunFlags;
use crate::display;
use crate::error::{CliError, Result};

/// Run the deploy command
pub async fn run(args: &[String], flags: &RunFlags, debug: bool) -> Result<()> {
    let started = Instant::now();
    let catalog = super::load(debug).await?;
    let expansion = super::plan(&catalog, args)?;

    if expansion.is_empty() {
        println!("{} Nothing to deploy for {}", style("→").blue().bold(), args.join(" "));
        return Ok(());
    }

    let orchestrator = super::orchestrator(flags);
    tracing::info!(
        "Deploying {} unit(s) in {} mode{}",
        expansion.len(),
        flags.mode(),
        if flags.dry_run { " (dry run)" } else { "" }
    );

    let report = orchestrator.deploy(&expansion, flags.init).await?;
    display::print_summary(
        Operation::Install,
        &report,
        flags.dry_run,
        started.elapsed().as_secs_f64(),
    );

    if report.all_failed() {
        return Err(CliError::Execution {
            failed: report.failed.len(),
        });
    }
    Ok(())
}
