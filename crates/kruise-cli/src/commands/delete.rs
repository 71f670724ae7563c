//! Delete command - tear deployments down again

use std::time::Instant;

use console::style;
use kruise_kube::Operation;

use super::RunFlags;
use crate::display;
use crate::error::{CliError, Result};

/// Run the delete command
///
/// Regular units go first. With `--init` the secrets and repositories
/// they relied on are removed afterwards.
pub async fn run(args: &[String], flags: &RunFlags, debug: bool) -> Result<()> {
    let started = Instant::now();
    let catalog = super::load(debug).await?;
    let expansion = super::plan(&catalog, args)?;

    let selected = if flags.init {
        expansion.len()
    } else {
        expansion.regular.len()
    };
    if selected == 0 {
        println!("{} Nothing to delete for {}", style("→").blue().bold(), args.join(" "));
        return Ok(());
    }

    tracing::info!(
        "Deleting {} unit(s) in {} mode{}",
        selected,
        flags.mode(),
        if flags.dry_run { " (dry run)" } else { "" }
    );

    let report = super::orchestrator(flags)
        .delete(&expansion, flags.init)
        .await?;
    display::print_summary(
        Operation::Uninstall,
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
