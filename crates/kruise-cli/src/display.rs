//! Display formatting for CLI output

use console::style;

use kruise_kube::{Operation, RunReport};

/// One-line outcome of a deploy or delete
pub fn summary(operation: Operation, report: &RunReport, dry_run: bool, elapsed: f64) -> String {
    let verb = match operation {
        Operation::Install => "Deployed",
        Operation::Uninstall => "Deleted",
    };
    let prefix = if dry_run { "[dry-run] " } else { "" };

    if report.total() == 0 {
        return format!("{}Nothing to do", prefix);
    }

    let mut parts = vec![format!("{} succeeded", report.succeeded.len())];
    if !report.warned.is_empty() {
        parts.push(format!("{} with warnings", report.warned.len()));
    }
    if !report.failed.is_empty() {
        parts.push(format!("{} failed", report.failed.len()));
    }

    format!(
        "{}{} {} unit{} in {} group{} ({:.1}s): {}",
        prefix,
        verb,
        report.total(),
        plural(report.total()),
        report.groups,
        plural(report.groups),
        elapsed,
        parts.join(", ")
    )
}

/// Print the summary with a status mark
pub fn print_summary(operation: Operation, report: &RunReport, dry_run: bool, elapsed: f64) {
    let mark = if report.is_clean() {
        style("✓").green().bold()
    } else if report.failed.is_empty() {
        style("⚠").yellow().bold()
    } else {
        style("✗").red().bold()
    };
    eprintln!("\n{} {}", mark, summary(operation, report, dry_run, elapsed));

    for failure in &report.failed {
        eprintln!("  {} {}: {}", style("✗").red(), failure.unit, failure.error);
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}
