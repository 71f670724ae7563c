//! Status lines printed while units run
//!
//! Output goes to stderr so that stdout carries only tool output and dry-run
//! command lines.

use std::io::{self, Write};
use std::time::Instant;

use console::style;

use crate::report::Severity;
use crate::unit::InstallableUnit;

/// What the orchestrator is doing to a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Install,
    Uninstall,
}

impl Operation {
    fn verb(&self) -> &'static str {
        match self {
            Operation::Install => "Installing",
            Operation::Uninstall => "Uninstalling",
        }
    }

    fn past(&self) -> &'static str {
        match self {
            Operation::Install => "Installed",
            Operation::Uninstall => "Uninstalled",
        }
    }
}

/// Progress reporter for orchestrated runs
#[derive(Debug)]
pub struct Progress {
    enabled: bool,
    start_time: Instant,
}

impl Progress {
    pub fn new() -> Self {
        Self {
            enabled: true,
            start_time: Instant::now(),
        }
    }

    /// A reporter that prints nothing
    pub fn hidden() -> Self {
        Self {
            enabled: false,
            ..Self::new()
        }
    }

    /// Print a phase header
    pub fn phase(&self, title: &str) {
        if self.enabled {
            let _ = writeln!(io::stderr(), "\n{} {}", style("▶").cyan().bold(), title);
        }
    }

    /// Print a priority group header
    pub fn group(&self, priority: i32, count: usize) {
        if self.enabled {
            let _ = writeln!(
                io::stderr(),
                "{} Priority {} ({} unit{})",
                style("▶").cyan(),
                priority,
                count,
                if count == 1 { "" } else { "s" }
            );
        }
    }

    pub fn started(&self, operation: Operation, unit: &dyn std::fmt::Display) {
        if self.enabled {
            let _ = writeln!(
                io::stderr(),
                "{} {} {}",
                style("→").blue().bold(),
                operation.verb(),
                unit
            );
        }
    }

    /// Print the outcome of a unit, `None` meaning success
    pub fn finished(&self, operation: Operation, unit: &str, outcome: Option<Severity>) {
        if !self.enabled {
            return;
        }
        let line = match outcome {
            None => format!("{} {} {}", style("✓").green().bold(), operation.past(), unit),
            Some(Severity::Warn) => format!("{} {} {} with warnings", style("⚠").yellow().bold(), operation.past(), unit),
            Some(Severity::Error) | Some(Severity::Fatal) => {
                format!("{} Failed: {}", style("✗").red().bold(), unit)
            }
        };
        let _ = writeln!(io::stderr(), "{}", line);
    }

    /// Seconds since the reporter was created
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

/// Labels for a batch of units, used in log lines
pub(crate) fn describe(units: &[InstallableUnit]) -> String {
    units
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
