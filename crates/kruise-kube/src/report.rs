//! Run outcomes and the failure log
//!
//! Every unit failure goes through [`log_failure`], which decides the log
//! level from the severity.

use std::fmt;

use crate::error::KubeError;

/// How bad a failure is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Expected or harmless, the unit still counts as handled
    Warn,
    /// The unit failed, siblings carry on
    Error,
    /// The run stops
    Fatal,
}

impl Severity {
    /// Classify a unit error
    pub fn of(error: &KubeError, uninstalling: bool) -> Self {
        if error.is_fatal() {
            Severity::Fatal
        } else if (uninstalling && error.is_not_found()) || error.is_deprecation() {
            Severity::Warn
        } else {
            Severity::Error
        }
    }
}

/// Log a failure at the level its severity calls for
pub fn log_failure(subject: &dyn fmt::Display, error: &KubeError, severity: Severity) {
    match severity {
        Severity::Warn => tracing::warn!("{}: {}", subject, error),
        Severity::Error => tracing::error!("{}: {}", subject, error),
        Severity::Fatal => tracing::error!("fatal: {}: {}", subject, error),
    }
}

/// A unit that did not complete cleanly
#[derive(Debug)]
pub struct UnitFailure {
    pub unit: String,
    pub error: KubeError,
}

/// What happened during one orchestrated operation
#[derive(Debug, Default)]
pub struct RunReport {
    pub succeeded: Vec<String>,
    pub warned: Vec<UnitFailure>,
    pub failed: Vec<UnitFailure>,
    /// Synchronisation points the orchestrator waited on
    pub groups: usize,
}

impl RunReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.warned.len() + self.failed.len()
    }

    /// True when units ran and none of them succeeded
    pub fn all_failed(&self) -> bool {
        !self.failed.is_empty() && self.succeeded.is_empty() && self.warned.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.warned.is_empty()
    }

    /// Record a unit result, logging failures
    ///
    /// Returns the severity of the failure, if there was one.
    pub fn record(
        &mut self,
        unit: String,
        result: Result<(), KubeError>,
        uninstalling: bool,
    ) -> Option<Severity> {
        match result {
            Ok(()) => {
                self.succeeded.push(unit);
                None
            }
            Err(error) => {
                let severity = Severity::of(&error, uninstalling);
                log_failure(&unit, &error, severity);
                let failure = UnitFailure { unit, error };
                match severity {
                    Severity::Warn => self.warned.push(failure),
                    Severity::Error | Severity::Fatal => self.failed.push(failure),
                }
                Some(severity)
            }
        }
    }

    /// Fold a later phase into this report
    pub fn merge(&mut self, other: RunReport) {
        self.succeeded.extend(other.succeeded);
        self.warned.extend(other.warned);
        self.failed.extend(other.failed);
        self.groups += other.groups;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(stderr: &str) -> KubeError {
        KubeError::CommandFailed {
            command: "helm uninstall kafka --namespace default".to_string(),
            code: Some(1),
            stderr: stderr.to_string(),
        }
    }

    #[test]
    fn test_severity() {
        assert_eq!(Severity::of(&failed("release: not found"), true), Severity::Warn);
        assert_eq!(Severity::of(&failed("release: not found"), false), Severity::Error);
        assert_eq!(Severity::of(&failed("chart is deprecated"), false), Severity::Warn);
        assert_eq!(
            Severity::of(&KubeError::InvalidConfig("x".to_string()), false),
            Severity::Fatal
        );
    }

    #[test]
    fn test_all_failed() {
        let mut report = RunReport::default();
        assert!(!report.all_failed());

        report.record("a".to_string(), Err(failed("boom")), false);
        assert!(report.all_failed());

        report.record("b".to_string(), Err(failed("not found")), true);
        assert!(!report.all_failed());
        assert_eq!(report.total(), 2);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_deprecation_noise_does_not_hide_failure() {
        let mut report = RunReport::default();
        let severity = report.record(
            "helm chart 'kafka' (bitnami/kafka)".to_string(),
            Err(failed("WARNING: This chart is deprecated\nError: UPGRADE FAILED: timed out waiting for the condition")),
            false,
        );
        assert_eq!(severity, Some(Severity::Error));
        assert!(report.all_failed());
    }

    #[test]
    fn test_merge() {
        let mut first = RunReport {
            groups: 1,
            ..Default::default()
        };
        first.record("a".to_string(), Ok(()), false);

        let mut second = RunReport {
            groups: 2,
            ..Default::default()
        };
        second.record("b".to_string(), Err(failed("boom")), false);

        first.merge(second);
        assert_eq!(first.groups, 3);
        assert_eq!(first.succeeded, vec!["a"]);
        assert_eq!(first.failed.len(), 1);
    }
}
