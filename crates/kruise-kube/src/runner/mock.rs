//! Mock runner for testing
//!
//! Records every command in memory together with logical start and finish
//! stamps taken from one shared counter, so tests can assert ordering
//! without a cluster.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use super::CommandRunner;
use crate::command::{Command, CommandOutput, Tool};
use crate::error::{KubeError, Result};

/// One recorded command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Displayed command line
    pub line: String,
    pub tool: Tool,
    pub args: Vec<String>,
    /// Stamp taken when the command started
    pub started: usize,
    /// Stamp taken when the command finished
    pub finished: usize,
}

#[derive(Debug, Default)]
struct Behaviour {
    failures: Vec<(String, String)>,
    delays: Vec<(String, Duration)>,
    missing: HashSet<Tool>,
}

#[derive(Debug, Default)]
struct Record {
    invocations: Vec<Invocation>,
    checks: Vec<Tool>,
}

/// In-memory command runner for testing
#[derive(Debug, Clone, Default)]
pub struct MockRunner {
    clock: Arc<AtomicUsize>,
    behaviour: Arc<Mutex<Behaviour>>,
    record: Arc<Mutex<Record>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockRunner {
    /// Create a runner where every command succeeds immediately
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail commands whose line contains `pattern` with the given stderr
    pub fn fail_matching(self, pattern: impl Into<String>, stderr: impl Into<String>) -> Self {
        lock(&self.behaviour)
            .failures
            .push((pattern.into(), stderr.into()));
        self
    }

    /// Delay commands whose line contains `pattern`
    pub fn delay_matching(self, pattern: impl Into<String>, delay: Duration) -> Self {
        lock(&self.behaviour).delays.push((pattern.into(), delay));
        self
    }

    /// Report `tool` as not installed
    pub fn without_tool(self, tool: Tool) -> Self {
        lock(&self.behaviour).missing.insert(tool);
        self
    }

    /// Finished commands in completion order
    pub fn invocations(&self) -> Vec<Invocation> {
        lock(&self.record).invocations.clone()
    }

    /// Finished command lines in completion order
    pub fn lines(&self) -> Vec<String> {
        self.invocations().into_iter().map(|i| i.line).collect()
    }

    /// The invocation whose line contains `pattern`
    pub fn find(&self, pattern: &str) -> Option<Invocation> {
        self.invocations()
            .into_iter()
            .find(|i| i.line.contains(pattern))
    }

    /// Tools checked with `ensure_available`, in order
    pub fn availability_checks(&self) -> Vec<Tool> {
        lock(&self.record).checks.clone()
    }

    pub fn reset(&self) {
        *lock(&self.record) = Record::default();
        self.clock.store(0, Ordering::SeqCst);
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, command: &Command) -> Result<CommandOutput> {
        let line = command.to_string();
        let started = self.clock.fetch_add(1, Ordering::SeqCst);

        let (delay, failure) = {
            let behaviour = lock(&self.behaviour);
            let delay = behaviour
                .delays
                .iter()
                .find(|(pattern, _)| line.contains(pattern.as_str()))
                .map(|(_, delay)| *delay);
            let failure = behaviour
                .failures
                .iter()
                .find(|(pattern, _)| line.contains(pattern.as_str()))
                .map(|(_, stderr)| stderr.clone());
            (delay, failure)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        } else {
            tokio::task::yield_now().await;
        }

        let finished = self.clock.fetch_add(1, Ordering::SeqCst);
        lock(&self.record).invocations.push(Invocation {
            line: line.clone(),
            tool: command.tool(),
            args: command.argv().to_vec(),
            started,
            finished,
        });

        match failure {
            Some(stderr) => Err(KubeError::CommandFailed {
                command: line,
                code: Some(1),
                stderr,
            }),
            None => Ok(CommandOutput::default()),
        }
    }

    async fn ensure_available(&self, tool: Tool) -> Result<()> {
        lock(&self.record).checks.push(tool);
        if lock(&self.behaviour).missing.contains(&tool) {
            Err(KubeError::ToolNotFound {
                tool: tool.to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_commands() {
        let runner = MockRunner::new();
        runner
            .run(&Command::helm().args(["repo", "update"]))
            .await
            .unwrap();

        let invocations = runner.invocations();
        assert_eq!(invocations.len(), 1);
        assert_eq!(invocations[0].line, "helm repo update");
        assert_eq!(invocations[0].started, 0);
        assert_eq!(invocations[0].finished, 1);
    }

    #[tokio::test]
    async fn test_fail_matching() {
        let runner = MockRunner::new().fail_matching("uninstall kafka", "release: not found");
        let err = runner
            .run(&Command::helm().args(["uninstall", "kafka"]))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(runner.find("uninstall kafka").is_some());
    }

    #[tokio::test]
    async fn test_missing_tool() {
        let runner = MockRunner::new().without_tool(Tool::Kubectl);
        assert!(runner.ensure_available(Tool::Helm).await.is_ok());
        assert!(runner.ensure_available(Tool::Kubectl).await.is_err());
        assert_eq!(runner.availability_checks(), vec![Tool::Helm, Tool::Kubectl]);
    }
}
