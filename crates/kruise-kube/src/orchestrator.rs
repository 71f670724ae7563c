//! Priority orchestration
//!
//! Runs installable units in one of three modes:
//! - **Sequential**: one unit at a time, in list order
//! - **Concurrent**: units grouped by priority; each group runs concurrently
//!   and completes before the next group starts. Install walks priorities
//!   ascending, uninstall descending.
//! - **Parallel**: every unit at once, priorities ignored
//!
//! Before anything runs every unit is validated and each required tool is
//! checked once. Those failures abort the run; a failing unit does not.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinSet;

use crate::command::Tool;
use crate::error::{KubeError, Result};
use crate::expand::Expansion;
use crate::helm;
use crate::progress::{self, Operation, Progress};
use crate::prompt::{Exclusive, Prompter};
use crate::report::{RunReport, Severity, log_failure};
use crate::runner::{CommandRunner, DryRunRunner};
use crate::unit::InstallableUnit;

/// How units are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    #[default]
    Sequential,
    Concurrent,
    Parallel,
}

impl ExecutionMode {
    /// Concurrent wins when both flags are set
    pub fn from_flags(concurrent: bool, parallel: bool) -> Self {
        if concurrent {
            ExecutionMode::Concurrent
        } else if parallel {
            ExecutionMode::Parallel
        } else {
            ExecutionMode::Sequential
        }
    }
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionMode::Sequential => write!(f, "sequential"),
            ExecutionMode::Concurrent => write!(f, "concurrent"),
            ExecutionMode::Parallel => write!(f, "parallel"),
        }
    }
}

/// Executes units against the cluster
pub struct Orchestrator {
    runner: Arc<dyn CommandRunner>,
    prompter: Arc<dyn Prompter>,
    mode: ExecutionMode,
    dry_run: Option<DryRunRunner>,
    progress: Arc<Progress>,
    checked: Mutex<HashSet<Tool>>,
}

impl Orchestrator {
    /// Units running together share `prompter` one unit at a time
    pub fn new(runner: Arc<dyn CommandRunner>, prompter: Arc<dyn Prompter>) -> Self {
        Self {
            runner,
            prompter: Arc::new(Exclusive::new(prompter)),
            mode: ExecutionMode::default(),
            dry_run: None,
            progress: Arc::new(Progress::new()),
            checked: Mutex::new(HashSet::new()),
        }
    }

    pub fn mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Print commands instead of running them
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled.then(DryRunRunner::new);
        self
    }

    /// Dry run through a specific runner
    pub fn dry_run_with(mut self, runner: DryRunRunner) -> Self {
        self.dry_run = Some(runner);
        self
    }

    /// Suppress status lines
    pub fn quiet(mut self) -> Self {
        self.progress = Arc::new(Progress::hidden());
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run.is_some()
    }

    /// Install regular units, running the init phase first when asked
    pub async fn deploy(&self, expansion: &Expansion, with_init: bool) -> Result<RunReport> {
        let mut selected: Vec<&InstallableUnit> = expansion.regular.iter().collect();
        if with_init {
            selected.extend(expansion.init.iter());
        }
        self.preflight(selected).await?;

        let mut report = RunReport::default();
        if with_init {
            report.merge(self.run_init(&expansion.init).await);
        }
        self.progress.phase("Deploying");
        report.merge(self.execute(&expansion.regular, Operation::Install).await);
        Ok(report)
    }

    /// Uninstall regular units, then init units when asked
    pub async fn delete(&self, expansion: &Expansion, with_init: bool) -> Result<RunReport> {
        let mut selected: Vec<&InstallableUnit> = expansion.regular.iter().collect();
        if with_init {
            selected.extend(expansion.init.iter());
        }
        self.preflight(selected).await?;

        self.progress.phase("Deleting");
        let mut report = self.execute(&expansion.regular, Operation::Uninstall).await;
        if with_init {
            self.progress.phase("Removing init units");
            report.merge(self.execute(&expansion.init, Operation::Uninstall).await);
        }
        Ok(report)
    }

    /// Install init units, then refresh the repository index if needed
    pub async fn init(&self, units: &[InstallableUnit]) -> Result<RunReport> {
        self.preflight(units.iter()).await?;
        Ok(self.run_init(units).await)
    }

    pub async fn install(&self, units: &[InstallableUnit]) -> Result<RunReport> {
        self.preflight(units.iter()).await?;
        Ok(self.execute(units, Operation::Install).await)
    }

    pub async fn uninstall(&self, units: &[InstallableUnit]) -> Result<RunReport> {
        self.preflight(units.iter()).await?;
        Ok(self.execute(units, Operation::Uninstall).await)
    }

    /// Validate units and check tools; any failure here is fatal
    async fn preflight<'u>(&self, units: impl IntoIterator<Item = &'u InstallableUnit>) -> Result<()> {
        let mut tools = BTreeSet::new();
        for unit in units {
            if let Err(e) = unit.validate() {
                log_failure(unit, &e, Severity::Fatal);
                return Err(e);
            }
            tools.insert(unit.tool());
        }

        if self.is_dry_run() {
            return Ok(());
        }

        let mut checked = self.checked.lock().await;
        for tool in tools {
            if checked.contains(&tool) {
                continue;
            }
            if let Err(e) = self.runner.ensure_available(tool).await {
                log_failure(&tool, &e, Severity::Fatal);
                return Err(e);
            }
            checked.insert(tool);
        }
        Ok(())
    }

    async fn run_init(&self, units: &[InstallableUnit]) -> RunReport {
        self.progress.phase("Initializing");
        let (mut report, succeeded) = self.execute_tracked(units, Operation::Install).await;

        let repositories_added = units
            .iter()
            .zip(succeeded)
            .any(|(unit, ok)| ok && unit.is_repository());

        if repositories_added {
            let update = helm::repo_update();
            self.progress.started(Operation::Install, &"helm repository index");
            let result = self.effective_runner().run(&update).await.map(|_| ());
            let outcome = report.record(update.to_string(), result, false);
            self.progress.finished(Operation::Install, "helm repository index", outcome);
            report.groups += 1;
        }
        report
    }

    fn effective_runner(&self) -> Arc<dyn CommandRunner> {
        match &self.dry_run {
            Some(dry_run) => Arc::new(dry_run.clone()),
            None => Arc::clone(&self.runner),
        }
    }

    async fn execute(&self, units: &[InstallableUnit], operation: Operation) -> RunReport {
        self.execute_tracked(units, operation).await.0
    }

    /// Run `units`, also returning which of them succeeded, by position
    async fn execute_tracked(&self, units: &[InstallableUnit], operation: Operation) -> (RunReport, Vec<bool>) {
        let mut report = RunReport::default();
        let mut succeeded = vec![false; units.len()];
        if units.is_empty() {
            return (report, succeeded);
        }
        tracing::debug!("{:?} in {} mode: {}", operation, self.mode, progress::describe(units));

        let runner = self.effective_runner();
        match self.mode {
            ExecutionMode::Sequential => {
                for (index, unit) in units.iter().enumerate() {
                    self.progress.started(operation, unit);
                    let result = apply(unit, operation, runner.as_ref(), &self.prompter, self.is_dry_run()).await;
                    succeeded[index] = self.record(&mut report, unit.to_string(), result, operation);
                }
                report.groups = 1;
            }
            ExecutionMode::Concurrent => {
                let mut groups: BTreeMap<i32, Vec<(usize, InstallableUnit)>> = BTreeMap::new();
                for (index, unit) in units.iter().enumerate() {
                    groups.entry(unit.priority()).or_default().push((index, unit.clone()));
                }
                let ordered: Vec<(i32, Vec<(usize, InstallableUnit)>)> = match operation {
                    Operation::Install => groups.into_iter().collect(),
                    Operation::Uninstall => groups.into_iter().rev().collect(),
                };
                for (priority, group) in ordered {
                    self.progress.group(priority, group.len());
                    self.run_group(&runner, group, operation, &mut report, &mut succeeded).await;
                    report.groups += 1;
                }
            }
            ExecutionMode::Parallel => {
                let all = units.iter().cloned().enumerate().collect();
                self.run_group(&runner, all, operation, &mut report, &mut succeeded).await;
                report.groups = 1;
            }
        }
        (report, succeeded)
    }

    /// Run every unit on its own task and wait for all of them
    async fn run_group(
        &self,
        runner: &Arc<dyn CommandRunner>,
        units: Vec<(usize, InstallableUnit)>,
        operation: Operation,
        report: &mut RunReport,
        succeeded: &mut [bool],
    ) {
        let mut tasks = JoinSet::new();
        for (index, unit) in units {
            let runner = Arc::clone(runner);
            let prompter = Arc::clone(&self.prompter);
            let progress = Arc::clone(&self.progress);
            let dry_run = self.is_dry_run();
            tasks.spawn(async move {
                progress.started(operation, &unit);
                let result = apply(&unit, operation, runner.as_ref(), &prompter, dry_run).await;
                (index, unit.to_string(), result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, label, result)) => {
                    succeeded[index] = self.record(report, label, result, operation);
                }
                Err(e) => {
                    self.record(report, "unit task".to_string(), Err(KubeError::from(e)), operation);
                }
            }
        }
    }

    /// Returns true when the unit succeeded
    fn record(&self, report: &mut RunReport, label: String, result: Result<()>, operation: Operation) -> bool {
        let outcome = report.record(label.clone(), result, operation == Operation::Uninstall);
        self.progress.finished(operation, &label, outcome);
        outcome.is_none()
    }
}

async fn apply(
    unit: &InstallableUnit,
    operation: Operation,
    runner: &dyn CommandRunner,
    prompter: &Arc<dyn Prompter>,
    dry_run: bool,
) -> Result<()> {
    match operation {
        Operation::Install => unit.install(runner, prompter, dry_run).await,
        Operation::Uninstall => unit.uninstall(runner).await,
    }
}
