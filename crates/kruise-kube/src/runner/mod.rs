//! Command runners
//!
//! Units describe what to run; a [`CommandRunner`] decides how:
//! - **ProcessRunner**: spawns the real `helm`/`kubectl` binaries
//! - **DryRunRunner**: prints each command line and reports success
//! - **MockRunner**: records commands in memory, for tests

mod dry_run;
mod mock;
mod process;

pub use dry_run::DryRunRunner;
pub use mock::{Invocation, MockRunner};
pub use process::ProcessRunner;

use async_trait::async_trait;

use crate::command::{Command, CommandOutput, Tool};
use crate::error::Result;

/// Executes external commands
///
/// Implementations must be Send + Sync; units run on concurrent tasks.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command to completion
    async fn run(&self, command: &Command) -> Result<CommandOutput>;

    /// Fail with `ToolNotFound` if `tool` cannot be executed
    async fn ensure_available(&self, tool: Tool) -> Result<()>;
}
