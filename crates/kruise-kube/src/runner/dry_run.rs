//! Runner that only shows what would be run

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use console::style;

use super::CommandRunner;
use crate::command::{Command, CommandOutput, Tool};
use crate::error::Result;

/// Prints every command line instead of executing it
#[derive(Debug, Clone)]
pub struct DryRunRunner {
    echo: bool,
    lines: Arc<Mutex<Vec<String>>>,
}

impl DryRunRunner {
    /// Print command lines to stdout
    pub fn new() -> Self {
        Self {
            echo: true,
            lines: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Record command lines without printing them
    pub fn silent() -> Self {
        Self {
            echo: false,
            ..Self::new()
        }
    }

    /// Command lines emitted so far, in emission order
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl Default for DryRunRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for DryRunRunner {
    async fn run(&self, command: &Command) -> Result<CommandOutput> {
        let line = command.to_string();
        if self.echo {
            println!("{} {}", style("[dry-run]").dim(), line);
        }
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line);
        }
        Ok(CommandOutput::default())
    }

    async fn ensure_available(&self, _tool: Tool) -> Result<()> {
        Ok(())
    }
}
