//! Runner backed by real subprocesses

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;

use super::CommandRunner;
use crate::command::{Command, CommandOutput, Tool};
use crate::error::{KubeError, Result};

/// Spawns `helm` and `kubectl` with `tokio::process`
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    helm: Option<PathBuf>,
    kubectl: Option<PathBuf>,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit executable for `tool` instead of searching PATH
    pub fn with_binary(mut self, tool: Tool, path: impl Into<PathBuf>) -> Self {
        match tool {
            Tool::Helm => self.helm = Some(path.into()),
            Tool::Kubectl => self.kubectl = Some(path.into()),
        }
        self
    }

    fn program(&self, tool: Tool) -> PathBuf {
        let configured = match tool {
            Tool::Helm => self.helm.as_ref(),
            Tool::Kubectl => self.kubectl.as_ref(),
        };
        configured
            .cloned()
            .unwrap_or_else(|| PathBuf::from(tool.binary()))
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &Command) -> Result<CommandOutput> {
        tracing::debug!("Running: {}", command);

        let output = tokio::process::Command::new(self.program(command.tool()))
            .args(command.argv())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| KubeError::Spawn {
                command: command.to_string(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(KubeError::CommandFailed {
                command: command.to_string(),
                code: output.status.code(),
                stderr: stderr.trim().to_string(),
            });
        }

        if !command.is_quiet() && !stdout.trim().is_empty() {
            println!("{}", stdout.trim_end());
        }
        if !stderr.trim().is_empty() {
            tracing::warn!("{}: {}", command.tool(), stderr.trim());
        }

        Ok(CommandOutput { stdout, stderr })
    }

    async fn ensure_available(&self, tool: Tool) -> Result<()> {
        let program = self.program(tool);
        let found = if program.components().count() > 1 {
            is_executable(&program)
        } else {
            find_in_path(&program).is_some()
        };

        if found {
            tracing::debug!("Found {} ({})", tool, program.display());
            Ok(())
        } else {
            Err(KubeError::ToolNotFound {
                tool: tool.to_string(),
            })
        }
    }
}

fn find_in_path(program: &Path) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .flat_map(|dir| candidates(&dir, program))
        .find(|candidate| is_executable(candidate))
}

fn candidates(dir: &Path, program: &Path) -> Vec<PathBuf> {
    let plain = dir.join(program);
    if cfg!(windows) {
        vec![plain.with_extension("exe"), plain]
    } else {
        vec![plain]
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
