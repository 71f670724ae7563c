//! Error types for kruise-kube

use thiserror::Error;

/// Result type for kruise-kube operations
pub type Result<T> = std::result::Result<T, KubeError>;

/// Errors that can occur while installing or removing units
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KubeError {
    /// A unit is missing a field it cannot run without
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// helm or kubectl is not on PATH
    #[error("'{tool}' was not found on PATH\nHint: install {tool} or run with --dry-run")]
    ToolNotFound { tool: String },

    /// The external command exited unsuccessfully
    #[error("`{command}` failed{}: {stderr}", exit_suffix(.code))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The external command could not be started
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Credentials could not be obtained
    #[error("prompt failed: {0}")]
    Prompt(String),

    /// A unit task panicked or was cancelled
    #[error("task failed: {0}")]
    Join(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_suffix(code: &Option<i32>) -> String {
    code.map(|c| format!(" (exit code {})", c)).unwrap_or_default()
}

impl From<tokio::task::JoinError> for KubeError {
    fn from(e: tokio::task::JoinError) -> Self {
        KubeError::Join(e.to_string())
    }
}

impl KubeError {
    /// The resource the command addressed does not exist
    pub fn is_not_found(&self) -> bool {
        match self {
            KubeError::CommandFailed { stderr, .. } => {
                let stderr = stderr.to_ascii_lowercase();
                stderr.contains("not found")
                    || stderr.contains("(notfound)")
                    || stderr.contains("no repo named")
            }
            _ => false,
        }
    }

    /// helm reported a deprecation rather than a real failure
    ///
    /// Only when every stderr line is deprecation noise. helm prints the
    /// deprecation warning ahead of real errors too.
    pub fn is_deprecation(&self) -> bool {
        match self {
            KubeError::CommandFailed { stderr, .. } => {
                let mut lines = stderr.lines().map(str::trim).filter(|l| !l.is_empty()).peekable();
                lines.peek().is_some()
                    && lines.all(|line| {
                        let line = line.to_ascii_lowercase();
                        line.contains("deprecated") && !line.starts_with("error")
                    })
            }
            _ => false,
        }
    }

    /// Errors that abort the whole run rather than a single unit
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            KubeError::InvalidConfig(_) | KubeError::ToolNotFound { .. }
        )
    }
}
