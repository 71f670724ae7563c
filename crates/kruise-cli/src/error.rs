//! CLI error types with exit code handling
//!
//! This module provides a unified error type for CLI operations that
//! maps errors to appropriate exit codes.

use miette::Diagnostic;
use thiserror::Error;

use kruise_core::CoreError;
use kruise_kube::KubeError;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// Manifest missing, unreadable or inconsistent
    #[error("Config error: {message}")]
    #[diagnostic(code(kruise::cli::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// A unit is missing a field it cannot run without
    #[error("Validation failed: {message}")]
    #[diagnostic(code(kruise::cli::validation))]
    Validation {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Arguments the manifest does not know
    #[error("{message}")]
    #[diagnostic(code(kruise::cli::usage))]
    Usage {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// helm or kubectl is not installed
    #[error("'{tool}' was not found on PATH")]
    #[diagnostic(
        code(kruise::cli::tool_missing),
        help("install {tool}, or preview the commands with --dry-run")
    )]
    ToolMissing { tool: String },

    /// Every unit that ran failed
    #[error("All {failed} unit(s) failed")]
    #[diagnostic(code(kruise::cli::execution), help("run with --debug for the full command output"))]
    Execution { failed: usize },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(kruise::cli::io))]
    Io { message: String },

    /// Internal error (runtime, unexpected failure)
    #[error("Internal error: {message}")]
    #[diagnostic(code(kruise::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config { .. } => exit_codes::CONFIG_ERROR,
            CliError::Validation { .. } => exit_codes::VALIDATION_ERROR,
            CliError::Usage { .. } => exit_codes::USAGE_ERROR,
            CliError::ToolMissing { .. } => exit_codes::TOOL_MISSING,
            CliError::Execution { .. } => exit_codes::EXECUTION_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a usage error with optional help text
    pub fn usage(message: impl Into<String>, help: Option<String>) -> Self {
        Self::Usage {
            message: message.into(),
            help,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConfigNotFound { ref searched } => CliError::Config {
                message: err.to_string(),
                help: Some(format!(
                    "create one of:\n{}\nor point {} at a file or URL",
                    searched
                        .iter()
                        .map(|p| format!("  {}", p.display()))
                        .collect::<Vec<_>>()
                        .join("\n"),
                    kruise_core::CONFIG_ENV
                )),
            },
            CoreError::Io(e) => e.into(),
            other => CliError::config(other.to_string()),
        }
    }
}

impl From<KubeError> for CliError {
    fn from(err: KubeError) -> Self {
        match err {
            KubeError::InvalidConfig(message) => CliError::Validation {
                message,
                help: Some("fix the deployment in your kruise manifest".to_string()),
            },
            KubeError::ToolNotFound { tool } => CliError::ToolMissing { tool },
            KubeError::Io(e) => e.into(),
            other => CliError::internal(other.to_string()),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
