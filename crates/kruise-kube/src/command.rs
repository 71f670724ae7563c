//! External command lines
//!
//! A [`Command`] is a fully built `helm` or `kubectl` invocation. It is plain
//! data: runners decide whether it is executed, printed or recorded.

use std::fmt;

/// External tools kruise drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tool {
    Helm,
    Kubectl,
}

impl Tool {
    /// Executable name looked up on PATH
    pub fn binary(&self) -> &'static str {
        match self {
            Tool::Helm => "helm",
            Tool::Kubectl => "kubectl",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary())
    }
}

/// A single helm or kubectl invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    tool: Tool,
    args: Vec<String>,
    /// Indices into `args` whose values must not be displayed
    sensitive: Vec<usize>,
    quiet: bool,
}

impl Command {
    pub fn new(tool: Tool) -> Self {
        Self {
            tool,
            args: Vec::new(),
            sensitive: Vec::new(),
            quiet: false,
        }
    }

    pub fn helm() -> Self {
        Self::new(Tool::Helm)
    }

    pub fn kubectl() -> Self {
        Self::new(Tool::Kubectl)
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Add an argument that carries a credential
    ///
    /// The value is passed to the tool unchanged but masked wherever the
    /// command is displayed. For `key=value` arguments only the value is
    /// masked.
    pub fn secret_arg(mut self, arg: impl Into<String>) -> Self {
        self.sensitive.push(self.args.len());
        self.args.push(arg.into());
        self
    }

    /// Optional flag/value pair, skipped when `value` is empty
    pub fn opt(self, flag: &str, value: &str) -> Self {
        if value.is_empty() {
            self
        } else {
            self.arg(flag).arg(value)
        }
    }

    /// Do not echo stdout and treat failure as expected
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn argv(&self) -> &[String] {
        &self.args
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Whether the displayed command line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.to_string().contains(needle)
    }
}

fn mask(arg: &str) -> String {
    match arg.split_once('=') {
        Some((key, _)) => format!("{}=***", key),
        None => "***".to_string(),
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tool)?;
        for (i, arg) in self.args.iter().enumerate() {
            if self.sensitive.contains(&i) {
                write!(f, " {}", mask(arg))?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Captured output of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let command = Command::helm()
            .args(["repo", "add", "bitnami"])
            .arg("https://charts.bitnami.com/bitnami")
            .opt("--version", "")
            .opt("--username", "admin");
        assert_eq!(
            command.to_string(),
            "helm repo add bitnami https://charts.bitnami.com/bitnami --username admin"
        );
        assert_eq!(command.tool(), Tool::Helm);
        assert!(!command.is_quiet());
    }

    #[test]
    fn test_secret_args_are_masked() {
        let command = Command::kubectl()
            .args(["create", "secret", "generic", "creds", "--from-literal"])
            .secret_arg("password=hunter2")
            .arg("--docker-password")
            .secret_arg("hunter2");

        let shown = command.to_string();
        assert_eq!(
            shown,
            "kubectl create secret generic creds --from-literal password=*** --docker-password ***"
        );
        assert!(!shown.contains("hunter2"));
        assert_eq!(command.argv()[5], "password=hunter2");
    }
}
