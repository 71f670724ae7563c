//! Terminal credential prompter

use std::io::{self, BufRead, Write};
use std::sync::Mutex;

use kruise_kube::{KubeError, Prompter};

/// Reads plain answers from stdin and hidden ones through `rpassword`
///
/// Each prompt holds the terminal while it reads. The orchestrator keeps a
/// unit's prompts together.
#[derive(Debug, Default)]
pub struct TerminalPrompter {
    lock: Mutex<()>,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Prompter for TerminalPrompter {
    fn input(&self, prompt: &str) -> Result<String, KubeError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut stderr = io::stderr();
        write!(stderr, "{}", prompt)?;
        stderr.flush()?;

        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Err(KubeError::Prompt(format!(
                "no answer to '{}': stdin is closed",
                prompt.trim()
            )));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn secret(&self, prompt: &str) -> Result<String, KubeError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        rpassword::prompt_password(prompt)
            .map_err(|e| KubeError::Prompt(format!("failed to read '{}': {}", prompt.trim(), e)))
    }
}
