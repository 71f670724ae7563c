//! Credential prompting
//!
//! Units that need credentials the manifest does not carry (private
//! repositories, docker registries, secret literals without a value) ask a
//! [`Prompter`]. Prompting never happens during a dry run.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{KubeError, Result};

/// Placeholder shown instead of credentials during a dry run
pub const MASKED: &str = "***";

/// Whether an answer may be shown while it is typed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Echo {
    Visible,
    Hidden,
}

/// One prompt and how to read its answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub prompt: String,
    pub echo: Echo,
}

impl Question {
    pub fn visible(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            echo: Echo::Visible,
        }
    }

    pub fn hidden(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            echo: Echo::Hidden,
        }
    }
}

/// Source of interactive input
///
/// Calls are blocking; units invoke them off the async executor.
pub trait Prompter: Send + Sync {
    /// Ask for a value that may be echoed
    fn input(&self, prompt: &str) -> Result<String>;

    /// Ask for a value that must not be echoed
    fn secret(&self, prompt: &str) -> Result<String>;

    fn ask(&self, question: &Question) -> Result<String> {
        match question.echo {
            Echo::Visible => self.input(&question.prompt),
            Echo::Hidden => self.secret(&question.prompt),
        }
    }

    /// Ask every question in order, answers in the same order
    fn ask_all(&self, questions: &[Question]) -> Result<Vec<String>> {
        questions.iter().map(|q| self.ask(q)).collect()
    }
}

/// Gives one caller at a time the prompter for a whole set of questions
///
/// Units running concurrently each get their questions answered as one
/// uninterrupted block.
pub(crate) struct Exclusive {
    inner: Arc<dyn Prompter>,
    turn: Mutex<()>,
}

impl Exclusive {
    pub(crate) fn new(inner: Arc<dyn Prompter>) -> Self {
        Self {
            inner,
            turn: Mutex::new(()),
        }
    }
}

impl Prompter for Exclusive {
    fn input(&self, prompt: &str) -> Result<String> {
        let _turn = self.turn.lock().unwrap_or_else(|e| e.into_inner());
        self.inner.input(prompt)
    }

    fn secret(&self, prompt: &str) -> Result<String> {
        let _turn = self.turn.lock().unwrap_or_else(|e| e.into_inner());
        self.inner.secret(prompt)
    }

    fn ask_all(&self, questions: &[Question]) -> Result<Vec<String>> {
        let _turn = self.turn.lock().unwrap_or_else(|e| e.into_inner());
        self.inner.ask_all(questions)
    }
}

/// Username and password pair
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn masked() -> Self {
        Self {
            username: MASKED.to_string(),
            password: MASKED.to_string(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &MASKED)
            .finish()
    }
}

/// Ask a set of questions on the blocking pool
pub(crate) async fn ask_all(prompter: &Arc<dyn Prompter>, questions: Vec<Question>) -> Result<Vec<String>> {
    if questions.is_empty() {
        return Ok(Vec::new());
    }
    let prompter = Arc::clone(prompter);
    let expected = questions.len();
    let answers = tokio::task::spawn_blocking(move || prompter.ask_all(&questions)).await??;
    if answers.len() != expected {
        return Err(KubeError::Prompt(format!(
            "expected {} answers, got {}",
            expected,
            answers.len()
        )));
    }
    Ok(answers)
}

/// Ask for a username and password
pub(crate) async fn ask_credentials(prompter: &Arc<dyn Prompter>, target: &str) -> Result<Credentials> {
    let questions = vec![
        Question::visible(format!("Enter your username for {}: ", target)),
        Question::hidden(format!("Enter your password for {}: ", target)),
    ];
    let [username, password] = <[String; 2]>::try_from(ask_all(prompter, questions).await?)
        .map_err(|_| KubeError::Prompt(format!("incomplete credentials for {}", target)))?;
    Ok(Credentials { username, password })
}

/// Prompter answering from a fixed table
///
/// Answers are matched by substring against the prompt text. Every prompt
/// asked is recorded. Used for non-interactive runs and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticPrompter {
    answers: Vec<(String, String)>,
    asked: Arc<Mutex<Vec<String>>>,
}

impl StaticPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer any prompt containing `pattern` with `value`
    pub fn answer(mut self, pattern: impl Into<String>, value: impl Into<String>) -> Self {
        self.answers.push((pattern.into(), value.into()));
        self
    }

    /// Build from a pattern to answer map
    pub fn from_answers(answers: HashMap<String, String>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Prompts asked so far, in order
    pub fn asked(&self) -> Vec<String> {
        self.asked
            .lock()
            .map(|asked| asked.clone())
            .unwrap_or_default()
    }

    fn lookup(&self, prompt: &str) -> Result<String> {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(prompt.to_string());
        }
        self.answers
            .iter()
            .find(|(pattern, _)| prompt.contains(pattern.as_str()))
            .map(|(_, value)| value.clone())
            .ok_or_else(|| KubeError::Prompt(format!("no answer for '{}'", prompt.trim())))
    }
}

impl Prompter for StaticPrompter {
    fn input(&self, prompt: &str) -> Result<String> {
        self.lookup(prompt)
    }

    fn secret(&self, prompt: &str) -> Result<String> {
        self.lookup(prompt)
    }
}
