//! User prompts: security and account choices, 2FA codes, passwords.

use std::collections::VecDeque;

use zeroize::Zeroizing;

use crate::error::{Error, Result};

/// Asks the user things. Implemented over the terminal and, for tests, over
/// a fixed script of answers.
pub trait Prompter {
    /// Pick one of `items`. `None` when no choice can be made.
    fn select(&mut self, prompt: &str, items: &[String]) -> Result<Option<usize>>;

    /// Read a non-empty line of text.
    fn input(&mut self, prompt: &str) -> Result<String>;

    /// Read a secret without echoing it.
    fn password(&mut self, prompt: &str) -> Result<Zeroizing<String>>;
}

/// Terminal prompts via dialoguer.
pub struct TerminalPrompter {
    interactive: bool,
}

impl TerminalPrompter {
    pub fn new(interactive: bool) -> Self {
        Self { interactive }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn require_interactive(&self, prompt: &str) -> Result<()> {
        if self.interactive {
            Ok(())
        } else {
            Err(Error::Prompt(format!("'{prompt}' needs input but prompts are disabled")))
        }
    }
}

impl Prompter for TerminalPrompter {
    fn select(&mut self, prompt: &str, items: &[String]) -> Result<Option<usize>> {
        if !self.interactive || items.is_empty() {
            return Ok(None);
        }
        dialoguer::Select::new()
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact_opt()
            .map_err(|e| Error::Prompt(e.to_string()))
    }

    fn input(&mut self, prompt: &str) -> Result<String> {
        self.require_interactive(prompt)?;
        dialoguer::Input::<String>::new()
            .with_prompt(prompt)
            .validate_with(|s: &String| {
                if s.trim().is_empty() {
                    Err("value must not be empty")
                } else {
                    Ok(())
                }
            })
            .interact_text()
            .map(|s| s.trim().to_string())
            .map_err(|e| Error::Prompt(e.to_string()))
    }

    fn password(&mut self, prompt: &str) -> Result<Zeroizing<String>> {
        self.require_interactive(prompt)?;
        dialoguer::Password::new()
            .with_prompt(prompt)
            .interact()
            .map(Zeroizing::new)
            .map_err(|e| Error::Prompt(e.to_string()))
    }
}

/// A scripted answer.
#[derive(Debug, Clone)]
pub enum Answer {
    Choice(usize),
    Text(String),
}

/// Replays fixed answers in order and records every prompt it was shown.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Answer>,
    /// Prompts seen so far, in order.
    pub asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            asked: Vec::new(),
        }
    }

    fn next(&mut self, prompt: &str) -> Result<Answer> {
        self.asked.push(prompt.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| Error::Prompt(format!("no scripted answer for '{prompt}'")))
    }
}

impl Prompter for ScriptedPrompter {
    fn select(&mut self, prompt: &str, items: &[String]) -> Result<Option<usize>> {
        match self.next(prompt)? {
            Answer::Choice(i) if i < items.len() => Ok(Some(i)),
            Answer::Choice(i) => Err(Error::Prompt(format!(
                "choice {i} out of range for {} items",
                items.len()
            ))),
            Answer::Text(_) => Err(Error::Prompt("expected a choice".into())),
        }
    }

    fn input(&mut self, prompt: &str) -> Result<String> {
        match self.next(prompt)? {
            Answer::Text(s) => Ok(s),
            Answer::Choice(_) => Err(Error::Prompt("expected text".into())),
        }
    }

    fn password(&mut self, prompt: &str) -> Result<Zeroizing<String>> {
        self.input(prompt).map(Zeroizing::new)
    }
}
