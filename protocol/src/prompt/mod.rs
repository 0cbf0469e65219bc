//! # Interactive Prompting
//!
//! Asset fields that were not supplied on the command line are collected
//! by walking the schema's questions in field order. Answers stay raw
//! strings until [`transform::transform_asset`] types them, so prompting and
//! validation are independent steps.
//!
//! The [`Prompter`] trait is the seam between the walk and the terminal:
//! [`TerminalPrompter`] talks to a human, [`ScriptedPrompter`] replays
//! canned answers.

pub mod questions;
pub mod transform;

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use thiserror::Error;

use crate::codec::Schema;

pub use questions::{generate_questions, Question, QuestionKind, ASK_AGAIN};
pub use transform::{transform_asset, transform_nested, RawAnswer, RawAnswers};

/// Errors raised while collecting answers.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("failed to read answer: {0}")]
    Io(#[from] io::Error),

    #[error("no answer available for {0}")]
    Exhausted(String),

    #[error("Passphrase was not the same on second entry.")]
    PassphraseMismatch,
}

/// Source of answers for [`Question`]s.
pub trait Prompter {
    fn input(&mut self, question: &Question) -> Result<String, PromptError>;

    fn confirm(&mut self, question: &Question) -> Result<bool, PromptError>;

    /// Reads a secret without echo. With `repeat`, it is asked twice and
    /// both entries must match.
    fn passphrase(&mut self, name: &str, repeat: bool) -> Result<String, PromptError>;
}

/// Asks every question for `schema` and returns the raw answers.
///
/// A repeated group's input and confirm are re-asked until the confirm is
/// declined; each round contributes one element.
pub fn collect_asset(
    schema: &Schema,
    prompter: &mut dyn Prompter,
) -> Result<RawAnswers, PromptError> {
    let questions = generate_questions(schema);
    let mut answers = RawAnswers::new();
    let mut iter = questions.iter().peekable();

    while let Some(question) = iter.next() {
        if let Some(again) = iter.next_if(|q| q.kind == QuestionKind::Confirm) {
            let mut rounds = Vec::new();
            loop {
                rounds.push(prompter.input(question)?);
                if !prompter.confirm(again)? {
                    break;
                }
            }
            tracing::debug!(field = %question.name, rounds = rounds.len(), "collected repeated group");
            answers.insert(question.name.clone(), RawAnswer::Repeated(rounds));
        } else {
            let answer = prompter.input(question)?;
            answers.insert(question.name.clone(), RawAnswer::Single(answer));
        }
    }
    Ok(answers)
}

// ---------------------------------------------------------------------------
// Terminal
// ---------------------------------------------------------------------------

/// Prompts on stderr and reads stdin; stdout stays reserved for output.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    fn read_line(prompt: &str) -> Result<String, PromptError> {
        let mut stderr = io::stderr().lock();
        stderr.write_all(prompt.as_bytes())?;
        stderr.flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(PromptError::Exhausted(prompt.trim().to_string()));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

impl Prompter for TerminalPrompter {
    fn input(&mut self, question: &Question) -> Result<String, PromptError> {
        Self::read_line(&question.message)
    }

    fn confirm(&mut self, question: &Question) -> Result<bool, PromptError> {
        let answer = Self::read_line(&format!("{} (y/N) ", question.message))?;
        Ok(answer.trim().to_lowercase().starts_with('y'))
    }

    fn passphrase(&mut self, name: &str, repeat: bool) -> Result<String, PromptError> {
        let first = rpassword::prompt_password(format!("Please enter {name}: "))?;
        if repeat {
            let second = rpassword::prompt_password(format!("Please re-enter {name}: "))?;
            if first != second {
                return Err(PromptError::PassphraseMismatch);
            }
        }
        Ok(first)
    }
}

// ---------------------------------------------------------------------------
// Scripted
// ---------------------------------------------------------------------------

/// Replays pre-recorded answers and records every question it was asked.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    inputs: VecDeque<String>,
    confirms: VecDeque<bool>,
    passphrases: VecDeque<String>,
    asked: Vec<Question>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(mut self, answer: impl Into<String>) -> Self {
        self.inputs.push_back(answer.into());
        self
    }

    pub fn with_confirm(mut self, answer: bool) -> Self {
        self.confirms.push_back(answer);
        self
    }

    pub fn with_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.passphrases.push_back(passphrase.into());
        self
    }

    /// Questions asked so far, in order. Passphrase requests appear as
    /// inputs named after the secret.
    pub fn asked(&self) -> &[Question] {
        &self.asked
    }
}

impl Prompter for ScriptedPrompter {
    fn input(&mut self, question: &Question) -> Result<String, PromptError> {
        self.asked.push(question.clone());
        self.inputs
            .pop_front()
            .ok_or_else(|| PromptError::Exhausted(question.name.clone()))
    }

    fn confirm(&mut self, question: &Question) -> Result<bool, PromptError> {
        self.asked.push(question.clone());
        self.confirms
            .pop_front()
            .ok_or_else(|| PromptError::Exhausted(question.name.clone()))
    }

    fn passphrase(&mut self, name: &str, _repeat: bool) -> Result<String, PromptError> {
        self.asked
            .push(Question::input(name, format!("Please enter {name}: ")));
        self.passphrases
            .pop_front()
            .ok_or_else(|| PromptError::Exhausted(name.to_string()))
    }
}
