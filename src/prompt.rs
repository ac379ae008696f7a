//! Interactive prompt abstraction.
//!
//! The workflow engine asks for choices, masked secrets and free text
//! through this trait; the terminal implementation uses dialoguer. Prompts
//! block until the operator responds.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Password, Select};

use crate::error::Result;

/// Synchronous operator input consumed by the workflow engine.
pub trait Prompt {
    /// Present an enumerated choice list; returns the selected index.
    fn select(&self, message: &str, items: &[&str]) -> Result<usize>;

    /// Ask for a masked single value (tokens, secrets).
    fn password(&self, message: &str) -> Result<String>;

    /// Ask for free text, with an optional default offered on empty input.
    fn input(&self, message: &str, default: Option<&str>) -> Result<String>;
}

/// Terminal prompt backed by dialoguer.
pub struct TermPrompt {
    theme: ColorfulTheme,
}

impl TermPrompt {
    pub fn new() -> Self {
        TermPrompt {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TermPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompt for TermPrompt {
    fn select(&self, message: &str, items: &[&str]) -> Result<usize> {
        let index = Select::with_theme(&self.theme)
            .with_prompt(message)
            .items(items)
            .default(0)
            .interact()?;
        Ok(index)
    }

    fn password(&self, message: &str) -> Result<String> {
        let value = Password::with_theme(&self.theme)
            .with_prompt(message)
            .interact()?;
        Ok(value)
    }

    fn input(&self, message: &str, default: Option<&str>) -> Result<String> {
        let mut input = Input::<String>::with_theme(&self.theme).with_prompt(message);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        let value = input.allow_empty(true).interact_text()?;
        Ok(value)
    }
}

/// A queued answer for [ScriptedPrompt].
#[derive(Debug, Clone)]
pub enum Answer {
    Choice(usize),
    Text(String),
}

/// Scripted prompt for tests. Answers are consumed in order; any prompt
/// beyond the script is a test failure, which is how the zero-prompt cache
/// property gets asserted.
pub struct ScriptedPrompt {
    answers: Rc<RefCell<VecDeque<Answer>>>,
}

impl ScriptedPrompt {
    pub fn new(answers: Vec<Answer>) -> Self {
        ScriptedPrompt {
            answers: Rc::new(RefCell::new(answers.into())),
        }
    }

    /// A prompt that fails on any interaction.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// A second prompt over the same script; lets tests keep a handle
    /// while the workflow owns the boxed prompt.
    pub fn clone_handle(&self) -> Self {
        ScriptedPrompt {
            answers: Rc::clone(&self.answers),
        }
    }

    /// Number of scripted answers not yet consumed.
    pub fn remaining(&self) -> usize {
        self.answers.borrow().len()
    }

    fn next(&self, message: &str) -> Answer {
        self.answers
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected prompt: {}", message))
    }
}

impl Prompt for ScriptedPrompt {
    fn select(&self, message: &str, items: &[&str]) -> Result<usize> {
        match self.next(message) {
            Answer::Choice(index) if index < items.len() => Ok(index),
            answer => panic!("bad scripted answer {:?} for select '{}'", answer, message),
        }
    }

    fn password(&self, message: &str) -> Result<String> {
        match self.next(message) {
            Answer::Text(value) => Ok(value),
            answer => panic!("bad scripted answer {:?} for password '{}'", answer, message),
        }
    }

    fn input(&self, message: &str, default: Option<&str>) -> Result<String> {
        match self.next(message) {
            Answer::Text(value) if value.is_empty() => {
                Ok(default.unwrap_or_default().to_string())
            }
            Answer::Text(value) => Ok(value),
            answer => panic!("bad scripted answer {:?} for input '{}'", answer, message),
        }
    }
}
