//! Operator confirmation prompts.

use inquire::Confirm;
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::debug;

/// Asks the operator a yes/no question. The default answer is "no".
pub trait Confirmer: Send + Sync {
    fn confirm(&self, question: &str) -> bool;
}

/// Prompts on the terminal. Cancelling or a failed prompt counts as "no".
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinConfirmer;

impl Confirmer for StdinConfirmer {
    fn confirm(&self, question: &str) -> bool {
        match Confirm::new(question).with_default(false).prompt() {
            Ok(answer) => answer,
            Err(e) => {
                debug!(error = %e, "Confirmation prompt failed");
                false
            }
        }
    }
}

/// Answers from a fixed list and remembers the questions asked.
///
/// Once the answers run out every further question is declined.
#[derive(Debug, Default)]
pub struct ScriptedConfirmer {
    answers: Mutex<VecDeque<bool>>,
    questions: Mutex<Vec<String>>,
}

impl ScriptedConfirmer {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            questions: Mutex::new(Vec::new()),
        }
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

impl Confirmer for ScriptedConfirmer {
    fn confirm(&self, question: &str) -> bool {
        if let Ok(mut questions) = self.questions.lock() {
            questions.push(question.to_string());
        }
        self.answers
            .lock()
            .ok()
            .and_then(|mut answers| answers.pop_front())
            .unwrap_or(false)
    }
}
