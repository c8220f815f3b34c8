//! Mock prompter for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::net::Prompter;

/// Mock implementation of the [`Prompter`] trait.
///
/// Answers from a script (falling back to a default once the script runs
/// out) and records every question asked.
#[derive(Clone)]
pub struct MockPrompter {
    script: Arc<RwLock<VecDeque<bool>>>,
    default_answer: bool,
    questions: Arc<RwLock<Vec<String>>>,
}

impl MockPrompter {
    /// A prompter that always gives the same answer.
    pub fn always(answer: bool) -> Self {
        Self {
            script: Arc::new(RwLock::new(VecDeque::new())),
            default_answer: answer,
            questions: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// A prompter that plays back the given answers in order, then keeps
    /// answering no.
    pub fn scripted(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            script: Arc::new(RwLock::new(answers.into_iter().collect())),
            default_answer: false,
            questions: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Questions asked so far, in order.
    pub async fn recorded_questions(&self) -> Vec<String> {
        self.questions.read().await.clone()
    }

    /// Number of questions asked so far.
    pub async fn prompt_count(&self) -> usize {
        self.questions.read().await.len()
    }
}

#[async_trait]
impl Prompter for MockPrompter {
    async fn confirm(&self, question: &str) -> bool {
        self.questions.write().await.push(question.to_string());
        self.script
            .write()
            .await
            .pop_front()
            .unwrap_or(self.default_answer)
    }
}
