//! Quiz composition: one answer plus three distractors per question.
//!
//! Every question yields exactly one [`QuizItem`]. When answering or distractor construction
//! fails, the item degrades to the fixed placeholder options instead of failing the quiz.

use crate::models::{ModelClientError, QuestionAnsweringClient};
use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use thiserror::Error;

use super::types::{Quiz, QuizItem};

/// Error raised by a [`DistractorStrategy`].
#[derive(Debug, Error)]
#[error("failed to build distractors: {0}")]
pub struct DistractorError(pub String);

/// Failure to compose a single quiz item; always absorbed by the fallback item.
#[derive(Debug, Error)]
pub enum QuizItemError {
    /// The question-answering model produced no answer.
    #[error("answering failed: {0}")]
    Answer(#[from] ModelClientError),
    /// The distractor strategy failed.
    #[error(transparent)]
    Distractors(#[from] DistractorError),
}

/// Produces the three wrong options shown next to the graded answer.
pub trait DistractorStrategy: Send + Sync {
    /// Build three distractors for `answer`.
    fn distractors(
        &self,
        question: &str,
        answer: &str,
        context: &str,
    ) -> Result<[String; 3], DistractorError>;
}

/// Cheap placeholder distractors: the reversed answer plus two fixed abstentions.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReversedAnswer;

impl DistractorStrategy for ReversedAnswer {
    fn distractors(
        &self,
        _question: &str,
        answer: &str,
        _context: &str,
    ) -> Result<[String; 3], DistractorError> {
        Ok([
            answer.chars().rev().collect(),
            "None of the above".to_string(),
            "I don't know".to_string(),
        ])
    }
}

/// Outcome of composing a quiz, with the number of placeholder items it contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedQuiz {
    /// Items in question order.
    pub items: Quiz,
    /// Items that fell back to the placeholder options.
    pub fallback_items: usize,
}

/// Turns questions into quiz items using a question-answering model.
pub struct QuizComposer {
    answerer: Arc<dyn QuestionAnsweringClient>,
    distractors: Arc<dyn DistractorStrategy>,
    concurrency: usize,
}

impl QuizComposer {
    /// Build a composer with the [`ReversedAnswer`] distractor strategy.
    pub fn new(answerer: Arc<dyn QuestionAnsweringClient>) -> Self {
        Self {
            answerer,
            distractors: Arc::new(ReversedAnswer),
            concurrency: 1,
        }
    }

    /// Replace the distractor strategy.
    pub fn with_distractors(mut self, distractors: Arc<dyn DistractorStrategy>) -> Self {
        self.distractors = distractors;
        self
    }

    /// Allow up to `concurrency` items to be composed at once; item order is unaffected.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Compose one item per question, in question order. Never fails.
    pub async fn compose(&self, questions: Vec<String>, context: &str) -> ComposedQuiz {
        let outcomes: Vec<(String, Result<QuizItem, QuizItemError>)> = stream::iter(questions)
            .map(|question| async move {
                let outcome = self.compose_item(&question, context).await;
                (question, outcome)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut fallback_items = 0;
        let items = outcomes
            .into_iter()
            .enumerate()
            .map(|(position, (question, outcome))| {
                outcome.unwrap_or_else(|error| {
                    tracing::warn!(
                        question = position,
                        error = %error,
                        "Quiz item failed; using placeholder options"
                    );
                    fallback_items += 1;
                    QuizItem::fallback(question)
                })
            })
            .collect();

        ComposedQuiz {
            items,
            fallback_items,
        }
    }

    /// Answer one question and surround the answer with distractors.
    pub async fn compose_item(
        &self,
        question: &str,
        context: &str,
    ) -> Result<QuizItem, QuizItemError> {
        let answer = self.answerer.answer(question, context).await?;
        let [first, second, third] = self.distractors.distractors(question, &answer, context)?;
        Ok(QuizItem {
            question: question.to_string(),
            options: [answer.clone(), first, second, third],
            correct: answer,
        })
    }
}
