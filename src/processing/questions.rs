//! Question generation from the final summary.

use crate::models::{GenerationRequest, ModelClientError, TextGenerationClient};
use std::sync::Arc;

/// Instruction prepended to the summary before it reaches the generation model.
pub const QUESTION_PREFIX: &str = "generate questions: ";
/// Maximum length hint for each generated question.
pub const QUESTION_MAX_LENGTH: usize = 64;
/// Beam-search width requested from the generation model.
pub const QUESTION_NUM_BEAMS: usize = 5;

/// Generates candidate questions from the final summary with a single model call.
pub struct QuestionGenerator {
    client: Arc<dyn TextGenerationClient>,
    count: usize,
}

impl QuestionGenerator {
    /// Build a generator requesting `count` questions per document.
    pub fn new(client: Arc<dyn TextGenerationClient>, count: usize) -> Self {
        Self { client, count }
    }

    /// Generate up to `count` questions from `context`, in model order.
    ///
    /// Fewer questions are returned when the model produces fewer; results are never padded
    /// or deduplicated.
    pub async fn generate(&self, context: &str) -> Result<Vec<String>, ModelClientError> {
        let request = GenerationRequest {
            prompt: format!("{QUESTION_PREFIX}{context}"),
            max_length: QUESTION_MAX_LENGTH,
            num_return_sequences: self.count,
            num_beams: QUESTION_NUM_BEAMS,
        };

        let mut questions: Vec<String> = self
            .client
            .generate(request)
            .await?
            .into_iter()
            .map(|question| question.trim().to_string())
            .collect();
        questions.truncate(self.count);

        tracing::debug!(
            requested = self.count,
            generated = questions.len(),
            "Generated questions"
        );
        Ok(questions)
    }
}
