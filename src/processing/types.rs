//! Core data types and error definitions for the document-to-quiz pipeline.

use crate::extraction::DocumentFormatError;
use crate::models::ModelClientError;
use serde::Serialize;
use thiserror::Error;

/// Placeholder options used when a quiz item cannot be composed.
pub const FALLBACK_OPTIONS: [&str; 4] = ["Option A", "Option B", "Option C", "Option D"];

/// Errors produced while turning text into word chunks.
#[derive(Debug, Error)]
pub enum ChunkingError {
    /// The pipeline was configured with an impossible word budget.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
}

/// Fatal errors emitted by the document pipeline.
///
/// Failures scoped to a single chunk or a single quiz item never appear here; they are
/// absorbed where they happen.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The uploaded document could not be parsed.
    #[error("Unsupported or corrupt document: {0}")]
    DocumentFormat(#[from] DocumentFormatError),
    /// The blocking extraction task did not complete.
    #[error("Text extraction task failed: {0}")]
    ExtractionTask(String),
    /// Chunking step rejected its configuration.
    #[error("Failed to chunk document: {0}")]
    Chunking(#[from] ChunkingError),
    /// The final summarization over all chunk summaries failed.
    #[error("Failed to condense chunk summaries: {0}")]
    ReduceSummarization(#[source] ModelClientError),
    /// The question generation call failed.
    #[error("Failed to generate questions: {0}")]
    QuestionGeneration(#[source] ModelClientError),
}

/// Summary of one chunk that made it through the map pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSummary {
    /// Zero-based position of the source chunk.
    pub index: usize,
    /// Summary text returned by the model.
    pub text: String,
}

/// Result of summarizing a single chunk.
#[derive(Debug)]
pub enum ChunkOutcome {
    /// The chunk produced a summary.
    Summarized(ChunkSummary),
    /// The chunk was excluded after the model rejected it.
    Dropped {
        /// Zero-based position of the dropped chunk.
        index: usize,
        /// Error reported by the summarization model.
        reason: ModelClientError,
    },
}

impl ChunkOutcome {
    /// Summary text, when the chunk was summarized.
    pub fn summary(&self) -> Option<&str> {
        match self {
            Self::Summarized(summary) => Some(&summary.text),
            Self::Dropped { .. } => None,
        }
    }
}

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizItem {
    /// Generated question text.
    pub question: String,
    /// Exactly four answer options; the graded answer is first on the success path.
    pub options: [String; 4],
    /// Option graded as correct; always one of `options`.
    pub correct: String,
}

impl QuizItem {
    /// Placeholder item used when answering or distractor construction fails.
    pub fn fallback(question: String) -> Self {
        Self {
            question,
            options: FALLBACK_OPTIONS.map(str::to_string),
            correct: FALLBACK_OPTIONS[0].to_string(),
        }
    }
}

/// Ordered quiz, one item per generated question.
pub type Quiz = Vec<QuizItem>;

/// Response produced by [`crate::processing::QuizPipeline::process_document`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedDocument {
    /// Final condensed summary of the document.
    pub summary: String,
    /// Quiz derived from the summary.
    pub quiz: Quiz,
}
