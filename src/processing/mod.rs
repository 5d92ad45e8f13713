//! Document-to-quiz pipeline: chunking, map-reduce summarization, question generation, and
//! quiz composition.

pub mod chunking;
pub mod questions;
pub mod quiz;
mod service;
pub mod summarize;
pub mod types;

pub use chunking::{WordChunks, chunk_words};
pub use questions::QuestionGenerator;
pub use quiz::{
    ComposedQuiz, DistractorError, DistractorStrategy, QuizComposer, QuizItemError, ReversedAnswer,
};
pub use service::{PipelineSettings, ProcessingApi, QuizPipeline};
pub use summarize::{MapReduceSummarizer, join_summaries};
pub use types::{
    ChunkOutcome, ChunkSummary, ChunkingError, FALLBACK_OPTIONS, PipelineError, ProcessedDocument,
    Quiz, QuizItem,
};
