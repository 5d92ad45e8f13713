//! Pipeline service coordinating extraction, summarization, question generation, and quiz
//! composition.

use crate::{
    config::{Config, DEFAULT_CHUNK_MAX_WORDS, DEFAULT_NUM_QUESTIONS},
    extraction::{PdfTextExtractor, TextExtractor, document_fingerprint},
    metrics::{MetricsSnapshot, PipelineMetrics},
    models::{ModelClientError, ModelHandles, build_model_handles},
    processing::{
        chunking::chunk_words,
        questions::QuestionGenerator,
        quiz::{DistractorStrategy, QuizComposer},
        summarize::{MapReduceSummarizer, join_summaries},
        types::{PipelineError, ProcessedDocument},
    },
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// Tunables for one pipeline instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Maximum number of words per chunk.
    pub max_words: usize,
    /// Number of questions requested per document.
    pub num_questions: usize,
    /// Number of chunk summaries or quiz items processed at once.
    pub concurrency: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_words: DEFAULT_CHUNK_MAX_WORDS,
            num_questions: DEFAULT_NUM_QUESTIONS,
            concurrency: 1,
        }
    }
}

impl PipelineSettings {
    /// Derive settings from the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_words: config.chunk_max_words,
            num_questions: config.num_questions,
            concurrency: config.pipeline_concurrency,
        }
    }
}

/// Abstraction over the pipeline used by external surfaces (HTTP, CLI).
#[async_trait]
pub trait ProcessingApi: Send + Sync {
    /// Turn an uploaded document into a summary and a quiz.
    async fn process_document(
        &self,
        document: Vec<u8>,
    ) -> Result<ProcessedDocument, PipelineError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

/// Document-to-quiz pipeline.
///
/// The pipeline owns long-lived handles to the model clients and the text extractor. Build it
/// once near process start and share it through an `Arc`; it keeps no per-request state.
pub struct QuizPipeline {
    extractor: Arc<dyn TextExtractor>,
    summarizer: MapReduceSummarizer,
    questions: QuestionGenerator,
    composer: QuizComposer,
    settings: PipelineSettings,
    metrics: Arc<PipelineMetrics>,
}

impl QuizPipeline {
    /// Assemble a pipeline from explicit capability handles.
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        models: ModelHandles,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            extractor,
            summarizer: MapReduceSummarizer::new(models.summarizer)
                .with_concurrency(settings.concurrency),
            questions: QuestionGenerator::new(models.generator, settings.num_questions),
            composer: QuizComposer::new(models.answerer).with_concurrency(settings.concurrency),
            settings,
            metrics: Arc::new(PipelineMetrics::new()),
        }
    }

    /// Build the production pipeline (PDF extraction plus configured model backends).
    pub fn from_config(config: &Config) -> Result<Self, ModelClientError> {
        let models = build_model_handles(config)?;
        Ok(Self::new(
            Arc::new(PdfTextExtractor::new()),
            models,
            PipelineSettings::from_config(config),
        ))
    }

    /// Replace the distractor strategy used when composing quiz items.
    pub fn with_distractors(mut self, distractors: Arc<dyn DistractorStrategy>) -> Self {
        self.composer = self.composer.with_distractors(distractors);
        self
    }

    /// Settings this pipeline was built with.
    pub fn settings(&self) -> PipelineSettings {
        self.settings
    }

    /// Run the full pipeline over one uploaded document.
    pub async fn process_document(
        &self,
        document: Vec<u8>,
    ) -> Result<ProcessedDocument, PipelineError> {
        let span = tracing::info_span!(
            "process_document",
            request_id = %Uuid::new_v4(),
            fingerprint = %document_fingerprint(&document),
            bytes = document.len(),
        );
        let result = self.run(document).instrument(span).await;
        match &result {
            Ok(processed) => self.metrics.record_document(processed.quiz.len() as u64),
            Err(error) => {
                tracing::error!(error = %error, "Document processing failed");
                self.metrics.record_failure();
            }
        }
        result
    }

    /// Summarize already extracted text and build the quiz.
    pub async fn process_text(&self, text: &str) -> Result<ProcessedDocument, PipelineError> {
        let chunks = chunk_words(text, self.settings.max_words)?;
        let outcomes = self.summarizer.summarize_chunks(chunks).await;
        let combined = join_summaries(&outcomes);
        let summarized = outcomes
            .iter()
            .filter(|outcome| outcome.summary().is_some())
            .count();
        let dropped = outcomes.len() - summarized;
        self.metrics.record_chunks(summarized as u64, dropped as u64);
        tracing::info!(
            chunks = outcomes.len(),
            summarized,
            dropped,
            "Chunk summaries ready"
        );

        let summary = self
            .summarizer
            .reduce(&combined)
            .await
            .map_err(PipelineError::ReduceSummarization)?;

        let questions = self
            .questions
            .generate(&summary)
            .await
            .map_err(PipelineError::QuestionGeneration)?;

        let composed = self.composer.compose(questions, &summary).await;
        self.metrics
            .record_fallback_items(composed.fallback_items as u64);
        tracing::info!(
            items = composed.items.len(),
            fallback_items = composed.fallback_items,
            "Quiz composed"
        );

        Ok(ProcessedDocument {
            summary,
            quiz: composed.items,
        })
    }

    async fn run(&self, document: Vec<u8>) -> Result<ProcessedDocument, PipelineError> {
        let extractor = Arc::clone(&self.extractor);
        let text = tokio::task::spawn_blocking(move || extractor.extract(&document))
            .await
            .map_err(|error| PipelineError::ExtractionTask(error.to_string()))??;
        tracing::debug!(chars = text.len(), "Document text extracted");
        self.process_text(&text).await
    }
}

#[async_trait]
impl ProcessingApi for QuizPipeline {
    async fn process_document(
        &self,
        document: Vec<u8>,
    ) -> Result<ProcessedDocument, PipelineError> {
        QuizPipeline::process_document(self, document).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::DocumentFormatError;
    use crate::models::{
        GenerationRequest, LengthBudget, QuestionAnsweringClient, SummarizationClient,
        TextGenerationClient,
    };
    use crate::processing::quiz::DistractorError;

    struct PlainText;

    impl TextExtractor for PlainText {
        fn extract(&self, document: &[u8]) -> Result<String, DocumentFormatError> {
            String::from_utf8(document.to_vec())
                .map_err(|error| DocumentFormatError::Unreadable(error.to_string()))
        }
    }

    struct FirstWord;

    #[async_trait]
    impl SummarizationClient for FirstWord {
        async fn summarize(
            &self,
            text: &str,
            _budget: LengthBudget,
        ) -> Result<String, ModelClientError> {
            text.split_whitespace()
                .next()
                .map(str::to_string)
                .ok_or_else(|| ModelClientError::InvalidResponse("empty input".into()))
        }
    }

    struct Fixed(Vec<String>);

    #[async_trait]
    impl TextGenerationClient for Fixed {
        async fn generate(
            &self,
            _request: GenerationRequest,
        ) -> Result<Vec<String>, ModelClientError> {
            Ok(self.0.clone())
        }
    }

    struct Echo;

    #[async_trait]
    impl QuestionAnsweringClient for Echo {
        async fn answer(&self, _question: &str, context: &str) -> Result<String, ModelClientError> {
            Ok(context.to_string())
        }
    }

    struct Constant;

    impl DistractorStrategy for Constant {
        fn distractors(
            &self,
            _question: &str,
            _answer: &str,
            _context: &str,
        ) -> Result<[String; 3], DistractorError> {
            Ok(["x".into(), "y".into(), "z".into()])
        }
    }

    fn pipeline(settings: PipelineSettings) -> QuizPipeline {
        QuizPipeline::new(
            Arc::new(PlainText),
            ModelHandles {
                summarizer: Arc::new(FirstWord),
                generator: Arc::new(Fixed(vec!["Q1".into(), "Q2".into()])),
                answerer: Arc::new(Echo),
            },
            settings,
        )
    }

    #[tokio::test]
    async fn processes_document_end_to_end() {
        let pipeline = pipeline(PipelineSettings {
            max_words: 2,
            ..PipelineSettings::default()
        });

        let processed = pipeline
            .process_document(b"alpha beta gamma delta".to_vec())
            .await
            .expect("processed");

        // chunks: "alpha beta", "gamma delta" -> "alpha gamma" -> reduce -> "alpha"
        assert_eq!(processed.summary, "alpha");
        assert_eq!(processed.quiz.len(), 2);
        assert_eq!(processed.quiz[0].question, "Q1");
        assert_eq!(processed.quiz[0].correct, "alpha");
        assert_eq!(processed.quiz[0].options[1], "ahpla");

        let snapshot = pipeline.metrics_snapshot();
        assert_eq!(snapshot.documents_processed, 1);
        assert_eq!(snapshot.chunks_summarized, 2);
        assert_eq!(snapshot.questions_generated, 2);
    }

    #[tokio::test]
    async fn unreadable_document_is_fatal() {
        let pipeline = pipeline(PipelineSettings::default());

        let error = pipeline
            .process_document(vec![0xff, 0xfe, 0xfd])
            .await
            .expect_err("invalid utf-8");

        assert!(matches!(error, PipelineError::DocumentFormat(_)));
        assert_eq!(pipeline.metrics_snapshot().documents_failed, 1);
    }

    #[tokio::test]
    async fn empty_document_reaches_failing_reduce() {
        let pipeline = pipeline(PipelineSettings::default());

        let error = pipeline
            .process_document(Vec::new())
            .await
            .expect_err("reduce on empty input");

        assert!(matches!(error, PipelineError::ReduceSummarization(_)));
    }

    #[tokio::test]
    async fn custom_distractors_are_used() {
        let pipeline = pipeline(PipelineSettings::default()).with_distractors(Arc::new(Constant));

        let processed = pipeline.process_text("word").await.expect("processed");

        assert_eq!(
            processed.quiz[0].options,
            ["word", "x", "y", "z"].map(str::to_string)
        );
    }

    #[test]
    fn settings_default_to_documented_values() {
        let settings = PipelineSettings::default();
        assert_eq!(settings.max_words, 1000);
        assert_eq!(settings.num_questions, 5);
        assert_eq!(settings.concurrency, 1);
    }
}
