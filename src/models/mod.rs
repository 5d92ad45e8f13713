//! Capability clients for the external models the pipeline depends on.
//!
//! The pipeline only sees three traits: [`SummarizationClient`], [`TextGenerationClient`], and
//! [`QuestionAnsweringClient`]. Concrete backends talk to the Hugging Face Inference API or to
//! a local Ollama runtime over HTTP. Handles are built once at startup by
//! [`build_model_handles`] and shared by every request through `Arc`.

mod huggingface;
mod ollama;

pub use huggingface::HuggingFaceClient;
pub use ollama::OllamaClient;

use crate::config::{Config, ModelProvider};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by model backends.
#[derive(Debug, Error)]
pub enum ModelClientError {
    /// Provider was unreachable or the model endpoint does not exist.
    #[error("Model provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Model request failed: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed or carried no usable output.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Token-length hints forwarded to a summarization model.
///
/// These bind the intent of a call only; the returned text is never measured against them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthBudget {
    /// Minimum length hint.
    pub min_length: usize,
    /// Maximum length hint.
    pub max_length: usize,
}

impl LengthBudget {
    /// Build a budget from `(min, max)` hints.
    pub const fn new(min_length: usize, max_length: usize) -> Self {
        Self {
            min_length,
            max_length,
        }
    }
}

/// Request passed to a text-generation model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Fully assembled prompt, including any instruction prefix.
    pub prompt: String,
    /// Maximum length hint for each generated sequence.
    pub max_length: usize,
    /// Number of independently decoded sequences requested.
    pub num_return_sequences: usize,
    /// Beam-search width.
    pub num_beams: usize,
}

/// Abstractive summarization capability.
#[async_trait]
pub trait SummarizationClient: Send + Sync {
    /// Summarize `text` within the given length hints.
    async fn summarize(
        &self,
        text: &str,
        budget: LengthBudget,
    ) -> Result<String, ModelClientError>;
}

/// Sequence-to-sequence text generation capability.
#[async_trait]
pub trait TextGenerationClient: Send + Sync {
    /// Generate up to `request.num_return_sequences` strings, in model order.
    async fn generate(&self, request: GenerationRequest) -> Result<Vec<String>, ModelClientError>;
}

/// Extractive question-answering capability.
#[async_trait]
pub trait QuestionAnsweringClient: Send + Sync {
    /// Answer `question` from `context`.
    async fn answer(&self, question: &str, context: &str) -> Result<String, ModelClientError>;
}

/// Long-lived, shared capability handles injected into the pipeline.
#[derive(Clone)]
pub struct ModelHandles {
    /// Summarization backend used for both map and reduce passes.
    pub summarizer: Arc<dyn SummarizationClient>,
    /// Text generation backend used for question generation.
    pub generator: Arc<dyn TextGenerationClient>,
    /// Question-answering backend used while composing the quiz.
    pub answerer: Arc<dyn QuestionAnsweringClient>,
}

/// Build capability handles for the configured provider.
pub fn build_model_handles(config: &Config) -> Result<ModelHandles, ModelClientError> {
    let timeout = Duration::from_secs(config.model_timeout_secs);
    tracing::info!(
        provider = ?config.model_provider,
        summarization_model = %config.summarization_model,
        question_model = %config.question_model,
        qa_model = %config.qa_model,
        "Initializing model clients"
    );

    match config.model_provider {
        ModelProvider::HuggingFace => {
            let build = |model: &str| {
                HuggingFaceClient::new(
                    config.hf_api_url.clone(),
                    model.to_string(),
                    config.hf_api_token.clone(),
                    timeout,
                )
                .map(Arc::new)
            };
            Ok(ModelHandles {
                summarizer: build(&config.summarization_model)?,
                generator: build(&config.question_model)?,
                answerer: build(&config.qa_model)?,
            })
        }
        ModelProvider::Ollama => {
            let build = |model: &str| {
                OllamaClient::new(config.ollama_url.clone(), model.to_string(), timeout)
                    .map(Arc::new)
            };
            Ok(ModelHandles {
                summarizer: build(&config.summarization_model)?,
                generator: build(&config.question_model)?,
                answerer: build(&config.qa_model)?,
            })
        }
    }
}

/// Translate a transport-level failure into the client error taxonomy.
pub(crate) fn transport_error(base_url: &str, error: reqwest::Error) -> ModelClientError {
    ModelClientError::ProviderUnavailable(format!("failed to reach {base_url}: {error}"))
}

/// Map a non-success response onto the client error taxonomy.
pub(crate) async fn status_error(endpoint: &str, response: reqwest::Response) -> ModelClientError {
    let status = response.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        return ModelClientError::ProviderUnavailable(format!("endpoint {endpoint} returned 404"));
    }
    let body = response.text().await.unwrap_or_default();
    ModelClientError::GenerationFailed(format!("{endpoint} returned {status}: {body}"))
}
