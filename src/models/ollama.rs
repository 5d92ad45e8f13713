//! Ollama backend.
//!
//! Ollama serves general instruction-tuned models through `/api/generate`, so each capability
//! is expressed as a prompt. Length hints map onto `num_predict`; beam search has no Ollama
//! counterpart and is ignored.

use super::{
    GenerationRequest, LengthBudget, ModelClientError, QuestionAnsweringClient,
    SummarizationClient, TextGenerationClient, status_error, transport_error,
};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::OnceLock;
use std::time::Duration;

/// HTTP client bound to a single Ollama model.
pub struct OllamaClient {
    http: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    done: bool,
}

impl OllamaClient {
    /// Build a client for `model` served by the Ollama runtime at `base_url`.
    pub fn new(base_url: String, model: String, timeout: Duration) -> Result<Self, ModelClientError> {
        let http = Client::builder()
            .user_agent("docquiz/ollama")
            .timeout(timeout)
            .build()
            .map_err(|error| {
                ModelClientError::ProviderUnavailable(format!(
                    "failed to construct HTTP client: {error}"
                ))
            })?;
        Ok(Self {
            http,
            base_url,
            model,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }

    async fn complete(&self, prompt: String, options: Value) -> Result<String, ModelClientError> {
        let endpoint = self.endpoint();
        let payload = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": options,
        });

        let response = self
            .http
            .post(&endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|error| transport_error(&self.base_url, error))?;

        if !response.status().is_success() {
            return Err(status_error(&endpoint, response).await);
        }

        let body: OllamaResponse = response.json().await.map_err(|error| {
            ModelClientError::InvalidResponse(format!("failed to decode Ollama response: {error}"))
        })?;

        if !body.done {
            return Err(ModelClientError::InvalidResponse(
                "Ollama response incomplete (streaming not supported)".into(),
            ));
        }

        Ok(body.response.trim().to_string())
    }
}

fn summary_prompt(text: &str, budget: LengthBudget) -> String {
    format!(
        "Summarize the following text as a single factual paragraph of roughly {} to {} words. \
         Do not add information that is not in the text.\n\n{text}",
        budget.min_length, budget.max_length
    )
}

fn generation_prompt(request: &GenerationRequest) -> String {
    format!(
        "Write exactly {} distinct questions that can be answered from the text below. \
         Output one question per line with no numbering and no other text.\n\n{}",
        request.num_return_sequences, request.prompt
    )
}

fn answer_prompt(question: &str, context: &str) -> String {
    format!(
        "Answer the question with a short phrase copied from the context. \
         If the context does not contain the answer, reply with nothing.\n\n\
         Context: {context}\n\nQuestion: {question}\n\nAnswer:"
    )
}

fn list_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| {
        Regex::new(r"^\s*(?:\d+[.)]|[-*•]|Q\d*[:.)])\s*").expect("list marker pattern is valid")
    })
}

/// Split a completion into one cleaned line per generated sequence.
fn split_sequences(completion: &str, limit: usize) -> Vec<String> {
    completion
        .lines()
        .map(|line| list_marker().replace(line, "").trim().to_string())
        .filter(|line| !line.is_empty())
        .take(limit)
        .collect()
}

#[async_trait]
impl SummarizationClient for OllamaClient {
    async fn summarize(
        &self,
        text: &str,
        budget: LengthBudget,
    ) -> Result<String, ModelClientError> {
        let summary = self
            .complete(
                summary_prompt(text, budget),
                json!({ "temperature": 0.1, "num_predict": budget.max_length }),
            )
            .await?;
        if summary.is_empty() {
            return Err(ModelClientError::InvalidResponse("empty summary".into()));
        }
        Ok(summary)
    }
}

#[async_trait]
impl TextGenerationClient for OllamaClient {
    async fn generate(&self, request: GenerationRequest) -> Result<Vec<String>, ModelClientError> {
        tracing::trace!(
            num_beams = request.num_beams,
            "Beam search is not supported by Ollama; using default decoding"
        );
        let completion = self
            .complete(
                generation_prompt(&request),
                json!({
                    "temperature": 0.3,
                    "num_predict": request.max_length * request.num_return_sequences,
                }),
            )
            .await?;
        Ok(split_sequences(&completion, request.num_return_sequences))
    }
}

#[async_trait]
impl QuestionAnsweringClient for OllamaClient {
    async fn answer(&self, question: &str, context: &str) -> Result<String, ModelClientError> {
        let answer = self
            .complete(answer_prompt(question, context), json!({ "temperature": 0.0 }))
            .await?;
        if answer.is_empty() {
            return Err(ModelClientError::InvalidResponse(
                "no answerable span found".into(),
            ));
        }
        Ok(answer)
    }
}
