//! Hugging Face Inference API backend.
//!
//! One client instance targets one model. The same type implements all three capability
//! traits because the Inference API exposes every task behind `POST /models/{model}`; only
//! the payload and response shapes differ.

use super::{
    GenerationRequest, LengthBudget, ModelClientError, QuestionAnsweringClient,
    SummarizationClient, TextGenerationClient, status_error, transport_error,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;

/// HTTP client bound to a single Hugging Face model.
pub struct HuggingFaceClient {
    http: Client,
    base_url: String,
    model: String,
    api_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SummaryOutput {
    summary_text: String,
}

#[derive(Debug, Deserialize)]
struct GeneratedOutput {
    generated_text: String,
}

#[derive(Debug, Deserialize)]
struct AnswerOutput {
    answer: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AnswerPayload {
    Single(AnswerOutput),
    Ranked(Vec<AnswerOutput>),
}

impl HuggingFaceClient {
    /// Build a client for `model` hosted under `base_url`.
    pub fn new(
        base_url: String,
        model: String,
        api_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ModelClientError> {
        let http = Client::builder()
            .user_agent("docquiz/huggingface")
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
            api_token,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}", self.base_url.trim_end_matches('/'), self.model)
    }

    async fn infer<T: DeserializeOwned>(&self, payload: Value) -> Result<T, ModelClientError> {
        let endpoint = self.endpoint();
        let mut request = self.http.post(&endpoint).json(&payload);
        if let Some(token) = self.api_token.as_deref() {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|error| transport_error(&self.base_url, error))?;

        if !response.status().is_success() {
            return Err(status_error(&endpoint, response).await);
        }

        response.json().await.map_err(|error| {
            ModelClientError::InvalidResponse(format!(
                "failed to decode response from {}: {error}",
                self.model
            ))
        })
    }
}

#[async_trait]
impl SummarizationClient for HuggingFaceClient {
    async fn summarize(
        &self,
        text: &str,
        budget: LengthBudget,
    ) -> Result<String, ModelClientError> {
        let payload = json!({
            "inputs": text,
            "parameters": {
                "min_length": budget.min_length,
                "max_length": budget.max_length,
                "do_sample": false,
            },
            "options": { "wait_for_model": true },
        });

        let outputs: Vec<SummaryOutput> = self.infer(payload).await?;
        outputs
            .into_iter()
            .next()
            .map(|output| output.summary_text.trim().to_string())
            .ok_or_else(|| ModelClientError::InvalidResponse("no summary returned".into()))
    }
}

#[async_trait]
impl TextGenerationClient for HuggingFaceClient {
    async fn generate(&self, request: GenerationRequest) -> Result<Vec<String>, ModelClientError> {
        let payload = json!({
            "inputs": request.prompt,
            "parameters": {
                "max_length": request.max_length,
                "num_return_sequences": request.num_return_sequences,
                "num_beams": request.num_beams,
            },
            "options": { "wait_for_model": true },
        });

        let outputs: Vec<GeneratedOutput> = self.infer(payload).await?;
        Ok(outputs
            .into_iter()
            .map(|output| output.generated_text)
            .collect())
    }
}

#[async_trait]
impl QuestionAnsweringClient for HuggingFaceClient {
    async fn answer(&self, question: &str, context: &str) -> Result<String, ModelClientError> {
        let payload = json!({
            "inputs": { "question": question, "context": context },
            "options": { "wait_for_model": true },
        });

        let output: AnswerPayload = self.infer(payload).await?;
        match output {
            AnswerPayload::Single(output) => Ok(output.answer),
            AnswerPayload::Ranked(outputs) => outputs
                .into_iter()
                .next()
                .map(|output| output.answer)
                .ok_or_else(|| ModelClientError::InvalidResponse("no answer returned".into())),
        }
    }
}
