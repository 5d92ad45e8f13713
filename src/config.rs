use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

const DEFAULT_HF_API_URL: &str = "https://api-inference.huggingface.co";
const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";
const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";
const DEFAULT_HF_SUMMARIZATION_MODEL: &str = "facebook/bart-large-cnn";
const DEFAULT_HF_QUESTION_MODEL: &str = "valhalla/t5-base-qg-hl";
const DEFAULT_HF_QA_MODEL: &str = "deepset/roberta-base-squad2";

/// Default number of whitespace tokens per chunk fed to the summarizer.
pub const DEFAULT_CHUNK_MAX_WORDS: usize = 1000;
/// Default number of questions requested from the generation model.
pub const DEFAULT_NUM_QUESTIONS: usize = 5;
/// Default upper bound for uploaded documents (20 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 120;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the docquiz server and CLI.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Backend used for summarization, question generation, and question answering.
    pub model_provider: ModelProvider,
    /// Base URL of the Hugging Face Inference API.
    pub hf_api_url: String,
    /// Optional bearer token for the Hugging Face Inference API.
    pub hf_api_token: Option<String>,
    /// Base URL of the Ollama runtime.
    pub ollama_url: String,
    /// Model identifier used for abstractive summarization.
    pub summarization_model: String,
    /// Model identifier used for question generation.
    pub question_model: String,
    /// Model identifier used for extractive question answering.
    pub qa_model: String,
    /// Per-request timeout applied to model HTTP calls.
    pub model_timeout_secs: u64,
    /// Maximum number of words per chunk.
    pub chunk_max_words: usize,
    /// Number of questions generated per document.
    pub num_questions: usize,
    /// Number of chunk summaries or quiz items processed concurrently.
    pub pipeline_concurrency: usize,
    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: usize,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

/// Supported model backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    /// Hosted Hugging Face Inference API.
    HuggingFace,
    /// Local Ollama runtime.
    Ollama,
}

impl ModelProvider {
    fn default_models(self) -> (&'static str, &'static str, &'static str) {
        match self {
            Self::HuggingFace => (
                DEFAULT_HF_SUMMARIZATION_MODEL,
                DEFAULT_HF_QUESTION_MODEL,
                DEFAULT_HF_QA_MODEL,
            ),
            Self::Ollama => (
                DEFAULT_OLLAMA_MODEL,
                DEFAULT_OLLAMA_MODEL,
                DEFAULT_OLLAMA_MODEL,
            ),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        let model_provider = match load_env_optional("MODEL_PROVIDER") {
            Some(value) => value
                .parse()
                .map_err(|()| ConfigError::InvalidValue("MODEL_PROVIDER".to_string()))?,
            None => ModelProvider::HuggingFace,
        };
        let (summarization_default, question_default, qa_default) =
            model_provider.default_models();

        Ok(Self {
            model_provider,
            hf_api_url: load_env_optional("HF_API_URL")
                .unwrap_or_else(|| DEFAULT_HF_API_URL.to_string()),
            hf_api_token: load_env_optional("HF_API_TOKEN"),
            ollama_url: load_env_optional("OLLAMA_URL")
                .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            summarization_model: load_env_optional("SUMMARIZATION_MODEL")
                .unwrap_or_else(|| summarization_default.to_string()),
            question_model: load_env_optional("QUESTION_MODEL")
                .unwrap_or_else(|| question_default.to_string()),
            qa_model: load_env_optional("QA_MODEL").unwrap_or_else(|| qa_default.to_string()),
            model_timeout_secs: parse_env_or("MODEL_TIMEOUT_SECS", DEFAULT_MODEL_TIMEOUT_SECS)?,
            chunk_max_words: parse_positive_or("CHUNK_MAX_WORDS", DEFAULT_CHUNK_MAX_WORDS)?,
            num_questions: parse_positive_or("NUM_QUESTIONS", DEFAULT_NUM_QUESTIONS)?,
            pipeline_concurrency: parse_positive_or("PIPELINE_CONCURRENCY", 1)?,
            max_upload_bytes: parse_positive_or("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
        })
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_env_or<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
        .map(|value| value.unwrap_or(default))
}

fn parse_positive_or(key: &str, default: usize) -> Result<usize, ConfigError> {
    match parse_env_or(key, default)? {
        0 => Err(ConfigError::InvalidValue(key.to_string())),
        value => Ok(value),
    }
}

impl FromStr for ModelProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "huggingface" | "hf" => Ok(Self::HuggingFace),
            "ollama" => Ok(Self::Ollama),
            _ => Err(()),
        }
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        provider = ?config.model_provider,
        summarization_model = %config.summarization_model,
        question_model = %config.question_model,
        qa_model = %config.qa_model,
        chunk_max_words = config.chunk_max_words,
        num_questions = config.num_questions,
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_parses_known_values() {
        assert_eq!("ollama".parse::<ModelProvider>(), Ok(ModelProvider::Ollama));
        assert_eq!("HuggingFace".parse::<ModelProvider>(), Ok(ModelProvider::HuggingFace));
        assert_eq!(" hf ".parse::<ModelProvider>(), Ok(ModelProvider::HuggingFace));
        assert_eq!("openai".parse::<ModelProvider>(), Err(()));
    }

    #[test]
    fn provider_defaults_follow_backend() {
        let (summarization, question, qa) = ModelProvider::HuggingFace.default_models();
        assert_eq!(summarization, "facebook/bart-large-cnn");
        assert_eq!(question, "valhalla/t5-base-qg-hl");
        assert_eq!(qa, "deepset/roberta-base-squad2");

        let (summarization, _, _) = ModelProvider::Ollama.default_models();
        assert_eq!(summarization, "llama3.2");
    }
}
