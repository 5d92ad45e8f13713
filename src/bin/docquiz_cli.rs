use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use docquiz::{
    config::Config,
    logging,
    processing::{PipelineSettings, QuizPipeline},
};

#[derive(Parser)]
#[command(
    name = "docquiz-cli",
    about = "Summarize a PDF and print a multiple-choice quiz as JSON"
)]
struct Cli {
    /// PDF document to process.
    input: PathBuf,
    /// Override the number of words per summarization chunk.
    #[arg(long)]
    max_words: Option<usize>,
    /// Override the number of generated questions.
    #[arg(long)]
    num_questions: Option<usize>,
    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    logging::init_cli_tracing();

    let mut config = Config::from_env().context("failed to load configuration")?;
    if let Some(max_words) = cli.max_words {
        anyhow::ensure!(max_words > 0, "--max-words must be greater than zero");
        config.chunk_max_words = max_words;
    }
    if let Some(num_questions) = cli.num_questions {
        anyhow::ensure!(num_questions > 0, "--num-questions must be greater than zero");
        config.num_questions = num_questions;
    }

    let document = tokio::fs::read(&cli.input)
        .await
        .with_context(|| format!("failed to read {}", cli.input.display()))?;

    let pipeline = QuizPipeline::from_config(&config).context("failed to initialize models")?;
    let PipelineSettings {
        max_words,
        num_questions,
        ..
    } = pipeline.settings();
    tracing::info!(max_words, num_questions, "Processing {}", cli.input.display());

    let processed = pipeline
        .process_document(document)
        .await
        .with_context(|| format!("failed to process {}", cli.input.display()))?;

    let output = if cli.pretty {
        serde_json::to_string_pretty(&processed)?
    } else {
        serde_json::to_string(&processed)?
    };
    println!("{output}");
    Ok(())
}
