//! Two-pass (map-reduce) summarization.
//!
//! Each chunk is summarized on its own with a small budget. Chunks the model rejects are
//! dropped without retry. The surviving summaries are joined in chunk order and condensed by a
//! second call with a larger budget; that call has no failure tolerance.

use crate::models::{LengthBudget, ModelClientError, SummarizationClient};
use futures_util::stream::{self, StreamExt};
use std::sync::Arc;

use super::types::{ChunkOutcome, ChunkSummary};

/// Length hints for the per-chunk pass.
pub const CHUNK_BUDGET: LengthBudget = LengthBudget::new(50, 200);
/// Length hints for the final pass over the joined chunk summaries.
pub const REDUCE_BUDGET: LengthBudget = LengthBudget::new(100, 300);

/// Map-reduce summarizer over a shared summarization client.
pub struct MapReduceSummarizer {
    client: Arc<dyn SummarizationClient>,
    chunk_budget: LengthBudget,
    reduce_budget: LengthBudget,
    concurrency: usize,
}

impl MapReduceSummarizer {
    /// Build a summarizer with the default budgets and sequential chunk processing.
    pub fn new(client: Arc<dyn SummarizationClient>) -> Self {
        Self {
            client,
            chunk_budget: CHUNK_BUDGET,
            reduce_budget: REDUCE_BUDGET,
            concurrency: 1,
        }
    }

    /// Allow up to `concurrency` chunk summaries in flight; output order is unaffected.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Summarize every chunk, returning one outcome per chunk in chunk order.
    pub async fn summarize_chunks<I>(&self, chunks: I) -> Vec<ChunkOutcome>
    where
        I: IntoIterator<Item = String>,
    {
        stream::iter(chunks.into_iter().enumerate())
            .map(|(index, chunk)| self.summarize_chunk(index, chunk))
            .buffered(self.concurrency)
            .collect()
            .await
    }

    async fn summarize_chunk(&self, index: usize, chunk: String) -> ChunkOutcome {
        match self.client.summarize(&chunk, self.chunk_budget).await {
            Ok(text) => ChunkOutcome::Summarized(ChunkSummary { index, text }),
            Err(reason) => {
                tracing::warn!(
                    chunk = index,
                    words = chunk.split_whitespace().count(),
                    error = %reason,
                    "Chunk summarization failed; excluding chunk"
                );
                ChunkOutcome::Dropped { index, reason }
            }
        }
    }

    /// Condense the joined chunk summaries into the final summary.
    pub async fn reduce(&self, combined: &str) -> Result<String, ModelClientError> {
        self.client.summarize(combined, self.reduce_budget).await
    }
}

/// Join the summaries of successful chunks with single spaces, preserving chunk order.
pub fn join_summaries(outcomes: &[ChunkOutcome]) -> String {
    outcomes
        .iter()
        .filter_map(ChunkOutcome::summary)
        .collect::<Vec<_>>()
        .join(" ")
}
