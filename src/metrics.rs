use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing pipeline activity since startup.
#[derive(Default)]
pub struct PipelineMetrics {
    documents_processed: AtomicU64,
    documents_failed: AtomicU64,
    chunks_summarized: AtomicU64,
    chunks_dropped: AtomicU64,
    questions_generated: AtomicU64,
    fallback_quiz_items: AtomicU64,
}

impl PipelineMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a document that produced a full response.
    pub fn record_document(&self, questions: u64) {
        self.documents_processed.fetch_add(1, Ordering::Relaxed);
        self.questions_generated
            .fetch_add(questions, Ordering::Relaxed);
    }

    /// Record a document whose processing aborted with a fatal error.
    pub fn record_failure(&self) {
        self.documents_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of the map summarization pass.
    pub fn record_chunks(&self, summarized: u64, dropped: u64) {
        self.chunks_summarized
            .fetch_add(summarized, Ordering::Relaxed);
        self.chunks_dropped.fetch_add(dropped, Ordering::Relaxed);
    }

    /// Record quiz items that were replaced by the placeholder item.
    pub fn record_fallback_items(&self, count: u64) {
        self.fallback_quiz_items
            .fetch_add(count, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_processed: self.documents_processed.load(Ordering::Relaxed),
            documents_failed: self.documents_failed.load(Ordering::Relaxed),
            chunks_summarized: self.chunks_summarized.load(Ordering::Relaxed),
            chunks_dropped: self.chunks_dropped.load(Ordering::Relaxed),
            questions_generated: self.questions_generated.load(Ordering::Relaxed),
            fallback_quiz_items: self.fallback_quiz_items.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of pipeline counters used for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Documents that produced a summary and quiz.
    pub documents_processed: u64,
    /// Documents rejected by a fatal pipeline error.
    pub documents_failed: u64,
    /// Chunks whose summary reached the reduce pass.
    pub chunks_summarized: u64,
    /// Chunks excluded after a summarization failure.
    pub chunks_dropped: u64,
    /// Questions returned by the generation model.
    pub questions_generated: u64,
    /// Quiz items replaced by the placeholder options.
    pub fallback_quiz_items: u64,
}
