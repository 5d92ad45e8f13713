//! Word-budget chunking for length-limited models.
//!
//! Text is split on whitespace and regrouped into consecutive chunks of at most `max_words`
//! tokens. Chunks ignore sentence and paragraph boundaries; whitespace inside a chunk is
//! collapsed to single spaces while the token sequence is preserved exactly.

use std::str::SplitWhitespace;

use super::types::ChunkingError;

/// Lazy iterator over word chunks of a borrowed text.
///
/// A clone replays the chunks not yet consumed; call [`chunk_words`] again to start over.
#[derive(Debug, Clone)]
pub struct WordChunks<'a> {
    tokens: SplitWhitespace<'a>,
    max_words: usize,
}

impl Iterator for WordChunks<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        let mut chunk = String::new();
        for (taken, token) in self.tokens.by_ref().enumerate() {
            if taken > 0 {
                chunk.push(' ');
            }
            chunk.push_str(token);
            if taken + 1 == self.max_words {
                break;
            }
        }
        if chunk.is_empty() { None } else { Some(chunk) }
    }
}

/// Split `text` into chunks of at most `max_words` whitespace-delimited tokens.
///
/// Empty or whitespace-only input yields no chunks. A zero budget is rejected.
pub fn chunk_words(text: &str, max_words: usize) -> Result<WordChunks<'_>, ChunkingError> {
    if max_words == 0 {
        return Err(ChunkingError::InvalidChunkSize);
    }
    Ok(WordChunks {
        tokens: text.split_whitespace(),
        max_words,
    })
}
