//! Retrieval session: query tokenization plus delegation to a scorer.

use crate::error::{Result, ShopmatchError};
use crate::search::Scorer;

/// Read-only retrieval session over a fixed corpus.
///
/// Holds a fitted [`Scorer`]; nothing is mutated after construction, so
/// concurrent `search` calls are safe.
pub struct Retriever<S> {
    scorer: S,
}

impl<S: Scorer> Retriever<S> {
    pub fn new(scorer: S) -> Self {
        Self { scorer }
    }

    /// Number of documents in the corpus.
    pub fn corpus_len(&self) -> usize {
        self.scorer.len()
    }

    /// Score `query` against every corpus document.
    ///
    /// The query is tokenized by whitespace only; normalization is assumed
    /// to have been applied upstream. Returns one score per document, in
    /// corpus order, produced fresh on every call.
    pub fn search(&self, query: &str) -> Result<Vec<f64>> {
        let tokens: Vec<String> = query.split_whitespace().map(str::to_string).collect();
        if tokens.is_empty() {
            return Err(ShopmatchError::InvalidInput(format!(
                "query has no tokens: {:?}",
                query
            )));
        }
        self.scorer.score(&tokens)
    }
}
