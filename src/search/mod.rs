//! Lexical retrieval: a pluggable scoring function over a fixed corpus.

pub mod bm25;
pub mod retriever;

pub use bm25::Bm25Scorer;
pub use retriever::Retriever;

use crate::error::Result;

/// A tokenized document corpus, index-aligned with its label list.
pub type Corpus = Vec<Vec<String>>;

/// Relevance scoring over a fixed corpus.
///
/// Implementations are built once from a corpus and are read-only
/// afterwards, so concurrent scoring is safe. `score` returns one score per
/// corpus document, in corpus order.
pub trait Scorer {
    fn score(&self, query_tokens: &[String]) -> Result<Vec<f64>>;

    /// Number of documents in the underlying corpus.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
