//! In-memory Okapi BM25 scorer.
//!
//! Fitted once over a tokenized corpus and serialized to JSON as the
//! persisted retrieval index. Terms appearing in more than half the corpus
//! would get a negative IDF; those are floored at `EPSILON` times the
//! average IDF instead of being allowed to subtract from the score.

use crate::error::{Result, ShopmatchError};
use crate::search::{Corpus, Scorer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Term frequency saturation parameter.
const PARAM_K1: f64 = 1.5;
/// Document length normalization parameter.
const PARAM_B: f64 = 0.75;
/// Floor factor for negative IDF values.
const EPSILON: f64 = 0.25;

/// BM25 index over a fixed corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bm25Scorer {
    doc_freqs: Vec<HashMap<String, usize>>,
    idf: HashMap<String, f64>,
    doc_len: Vec<usize>,
    avgdl: f64,
    average_idf: f64,
}

impl Bm25Scorer {
    /// Fit the index over `corpus`. An empty corpus is an error, not a
    /// degenerate index.
    pub fn fit(corpus: &Corpus) -> Result<Self> {
        if corpus.is_empty() {
            return Err(ShopmatchError::Search(
                "cannot fit a BM25 index over an empty corpus".to_string(),
            ));
        }

        let mut term_doc_count: HashMap<String, usize> = HashMap::new();
        let mut doc_freqs = Vec::with_capacity(corpus.len());
        let mut doc_len = Vec::with_capacity(corpus.len());
        let mut total_len = 0usize;

        for document in corpus {
            doc_len.push(document.len());
            total_len += document.len();

            let mut freqs: HashMap<String, usize> = HashMap::new();
            for token in document {
                *freqs.entry(token.clone()).or_insert(0) += 1;
            }
            for term in freqs.keys() {
                *term_doc_count.entry(term.clone()).or_insert(0) += 1;
            }
            doc_freqs.push(freqs);
        }

        let n = corpus.len() as f64;
        let mut idf = HashMap::with_capacity(term_doc_count.len());
        let mut idf_sum = 0.0;
        let mut negative_terms = Vec::new();
        for (term, df) in &term_doc_count {
            let value = (n - *df as f64 + 0.5).ln() - (*df as f64 + 0.5).ln();
            idf_sum += value;
            if value < 0.0 {
                negative_terms.push(term.clone());
            }
            idf.insert(term.clone(), value);
        }

        // An all-empty corpus has no vocabulary; scoring it is meaningless.
        if idf.is_empty() {
            return Err(ShopmatchError::Search(
                "corpus has an empty vocabulary".to_string(),
            ));
        }

        let average_idf = idf_sum / idf.len() as f64;
        let floor = EPSILON * average_idf;
        for term in negative_terms {
            idf.insert(term, floor);
        }

        Ok(Self {
            doc_freqs,
            idf,
            doc_len,
            avgdl: total_len as f64 / n,
            average_idf,
        })
    }

    /// Mean IDF over the vocabulary. Exposed for diagnostics.
    pub fn average_idf(&self) -> f64 {
        self.average_idf
    }

    /// Persist the fitted index as JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Load a previously fitted index.
    ///
    /// A missing file is a precondition failure: the index must be trained
    /// before evaluation.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ShopmatchError::MissingIndex(path.to_path_buf()));
        }
        let file = File::open(path)?;
        let scorer = serde_json::from_reader(BufReader::new(file))?;
        Ok(scorer)
    }
}

impl Scorer for Bm25Scorer {
    fn score(&self, query_tokens: &[String]) -> Result<Vec<f64>> {
        let mut scores = Vec::with_capacity(self.doc_freqs.len());
        for (freqs, &dl) in self.doc_freqs.iter().zip(&self.doc_len) {
            let dl = dl as f64;
            let mut score = 0.0;
            for term in query_tokens {
                let tf = match freqs.get(term) {
                    Some(&tf) => tf as f64,
                    None => continue,
                };
                let idf = self.idf.get(term).copied().unwrap_or(0.0);
                let denom = tf + PARAM_K1 * (1.0 - PARAM_B + PARAM_B * dl / self.avgdl);
                score += idf * tf * (PARAM_K1 + 1.0) / denom;
            }
            scores.push(score);
        }
        Ok(scores)
    }

    fn len(&self) -> usize {
        self.doc_freqs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn corpus(docs: &[&str]) -> Corpus {
        docs.iter()
            .map(|d| d.split_whitespace().map(str::to_string).collect())
            .collect()
    }

    fn tokens(query: &str) -> Vec<String> {
        query.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_relevant_document_scores_higher() {
        let scorer = Bm25Scorer::fit(&corpus(&[
            "red widget deluxe edition",
            "blue gadget standard",
            "green gizmo",
        ]))
        .unwrap();
        let scores = scorer.score(&tokens("red widget")).unwrap();
        assert_eq!(scores.len(), 3);
        assert!(scores[0] > scores[1]);
        assert!(scores[0] > scores[2]);
    }

    #[test]
    fn test_unknown_terms_contribute_nothing() {
        let scorer = Bm25Scorer::fit(&corpus(&["red widget", "blue gadget"])).unwrap();
        let scores = scorer.score(&tokens("zzz qqq")).unwrap();
        assert_eq!(scores, vec![0.0, 0.0]);
    }

    #[test]
    fn test_empty_corpus_is_an_error() {
        let err = Bm25Scorer::fit(&Vec::new()).unwrap_err();
        assert!(matches!(err, ShopmatchError::Search(_)));
    }

    #[test]
    fn test_empty_vocabulary_is_an_error() {
        let err = Bm25Scorer::fit(&corpus(&["", ""])).unwrap_err();
        assert!(matches!(err, ShopmatchError::Search(_)));
    }

    #[test]
    fn test_common_terms_keep_positive_weight() {
        // "widget" appears in every document; its raw IDF would be negative,
        // but the floored weight must stay positive (average IDF here is
        // positive since the other terms are rare).
        let scorer = Bm25Scorer::fit(&corpus(&[
            "widget red",
            "widget blue",
            "widget green",
            "widget yellow",
        ]))
        .unwrap();
        let scores = scorer.score(&tokens("widget")).unwrap();
        assert!(scores.iter().all(|&s| s > 0.0), "scores: {:?}", scores);
    }

    #[test]
    fn test_identical_documents_score_identically() {
        let scorer = Bm25Scorer::fit(&corpus(&["red widget", "red widget", "blue cap"])).unwrap();
        let scores = scorer.score(&tokens("red widget")).unwrap();
        assert!((scores[0] - scores[1]).abs() < 1e-12);
    }

    #[test]
    fn test_save_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bm25_index.json");
        let scorer = Bm25Scorer::fit(&corpus(&["red widget", "blue gadget"])).unwrap();
        scorer.save(&path).unwrap();

        let loaded = Bm25Scorer::load(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        let before = scorer.score(&tokens("red widget")).unwrap();
        let after = loaded.score(&tokens("red widget")).unwrap();
        for (a, b) in before.iter().zip(&after) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_load_missing_index_is_precondition_failure() {
        let temp_dir = TempDir::new().unwrap();
        let err = Bm25Scorer::load(&temp_dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ShopmatchError::MissingIndex(_)));
    }
}
