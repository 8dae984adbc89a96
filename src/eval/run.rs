//! Evaluation loop: per-query retrieval, thresholding, leave-one-out
//! correction, and metric aggregation.

use crate::error::{Result, ShopmatchError};
use crate::eval::metrics::{f1_score, mean_average_precision, mean_reciprocal_rank};
use crate::search::{Retriever, Scorer};
use indicatif::{ProgressBar, ProgressStyle};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// Evaluation cutoffs.
#[derive(Debug, Clone)]
pub struct EvalOptions {
    /// Ranked cutoff.
    pub top_n: usize,
    /// Score threshold: a document counts as a predicted match only when
    /// its score strictly exceeds this.
    pub threshold: f64,
    /// Whether a query's own document may appear in its results.
    pub include_self: bool,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            top_n: 10,
            threshold: 20.0,
            include_self: false,
        }
    }
}

/// Aggregated evaluation outcome.
#[derive(Debug, Clone)]
pub struct EvalOutcome {
    /// Mean average precision over the ranked top-N lists.
    pub map: f64,
    /// Mean reciprocal rank over the ranked top-N lists.
    pub mrr: f64,
    /// Mean of the per-query classification F1 scores.
    pub mean_f1: f64,
    /// Per-query thresholded prediction vectors, kept for optional
    /// persistence.
    pub thresholded: Vec<Vec<u8>>,
}

/// Run every query against the retriever and aggregate metrics.
///
/// `queries` and `query_labels` are index-aligned; `corpus_labels` is
/// index-aligned with the retriever's corpus. When a query is itself a
/// corpus document (the usual leave-one-out protocol), its position in the
/// query list must equal its corpus position so self-removal strikes the
/// right document.
pub fn evaluate<S: Scorer>(
    queries: &[String],
    query_labels: &[String],
    retriever: &Retriever<S>,
    corpus_labels: &[String],
    opts: &EvalOptions,
) -> Result<EvalOutcome> {
    if queries.len() != query_labels.len() {
        return Err(ShopmatchError::InvalidInput(format!(
            "{} queries but {} query labels",
            queries.len(),
            query_labels.len()
        )));
    }
    if corpus_labels.len() != retriever.corpus_len() {
        return Err(ShopmatchError::InvalidInput(format!(
            "{} corpus labels but the corpus holds {} documents",
            corpus_labels.len(),
            retriever.corpus_len()
        )));
    }
    if !opts.include_self && queries.len() > corpus_labels.len() {
        return Err(ShopmatchError::InvalidInput(
            "more queries than corpus documents with include_self disabled".to_string(),
        ));
    }

    let start = std::time::Instant::now();
    let pb = ProgressBar::new(queries.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40}] {pos}/{len}")
            .unwrap(),
    );
    pb.set_message("Queries");

    let mut relevance_lists: Vec<Vec<u8>> = Vec::with_capacity(queries.len());
    let mut f1_scores: Vec<f64> = Vec::with_capacity(queries.len());
    let mut thresholded: Vec<Vec<u8>> = Vec::with_capacity(queries.len());

    for (i, (query, label)) in queries.iter().zip(query_labels).enumerate() {
        let scores = retriever.search(query)?;

        // Ranked candidates: top_n + 1 overshoot so that striking the
        // query's own document still leaves top_n of them.
        let mut top_inds = rank_descending(&scores);
        top_inds.truncate(opts.top_n + 1);
        top_inds.retain(|&ix| scores[ix] > opts.threshold);

        let mut preds: Vec<u8> = scores
            .iter()
            .map(|&s| u8::from(s > opts.threshold))
            .collect();
        let mut truth: Vec<u8> = corpus_labels
            .iter()
            .map(|l| u8::from(l == label))
            .collect();

        if !opts.include_self {
            top_inds.retain(|&ix| ix != i);
            preds.remove(i);
            truth.remove(i);
        }

        // Over-long lists are cut back to top_n; short lists (thresholding
        // removed more than the overshoot covered) are accepted as-is.
        top_inds.truncate(opts.top_n);

        let relevance: Vec<u8> = top_inds
            .iter()
            .map(|&ix| u8::from(corpus_labels[ix] == *label))
            .collect();

        f1_scores.push(f1_score(&truth, &preds));
        relevance_lists.push(relevance);
        thresholded.push(preds);
        pb.inc(1);
    }
    pb.finish_and_clear();
    log::debug!(
        "evaluated {} queries in {:?}",
        queries.len(),
        start.elapsed()
    );

    let map = mean_average_precision(&relevance_lists);
    let mrr = mean_reciprocal_rank(&relevance_lists);
    let mean_f1 = if f1_scores.is_empty() {
        0.0
    } else {
        f1_scores.iter().sum::<f64>() / f1_scores.len() as f64
    };

    Ok(EvalOutcome {
        map,
        mrr,
        mean_f1,
        thresholded,
    })
}

/// Document indices sorted by score descending, ties broken by lower index.
fn rank_descending(scores: &[f64]) -> Vec<usize> {
    let mut inds: Vec<usize> = (0..scores.len()).collect();
    inds.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.cmp(&b))
    });
    inds
}

/// Write the per-query thresholded prediction vectors as JSON; the file name
/// records whether self-matches were included.
pub fn save_predictions(
    outcome: &EvalOutcome,
    dir: &Path,
    include_self: bool,
) -> Result<PathBuf> {
    let name = format!(
        "bm25_pred{}.json",
        if include_self { "_include_self" } else { "" }
    );
    let path = dir.join(name);
    let file = std::fs::File::create(&path)?;
    serde_json::to_writer(std::io::BufWriter::new(file), &outcome.thresholded)?;
    Ok(path)
}

/// Write the metrics summary (`F1,<v>` / `mAP@<top_n>,<v>` / `MRR,<v>`) to
/// `bm25-<threshold>.txt`.
pub fn save_metrics_summary(
    outcome: &EvalOutcome,
    dir: &Path,
    threshold: f64,
    top_n: usize,
) -> Result<PathBuf> {
    let path = dir.join(format!("bm25-{}.txt", format_threshold(threshold)));
    let summary = format!(
        "F1,{:.4}\nmAP@{},{:.4}\nMRR,{:.4}\n",
        outcome.mean_f1, top_n, outcome.map, outcome.mrr
    );
    std::fs::write(&path, summary)?;
    Ok(path)
}

/// Integral thresholds render without a trailing `.0` so the default
/// produces `bm25-20.txt`.
fn format_threshold(threshold: f64) -> String {
    if threshold.fract() == 0.0 {
        format!("{}", threshold as i64)
    } else {
        format!("{}", threshold)
    }
}
