//! Evaluation CLI: fit the BM25 index over a split's corpus, then score
//! retrieval quality (mAP, MRR, mean F1) treating every title as a query.

use anyhow::{Context, Result};
use clap::Parser;
use shopmatch::catalog::Catalog;
use shopmatch::eval::{evaluate, save_metrics_summary, save_predictions, EvalOptions};
use shopmatch::search::{Bm25Scorer, Retriever};
use shopmatch::Config;

/// Train and evaluate lexical retrieval over the test split.
#[derive(Parser, Debug)]
#[command(name = "eval")]
struct Args {
    /// Fit the BM25 index from the test split's corpus and persist it.
    #[arg(long)]
    do_train: bool,

    /// Evaluate retrieval over the test split.
    #[arg(long)]
    do_eval: bool,

    /// Persist per-query predictions and the metrics summary.
    #[arg(long)]
    save_result: bool,

    /// Override the configured score threshold.
    #[arg(long)]
    threshold: Option<f64>,

    /// Override the configured ranked cutoff.
    #[arg(long)]
    top_n: Option<usize>,

    /// Allow a query's own document in its results.
    #[arg(long)]
    include_self: bool,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = Config::load()?;

    let test_path = config.split_dir().join("test.csv");
    let index_path = config.result_dir().join("bm25_index.json");

    if args.do_train {
        let test = Catalog::load(&test_path)
            .with_context(|| format!("Failed to load test split: {}", test_path.display()))?;
        let corpus = test.tokenized_corpus()?;
        let scorer = Bm25Scorer::fit(&corpus)?;

        std::fs::create_dir_all(config.result_dir()).with_context(|| {
            format!(
                "Failed to create result dir: {}",
                config.result_dir().display()
            )
        })?;
        scorer
            .save(&index_path)
            .with_context(|| format!("Failed to save index: {}", index_path.display()))?;
        println!("Train & save BM25 index over.");
    }

    if args.do_eval {
        let scorer = Bm25Scorer::load(&index_path)?;
        let test = Catalog::load(&test_path)
            .with_context(|| format!("Failed to load test split: {}", test_path.display()))?;

        let queries: Vec<String> = test.records().iter().map(|r| r.std_title.clone()).collect();
        // Corpus and evaluation set are the same split, so the query labels
        // double as the corpus label list.
        let labels: Vec<String> = test
            .records()
            .iter()
            .map(|r| r.label_group.clone())
            .collect();

        let opts = EvalOptions {
            top_n: args.top_n.unwrap_or(config.eval.top_n),
            threshold: args.threshold.unwrap_or(config.eval.threshold),
            include_self: args.include_self || config.eval.include_self,
        };

        let retriever = Retriever::new(scorer);
        println!("=========  Evaluation  =========");
        let outcome = evaluate(&queries, &labels, &retriever, &labels, &opts)?;
        println!(
            "F1: {:.4} mAP@{}: {:.4} MRR: {:.4}",
            outcome.mean_f1, opts.top_n, outcome.map, outcome.mrr
        );

        if args.save_result {
            let pred_path = save_predictions(&outcome, config.result_dir(), opts.include_self)?;
            log::info!("saved predictions to {}", pred_path.display());
            let summary_path =
                save_metrics_summary(&outcome, config.result_dir(), opts.threshold, opts.top_n)?;
            log::info!("saved metrics summary to {}", summary_path.display());
            println!("save bm25 prediction result over.");
        }
    }

    Ok(())
}
