//! Preprocess CLI: normalize raw titles into the std_title column and cache
//! the tokenized corpus.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use shopmatch::catalog::{normalize_title, tokenize, Catalog};
use shopmatch::Config;
use std::path::Path;

/// Build the tokenized corpus from raw titles, or load it from the cache
/// file left by an earlier run.
fn load_corpus(catalog: &Catalog, cache_path: &Path) -> Result<Vec<Vec<String>>> {
    if cache_path.exists() {
        println!("load corpus from cached file: {}", cache_path.display());
        let raw = std::fs::read_to_string(cache_path)
            .with_context(|| format!("Failed to read corpus cache: {}", cache_path.display()))?;
        let corpus = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid corpus cache: {}", cache_path.display()))?;
        return Ok(corpus);
    }

    println!("building corpus from raw data...");
    let pb = ProgressBar::new(catalog.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40}] {pos}/{len}")
            .unwrap(),
    );
    pb.set_message("Titles");

    let mut corpus = Vec::with_capacity(catalog.len());
    for record in catalog.records() {
        corpus.push(tokenize(&normalize_title(&record.title)));
        pb.inc(1);
    }
    pb.finish_and_clear();

    std::fs::write(cache_path, serde_json::to_string(&corpus)?)
        .with_context(|| format!("Failed to write corpus cache: {}", cache_path.display()))?;
    println!("building corpus over.");
    Ok(corpus)
}

fn main() -> Result<()> {
    env_logger::init();

    let config = Config::load()?;
    let catalog_path = config.data_dir().join("train.csv");
    let mut catalog = Catalog::load(&catalog_path)
        .with_context(|| format!("Failed to load catalog: {}", catalog_path.display()))?;

    std::fs::create_dir_all(config.result_dir()).with_context(|| {
        format!(
            "Failed to create result dir: {}",
            config.result_dir().display()
        )
    })?;

    let cache_path = config.result_dir().join("tok_corpus.json");
    let corpus = load_corpus(&catalog, &cache_path)?;

    if corpus.len() != catalog.len() {
        anyhow::bail!(
            "corpus cache holds {} documents but the catalog has {} records; delete {} and rerun",
            corpus.len(),
            catalog.len(),
            cache_path.display()
        );
    }

    for (record, tokens) in catalog.records_mut().iter_mut().zip(&corpus) {
        record.std_title = tokens.join(" ");
    }
    catalog
        .save(&catalog_path)
        .with_context(|| format!("Failed to write catalog: {}", catalog_path.display()))?;
    println!("Write std file over.");

    Ok(())
}
