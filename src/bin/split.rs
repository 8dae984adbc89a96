//! Split CLI: partition the catalog with either split strategy.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use shopmatch::catalog::Catalog;
use shopmatch::split::{split_by_group_tier, split_group_shuffle};
use shopmatch::Config;

#[derive(Debug, Clone, ValueEnum)]
enum Strategy {
    /// Group-size-tiered train/val/test split.
    GroupTier,
    /// Group-aware shuffle split into k folds.
    Shuffle,
}

/// Partition the catalog into reproducible splits.
#[derive(Parser, Debug)]
#[command(name = "split")]
struct Args {
    /// Split strategy.
    #[arg(long, value_enum, default_value = "group-tier")]
    strategy: Strategy,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = Config::load()?;

    let catalog_path = config.data_dir().join("train.csv");
    let catalog = Catalog::load(&catalog_path)
        .with_context(|| format!("Failed to load catalog: {}", catalog_path.display()))?;
    log::info!(
        "loaded {} records in {} label groups",
        catalog.len(),
        catalog.group_index().len()
    );

    std::fs::create_dir_all(config.split_dir())
        .with_context(|| format!("Failed to create split dir: {}", config.split_dir().display()))?;

    match args.strategy {
        Strategy::GroupTier => {
            println!("Spliting...");
            let split = split_by_group_tier(&catalog, config.split.train_fraction);
            println!(
                "train {} val {} test {}",
                split.train.len(),
                split.val.len(),
                split.test.len()
            );
            split.train.save(&config.split_dir().join("train.csv"))?;
            split.val.save(&config.split_dir().join("val.csv"))?;
            split.test.save(&config.split_dir().join("test.csv"))?;
        }
        Strategy::Shuffle => {
            let folds =
                split_group_shuffle(&catalog, config.split.n_splits, config.split.train_fraction);
            for (k, fold) in folds.iter().enumerate() {
                let k = k + 1;
                println!(
                    "Split {}: train {} test {} dev {}",
                    k,
                    fold.train.len(),
                    fold.test.len(),
                    fold.dev.len()
                );
                fold.train
                    .save(&config.split_dir().join(format!("train_split_{}.csv", k)))?;
                fold.test
                    .save(&config.split_dir().join(format!("test_split_{}.csv", k)))?;
                fold.dev
                    .save(&config.split_dir().join(format!("dev_split_{}.csv", k)))?;
            }
            println!(
                "Split and save {}-fold train&test data over.",
                config.split.n_splits
            );
        }
    }

    Ok(())
}
