//! Group-aware shuffle splitting into k folds.
//!
//! Cross-validation-style alternative to the tiered splitter: whole groups
//! are shuffled into a train side and a held-out side per fold, and the
//! held-out rows are split 50/50 into dev and test. No group ever spans the
//! train/held-out boundary.

use crate::catalog::Catalog;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashSet;

/// Seed for fold generation. Must stay a literal constant so published
/// folds remain reproducible.
pub const SHUFFLE_SPLIT_SEED: u64 = 42;

/// One fold of the shuffle split.
#[derive(Debug, Clone)]
pub struct ShuffleFold {
    pub train: Catalog,
    pub dev: Catalog,
    pub test: Catalog,
}

/// Produce `n_splits` independent group-level shuffle splits.
///
/// A single RNG seeded with [`SHUFFLE_SPLIT_SEED`] is constructed once per
/// invocation and drives every fold, so the whole sequence of folds is a
/// deterministic function of the catalog. `train_fraction` applies to the
/// number of groups, not rows; dev and test each take half of the held-out
/// rows (dev gets the remainder row when the count is odd).
pub fn split_group_shuffle(
    catalog: &Catalog,
    n_splits: usize,
    train_fraction: f64,
) -> Vec<ShuffleFold> {
    let index = catalog.group_index();
    let groups: Vec<&str> = index.iter().map(|(g, _)| g).collect();
    let mut rng = StdRng::seed_from_u64(SHUFFLE_SPLIT_SEED);
    let mut folds = Vec::with_capacity(n_splits);

    for _ in 0..n_splits {
        let mut shuffled = groups.clone();
        shuffled.shuffle(&mut rng);
        let n_train_groups = (shuffled.len() as f64 * train_fraction) as usize;
        let train_groups: HashSet<&str> = shuffled[..n_train_groups].iter().copied().collect();

        let mut train_rows = Vec::new();
        let mut held_rows = Vec::new();
        for (row, record) in catalog.records().iter().enumerate() {
            if train_groups.contains(record.label_group.as_str()) {
                train_rows.push(row);
            } else {
                held_rows.push(row);
            }
        }

        // Held-out fold splits 50/50 into dev and test; both sides are
        // restored to catalog row order after the draw.
        held_rows.shuffle(&mut rng);
        let n_dev = held_rows.len() - held_rows.len() / 2;
        let mut dev_rows = held_rows[..n_dev].to_vec();
        let mut test_rows = held_rows[n_dev..].to_vec();
        dev_rows.sort_unstable();
        test_rows.sort_unstable();

        folds.push(ShuffleFold {
            train: catalog.select(&train_rows),
            dev: catalog.select(&dev_rows),
            test: catalog.select(&test_rows),
        });
    }

    folds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Record;
    use std::collections::HashSet;

    fn catalog_with_groups(sizes: &[usize]) -> Catalog {
        let mut records = Vec::new();
        for (g, &size) in sizes.iter().enumerate() {
            for i in 0..size {
                records.push(Record {
                    posting_id: format!("p{}_{}", g, i),
                    title: format!("item {} {}", g, i),
                    std_title: format!("item {} {}", g, i),
                    label_group: format!("g{}", g),
                });
            }
        }
        Catalog::new(records).unwrap()
    }

    #[test]
    fn test_fold_count_and_completeness() {
        let catalog = catalog_with_groups(&[4, 3, 5, 2, 6, 1, 7, 2, 3, 4]);
        let folds = split_group_shuffle(&catalog, 5, 0.6);
        assert_eq!(folds.len(), 5);

        for fold in &folds {
            assert_eq!(
                fold.train.len() + fold.dev.len() + fold.test.len(),
                catalog.len()
            );
            let mut seen: HashSet<&str> = HashSet::new();
            for part in [&fold.train, &fold.dev, &fold.test] {
                for record in part.records() {
                    assert!(seen.insert(record.posting_id.as_str()));
                }
            }
        }
    }

    #[test]
    fn test_no_group_spans_train_and_held_out() {
        let catalog = catalog_with_groups(&[4, 3, 5, 2, 6, 1, 7, 2, 3, 4]);
        for fold in split_group_shuffle(&catalog, 5, 0.6) {
            let train_groups: HashSet<&str> = fold
                .train
                .records()
                .iter()
                .map(|r| r.label_group.as_str())
                .collect();
            for part in [&fold.dev, &fold.test] {
                for record in part.records() {
                    assert!(
                        !train_groups.contains(record.label_group.as_str()),
                        "group {} leaked across the train boundary",
                        record.label_group
                    );
                }
            }
        }
    }

    #[test]
    fn test_train_group_count_follows_fraction() {
        let catalog = catalog_with_groups(&[2; 10]);
        let folds = split_group_shuffle(&catalog, 1, 0.6);
        let train_groups: HashSet<&str> = folds[0]
            .train
            .records()
            .iter()
            .map(|r| r.label_group.as_str())
            .collect();
        assert_eq!(train_groups.len(), 6);
    }

    #[test]
    fn test_deterministic_across_runs() {
        let catalog = catalog_with_groups(&[4, 3, 5, 2, 6]);
        let first = split_group_shuffle(&catalog, 3, 0.6);
        let second = split_group_shuffle(&catalog, 3, 0.6);
        for (a, b) in first.iter().zip(&second) {
            for (pa, pb) in [(&a.train, &b.train), (&a.dev, &b.dev), (&a.test, &b.test)] {
                let ids_a: Vec<&str> = pa.records().iter().map(|r| r.posting_id.as_str()).collect();
                let ids_b: Vec<&str> = pb.records().iter().map(|r| r.posting_id.as_str()).collect();
                assert_eq!(ids_a, ids_b);
            }
        }
    }

    #[test]
    fn test_folds_differ_from_each_other() {
        // One shared RNG across folds: the draws should not repeat.
        let catalog = catalog_with_groups(&[2; 20]);
        let folds = split_group_shuffle(&catalog, 2, 0.5);
        let groups_of = |c: &Catalog| -> HashSet<String> {
            c.records().iter().map(|r| r.label_group.clone()).collect()
        };
        assert_ne!(groups_of(&folds[0].train), groups_of(&folds[1].train));
    }
}
