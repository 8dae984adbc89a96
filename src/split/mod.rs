//! Catalog splitting.
//!
//! Two independent strategies behind one module: `grouped` tiers each label
//! group by size into train/val/test, `shuffle` does group-aware shuffle
//! splitting into k folds. Their bucketing logic is genuinely different, so
//! they are separate entry points rather than one parameterized algorithm.

pub mod grouped;
pub mod shuffle;

pub use grouped::{split_by_group_tier, GroupTierSplit, GROUP_TIER_SEED};
pub use shuffle::{split_group_shuffle, ShuffleFold, SHUFFLE_SPLIT_SEED};
