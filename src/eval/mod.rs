//! Retrieval evaluation: per-query ranking protocol and aggregate metrics.

pub mod metrics;
pub mod run;

pub use metrics::{average_precision, f1_score, mean_average_precision, mean_reciprocal_rank};
pub use run::{evaluate, save_metrics_summary, save_predictions, EvalOptions, EvalOutcome};
