use std::path::PathBuf;
use thiserror::Error;

/// Main error type for shopmatch
#[derive(Error, Debug)]
pub enum ShopmatchError {
    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read/write errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Trained index missing at evaluation time
    #[error("trained index not found: {path}. Run `eval --do-train` first.", path = .0.display())]
    MissingIndex(PathBuf),

    /// Scoring/search errors
    #[error("Search error: {0}")]
    Search(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Convenient Result type using ShopmatchError
pub type Result<T> = std::result::Result<T, ShopmatchError>;
