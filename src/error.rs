//! Error types for the measurement pipeline
//!
//! Only configuration problems and an empty required corpus are fatal.
//! Unreadable inputs are converted into [`crate::diagnostics::Diagnostic`]s by
//! the pipeline and never escape past the component boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the analysis library
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8 (first invalid byte at offset {offset})")]
    Encoding { path: PathBuf, offset: usize },

    #[error("Empty corpus: no {corpus} samples available for combined evaluation")]
    EmptyCorpus { corpus: &'static str },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid extraction pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
