//! Error types for evidence graph construction

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvidenceError {
    #[error("Failed to load crate from {path}: {reason}")]
    LoadError { path: String, reason: String },

    #[error("Invalid crate structure: {0}")]
    InvalidStructure(String),

    #[error("Entity at @graph[{index}] has neither '@id' nor 'guid'")]
    MissingIdentifier { index: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid path: {0}")]
    InvalidPath(PathBuf),
}
