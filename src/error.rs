//! Error types for the retrieval core
//!
//! This module provides structured error types using thiserror for better
//! error handling and actionable error messages.

use crate::types::Category;
use crate::vector::VectorError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors reading a corpus file.
///
/// Filter-rank absorbs these into an empty result; only the offline
/// indexer, which must not build an index from nothing, surfaces them.
#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("Failed to read corpus '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Corpus '{path}' is not a JSON array of records: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Errors loading, validating or writing an embedding index file.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("No embedding index for category '{category}' at '{path}'")]
    NotFound { category: Category, path: PathBuf },

    #[error("Failed to read embedding index '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write embedding index '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Embedding index '{path}' is malformed: {reason}")]
    InvalidFormat { path: PathBuf, reason: String },

    #[error("Embedding index holds {vectors} vectors but {records} records")]
    LengthMismatch { vectors: usize, records: usize },

    #[error("Embedding index '{path}' was built for '{actual}', expected '{expected}'")]
    CategoryMismatch {
        path: PathBuf,
        expected: Category,
        actual: Category,
    },

    #[error("Index format version {actual} is not supported (expected {expected})")]
    VersionMismatch { expected: u32, actual: u32 },

    #[error(
        "Embedding index was built with model '{index_model}' but queries use '{query_model}'"
    )]
    ModelMismatch {
        index_model: String,
        query_model: String,
    },

    #[error(transparent)]
    Vector(#[from] VectorError),
}

impl IndexError {
    /// Get a stable status code for this error type.
    ///
    /// Returns a string identifier that can be used in JSON responses
    /// for programmatic error handling.
    pub fn status_code(&self) -> String {
        match self {
            Self::NotFound { .. } => "INDEX_NOT_FOUND",
            Self::Read { .. } => "INDEX_READ_ERROR",
            Self::Write { .. } => "INDEX_WRITE_ERROR",
            Self::InvalidFormat { .. } => "INDEX_INVALID_FORMAT",
            Self::LengthMismatch { .. } => "INDEX_LENGTH_MISMATCH",
            Self::CategoryMismatch { .. } => "INDEX_CATEGORY_MISMATCH",
            Self::VersionMismatch { .. } => "INDEX_VERSION_MISMATCH",
            Self::ModelMismatch { .. } => "MODEL_MISMATCH",
            Self::Vector(VectorError::DimensionMismatch { .. }) => "DIMENSION_MISMATCH",
            Self::Vector(_) => "VECTOR_ERROR",
        }
        .to_string()
    }

    /// The index file is absent: a deployment gap, not corrupted data.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// The index file exists but cannot be trusted.
    pub fn is_corrupted(&self) -> bool {
        matches!(
            self,
            Self::InvalidFormat { .. }
                | Self::LengthMismatch { .. }
                | Self::CategoryMismatch { .. }
                | Self::VersionMismatch { .. }
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::NotFound { .. } => vec![
                "Run 'nearby index --all' to build the embedding indexes",
                "Check 'data_dir' and the [index] section of .nearby/settings.toml",
            ],
            Self::Read { .. } | Self::Write { .. } => vec![
                "Check that the file exists and you have read/write permissions",
                "Check disk space in the data directory",
            ],
            Self::InvalidFormat { .. }
            | Self::LengthMismatch { .. }
            | Self::CategoryMismatch { .. }
            | Self::VersionMismatch { .. } => vec![
                "Rebuild the index with 'nearby index <category>'",
                "Check for disk errors or an interrupted copy of the data directory",
            ],
            Self::ModelMismatch { .. } | Self::Vector(VectorError::DimensionMismatch { .. }) => {
                vec![
                    "Set semantic_search.model to the model the index was built with",
                    "Or rebuild the index with the configured model",
                ]
            }
            Self::Vector(_) => vec![],
        }
    }
}

/// Result type alias for corpus operations
pub type CorpusResult<T> = Result<T, CorpusError>;

/// Result type alias for index file operations
pub type IndexResult<T> = Result<T, IndexError>;
