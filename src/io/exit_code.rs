//! Exit codes for CLI operations following Unix conventions.
//!
//! # Exit Code Semantics
//!
//! - `0`: Success - operation completed and produced results
//! - `1`: General error - unspecified failure
//! - `3-125`: Specific recoverable errors
//! - `126-255`: Reserved by shell

use crate::assistant::AssistantError;
use crate::error::{CorpusError, IndexError};
use crate::indexing::IndexingError;
use crate::semantic::SemanticSearchError;
use crate::vector::VectorError;

/// Standard exit codes for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Operation succeeded (code 0)
    Success = 0,

    /// Unspecified error occurred (code 1)
    GeneralError = 1,

    /// Query ran but nothing matched (code 3)
    NotFound = 3,

    /// Corpus file is not valid JSON (code 4)
    ParseError = 4,

    /// File I/O error (code 5)
    IoError = 5,

    /// Configuration error, including a missing index (code 6)
    ConfigError = 6,

    /// Index corruption detected (code 7)
    IndexCorrupted = 7,

    /// Embedding model not supported (code 8)
    UnsupportedOperation = 8,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl ExitCode {
    /// `Success` when results were found, `NotFound` when empty.
    pub fn from_results<T>(results: &[T]) -> Self {
        if results.is_empty() {
            ExitCode::NotFound
        } else {
            ExitCode::Success
        }
    }

    /// Convert an `IndexError` to the appropriate exit code.
    ///
    /// A missing index is a deployment problem, not an empty result, so it
    /// maps to `ConfigError` rather than `NotFound`.
    pub fn from_index_error(error: &IndexError) -> Self {
        match error {
            IndexError::NotFound { .. } | IndexError::ModelMismatch { .. } => {
                ExitCode::ConfigError
            }
            IndexError::Read { .. } | IndexError::Write { .. } => ExitCode::IoError,
            IndexError::Vector(VectorError::DimensionMismatch { .. }) => ExitCode::ConfigError,
            IndexError::Vector(_) => ExitCode::GeneralError,
            _ if error.is_corrupted() => ExitCode::IndexCorrupted,
            _ => ExitCode::GeneralError,
        }
    }

    pub fn from_search_error(error: &SemanticSearchError) -> Self {
        match error {
            SemanticSearchError::Index(e) => Self::from_index_error(e),
            SemanticSearchError::Query(e) => Self::from_vector_error(e),
        }
    }

    pub fn from_assistant_error(error: &AssistantError) -> Self {
        match error {
            AssistantError::Search(e) => Self::from_search_error(e),
        }
    }

    pub fn from_indexing_error(error: &IndexingError) -> Self {
        match error {
            IndexingError::Corpus(CorpusError::Read { .. }) => ExitCode::IoError,
            IndexingError::Corpus(CorpusError::Parse { .. }) => ExitCode::ParseError,
            IndexingError::Embedding(e) => Self::from_vector_error(e),
            IndexingError::Index(e) => Self::from_index_error(e),
        }
    }

    fn from_vector_error(error: &VectorError) -> Self {
        match error {
            VectorError::UnsupportedModel(_) => ExitCode::UnsupportedOperation,
            VectorError::Storage(_) => ExitCode::IoError,
            _ => ExitCode::GeneralError,
        }
    }

    /// Check if this exit code indicates success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ExitCode::Success)
    }

    /// Get a human-readable description of the exit code.
    pub fn description(&self) -> &str {
        match self {
            ExitCode::Success => "Success",
            ExitCode::GeneralError => "General error",
            ExitCode::NotFound => "Not found",
            ExitCode::ParseError => "Parse error",
            ExitCode::IoError => "I/O error",
            ExitCode::ConfigError => "Configuration error",
            ExitCode::IndexCorrupted => "Index corrupted",
            ExitCode::UnsupportedOperation => "Unsupported operation",
        }
    }
}
