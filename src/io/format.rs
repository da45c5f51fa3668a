//! Format definitions for CLI output.
//!
//! Provides structured format types for consistent JSON responses
//! that scripts can consume.

use crate::assistant::AssistantError;
use crate::indexing::{IndexReport, IndexingError};
use crate::io::exit_code::ExitCode;
use crate::semantic::SemanticSearchError;
use crate::types::Category;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text (default)
    Text,
    /// JSON for scripting
    Json,
}

impl OutputFormat {
    /// Create format from JSON flag.
    #[must_use]
    pub fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Text }
    }

    /// Check if format is JSON.
    #[must_use]
    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Standard JSON response format.
///
/// Provides consistent structure for both success and error responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonResponse<T = serde_json::Value>
where
    T: Serialize,
{
    /// Status: "success" or "error"
    pub status: String,

    /// Result code (e.g., "OK", "NOT_FOUND", "INDEX_NOT_FOUND")
    pub code: String,

    /// Human-readable message
    pub message: String,

    /// Actual data payload (only for success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Error details and suggestions (only for errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,

    /// Exit code for shell scripts
    pub exit_code: u8,

    /// Metadata (execution time, version, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

/// Error details for JSON responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Recovery suggestions
    pub suggestions: Vec<String>,
    /// Additional error context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

/// Response metadata.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResponseMeta {
    /// Version of the tool
    pub version: String,
    /// Timestamp of the response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Execution time in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
}

impl ResponseMeta {
    /// Metadata stamped with the crate version and current time.
    pub fn new(elapsed: Duration) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Some(format_utc_timestamp()),
            execution_time_ms: Some(elapsed.as_millis() as u64),
        }
    }
}

impl<T> JsonResponse<T>
where
    T: Serialize,
{
    /// Create a success response with data.
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            code: "OK".to_string(),
            message: "Operation completed successfully".to_string(),
            data: Some(data),
            error: None,
            exit_code: ExitCode::Success as u8,
            meta: None,
        }
    }

    /// Success-shaped response whose payload is empty: the query ran but
    /// matched nothing.
    pub fn no_results(data: T, message: &str) -> Self {
        Self {
            status: "success".to_string(),
            code: "NOT_FOUND".to_string(),
            message: message.to_string(),
            data: Some(data),
            error: None,
            exit_code: ExitCode::NotFound as u8,
            meta: None,
        }
    }

    /// Add metadata to the response.
    pub fn with_meta(mut self, meta: ResponseMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    fn failure(code: String, message: String, suggestions: Vec<&str>, exit: ExitCode) -> Self {
        Self {
            status: "error".to_string(),
            code,
            message,
            data: None,
            error: Some(ErrorDetails {
                suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
                context: None,
            }),
            exit_code: exit as u8,
            meta: None,
        }
    }
}

impl<T> JsonResponse<Vec<T>>
where
    T: Serialize,
{
    /// Response for a semantic search that asked for `top_k` results.
    pub fn from_search_results(data: Vec<T>, category: Category, top_k: usize) -> Self {
        if data.is_empty() {
            let message = no_search_results_message(category, top_k);
            Self::no_results(data, &message)
        } else {
            Self::success(data)
        }
    }
}

/// Why a semantic search came back empty, phrased from the request.
pub fn no_search_results_message(category: Category, top_k: usize) -> String {
    if top_k == 0 {
        format!("No {} requested (limit is 0)", category.plural())
    } else {
        format!("No {} matched the query", category.plural())
    }
}

impl JsonResponse<IndexReport> {
    /// One envelope for a batch of index builds.
    ///
    /// Any failed category makes the whole response an error, with the
    /// first failure deciding the code and exit status. Built summaries and
    /// per-category failures both stay in `data`.
    pub fn from_index_report(report: IndexReport, errors: &[IndexingError]) -> Self {
        let Some(first) = errors.first() else {
            return Self::success(report);
        };

        let attempted = report.built.len() + report.failed.len();
        let mut response = Self::failure(
            first.status_code(),
            format!("{} of {attempted} index builds failed", report.failed.len()),
            first.recovery_suggestions(),
            ExitCode::from_indexing_error(first),
        );
        response.data = Some(report);
        response
    }
}

impl JsonResponse<serde_json::Value> {
    /// Error response for a failed semantic search.
    pub fn from_search_error(error: &SemanticSearchError) -> Self {
        Self::failure(
            error.status_code(),
            error.to_string(),
            error.recovery_suggestions(),
            ExitCode::from_search_error(error),
        )
    }

    /// Error response for a failed assistant turn.
    pub fn from_assistant_error(error: &AssistantError) -> Self {
        Self::failure(
            error.status_code(),
            error.to_string(),
            error.recovery_suggestions(),
            ExitCode::from_assistant_error(error),
        )
    }
}

/// Format current time as UTC timestamp string.
///
/// Returns a string in the format "YYYY-MM-DD HH:MM:SS UTC".
pub fn format_utc_timestamp() -> String {
    let now = Utc::now();
    now.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
