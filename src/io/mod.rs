//! Output handling for the CLI.
//!
//! This module provides:
//! - Unified output formatting (text, JSON)
//! - Consistent error reporting and exit codes

pub mod exit_code;
pub mod format;

pub use exit_code::ExitCode;
pub use format::{
    ErrorDetails, JsonResponse, OutputFormat, ResponseMeta, no_search_results_message,
};
