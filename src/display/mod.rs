//! Rich terminal display utilities for CLI output.
//!
//! Provides styled tables, progress bars, and formatted output.

pub mod progress;
pub mod tables;
pub mod theme;

pub use progress::{create_progress_bar, create_spinner, with_spinner};
pub use tables::{TableBuilder, create_index_table, create_results_table, create_scored_table};
pub use theme::{THEME, Theme};
