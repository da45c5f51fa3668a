//! Offline embedding index builds.
//!
//! The producer side of the embedding contract: every record is turned into
//! text by [`record_text`](crate::vector::record_text), embedded with the
//! query-time model, and persisted in corpus order.

mod builder;
pub mod progress;

pub use builder::{IndexBuilder, IndexingError};
pub use progress::{IndexFailure, IndexReport, IndexSummary};
