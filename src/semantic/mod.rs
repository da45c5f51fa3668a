//! Semantic search over precomputed embedding indexes
//!
//! An index file pairs one vector per record with the records themselves.
//! [`SemanticSearchEngine`] embeds a query with the same model that built
//! the index and returns the most similar records.

mod index;
mod search;

pub use index::{EmbeddingIndex, IndexManifest};
pub use search::{SemanticSearchEngine, SemanticSearchError};
