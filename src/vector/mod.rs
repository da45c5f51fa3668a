//! Vector primitives for semantic retrieval.
//!
//! This module owns everything that deals with raw embedding vectors:
//! typed scores and dimensions, the embedding generator seam, the shared
//! record canonicalisation, and cosine top-K ranking.

mod embedding;
mod similarity;
mod types;

// Re-export core types for public API
#[cfg(test)]
pub use embedding::MockEmbeddingGenerator;
pub use embedding::{
    DEFAULT_MODEL_NAME, EmbeddingGenerator, FastEmbedGenerator, parse_embedding_model,
    record_text,
};
pub use similarity::{cosine_similarity, rank_top_k};
pub use types::{Score, VECTOR_DIMENSION_384, VectorDimension, VectorError};
