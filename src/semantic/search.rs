//! Semantic Search Engine: cosine top-K over an embedding index.

use std::path::Path;
use std::sync::Arc;

use crate::error::IndexError;
use crate::semantic::EmbeddingIndex;
use crate::types::{Category, Record, ScoredRecord};
use crate::vector::{EmbeddingGenerator, VectorError, rank_top_k};

/// Error type for semantic search operations
#[derive(Debug, thiserror::Error)]
pub enum SemanticSearchError {
    #[error(transparent)]
    Index(#[from] IndexError),

    #[error("Failed to embed query: {0}")]
    Query(VectorError),
}

impl SemanticSearchError {
    /// The category has no index at all. Callers answer "not available"
    /// instead of "nothing found".
    pub fn is_missing_index(&self) -> bool {
        matches!(self, Self::Index(e) if e.is_missing())
    }

    /// The index exists but cannot be trusted.
    pub fn is_corrupted(&self) -> bool {
        matches!(self, Self::Index(e) if e.is_corrupted())
    }

    pub fn status_code(&self) -> String {
        match self {
            Self::Index(e) => e.status_code(),
            Self::Query(_) => "QUERY_EMBEDDING_FAILED".to_string(),
        }
    }

    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::Index(e) => e.recovery_suggestions(),
            Self::Query(_) => vec![
                "Check that the embedding model downloaded completely",
                "Delete the model cache directory to force a fresh download",
            ],
        }
    }
}

/// Query-time half of the embedding contract.
///
/// The generator must be the same model that built the index; the model
/// name stored in the index is checked on every search.
pub struct SemanticSearchEngine {
    generator: Arc<dyn EmbeddingGenerator>,
}

impl std::fmt::Debug for SemanticSearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticSearchEngine")
            .field("model_name", &self.generator.model_name())
            .field("dimension", &self.generator.dimension())
            .finish()
    }
}

impl SemanticSearchEngine {
    pub fn new(generator: Arc<dyn EmbeddingGenerator>) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &Arc<dyn EmbeddingGenerator> {
        &self.generator
    }

    /// Top `top_k` records for `query` from the index at `index_path`,
    /// most similar first.
    pub fn search(
        &self,
        query: &str,
        category: Category,
        top_k: usize,
        index_path: &Path,
    ) -> Result<Vec<Record>, SemanticSearchError> {
        Ok(self
            .search_scored(query, category, top_k, index_path)?
            .into_iter()
            .map(|hit| hit.record)
            .collect())
    }

    /// Like [`search`](Self::search) but keeps positions and scores.
    pub fn search_scored(
        &self,
        query: &str,
        category: Category,
        top_k: usize,
        index_path: &Path,
    ) -> Result<Vec<ScoredRecord>, SemanticSearchError> {
        let index = EmbeddingIndex::load(index_path, category)?;
        self.search_index(query, &index, top_k)
    }

    /// Search an already loaded index.
    pub fn search_index(
        &self,
        query: &str,
        index: &EmbeddingIndex,
        top_k: usize,
    ) -> Result<Vec<ScoredRecord>, SemanticSearchError> {
        if index.model_name() != self.generator.model_name() {
            return Err(IndexError::ModelMismatch {
                index_model: index.model_name().to_string(),
                query_model: self.generator.model_name().to_string(),
            }
            .into());
        }

        if top_k == 0 || index.is_empty() {
            return Ok(Vec::new());
        }

        let query_vector = self
            .generator
            .embed_one(query)
            .map_err(SemanticSearchError::Query)?;
        index
            .dimension()
            .validate_vector(&query_vector)
            .map_err(IndexError::from)?;

        let ranked = rank_top_k(&query_vector, index.vectors(), top_k).map_err(IndexError::from)?;

        tracing::debug!(
            "Semantic search over {} {} records returned {}",
            index.len(),
            index.category(),
            ranked.len()
        );

        Ok(ranked
            .into_iter()
            .map(|(position, score)| ScoredRecord {
                position,
                score,
                record: index.records()[position].clone(),
            })
            .collect())
    }
}
