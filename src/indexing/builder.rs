//! Builds embedding index files from corpus files.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::config::DataLayout;
use crate::corpus::load_corpus;
use crate::display::progress::create_progress_bar;
use crate::error::{CorpusError, IndexError};
use crate::indexing::IndexSummary;
use crate::semantic::EmbeddingIndex;
use crate::types::Category;
use crate::vector::{EmbeddingGenerator, VectorError, record_text};

/// Texts sent to the model per call.
const EMBED_BATCH_SIZE: usize = 64;

/// Errors that stop an index build
#[derive(Debug, thiserror::Error)]
pub enum IndexingError {
    #[error(transparent)]
    Corpus(#[from] CorpusError),

    #[error("Failed to embed records: {0}")]
    Embedding(#[from] VectorError),

    #[error(transparent)]
    Index(#[from] IndexError),
}

impl IndexingError {
    pub fn status_code(&self) -> String {
        match self {
            Self::Corpus(CorpusError::Read { .. }) => "CORPUS_READ_ERROR".to_string(),
            Self::Corpus(CorpusError::Parse { .. }) => "CORPUS_PARSE_ERROR".to_string(),
            Self::Embedding(_) => "EMBEDDING_FAILED".to_string(),
            Self::Index(e) => e.status_code(),
        }
    }

    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::Corpus(_) => vec![
                "Check that the corpus file exists under data_dir",
                "Corpus files must be a JSON array of objects with a 'name' field",
            ],
            Self::Embedding(_) => vec![
                "Check that the embedding model downloaded completely",
                "Verify semantic_search.model names a supported model",
            ],
            Self::Index(e) => e.recovery_suggestions(),
        }
    }
}

/// Offline indexer: corpus file in, embedding index file out.
pub struct IndexBuilder {
    generator: Arc<dyn EmbeddingGenerator>,
    show_progress: bool,
}

impl IndexBuilder {
    pub fn new(generator: Arc<dyn EmbeddingGenerator>) -> Self {
        Self {
            generator,
            show_progress: false,
        }
    }

    /// Show a progress bar while embedding.
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Build the index for one category.
    ///
    /// The corpus is loaded strictly: an unreadable corpus is an error here,
    /// never an empty index.
    pub fn build(
        &self,
        category: Category,
        corpus_path: &Path,
        index_path: &Path,
    ) -> Result<IndexSummary, IndexingError> {
        let start = Instant::now();

        let records = load_corpus(corpus_path)?;
        let texts: Vec<String> = records
            .iter()
            .map(|record| record_text(category, record))
            .collect();

        let vectors = self.embed_all(category, &texts)?;
        let dimension = self.generator.dimension();
        let index = EmbeddingIndex::new(
            category,
            self.generator.model_name(),
            dimension,
            vectors,
            records,
        )?;
        index.save(index_path)?;

        let summary = IndexSummary {
            category,
            records: index.len(),
            dimension: dimension.get(),
            model_name: index.model_name().to_string(),
            path: index_path.to_path_buf(),
            elapsed: start.elapsed(),
        };
        tracing::info!(
            "Built {category} index: {} records in {:.2}s",
            summary.records,
            summary.elapsed.as_secs_f64()
        );
        Ok(summary)
    }

    /// Build every category's index, continuing past failures.
    pub fn build_all(
        &self,
        layout: &DataLayout,
    ) -> Vec<(Category, Result<IndexSummary, IndexingError>)> {
        Category::ALL
            .iter()
            .map(|&category| {
                let result = self.build(
                    category,
                    &layout.corpus_path(category),
                    &layout.index_path(category),
                );
                if let Err(e) = &result {
                    tracing::warn!("Index build for {category} failed: {e}");
                }
                (category, result)
            })
            .collect()
    }

    fn embed_all(
        &self,
        category: Category,
        texts: &[String],
    ) -> Result<Vec<Vec<f32>>, VectorError> {
        let progress = self.show_progress.then(|| {
            create_progress_bar(
                texts.len() as u64,
                &format!("Embedding {}", category.plural()),
            )
        });

        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(EMBED_BATCH_SIZE) {
            let refs: Vec<&str> = batch.iter().map(String::as_str).collect();
            let embeddings = self.generator.generate_embeddings(&refs)?;
            if embeddings.len() != refs.len() {
                return Err(VectorError::EmbeddingFailed(format!(
                    "Model returned {} embeddings for {} texts",
                    embeddings.len(),
                    refs.len()
                )));
            }
            vectors.extend(embeddings);

            if let Some(pb) = &progress {
                pb.inc(batch.len() as u64);
            }
        }

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }
        Ok(vectors)
    }
}
