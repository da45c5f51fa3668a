//! Local discovery assistant: structured filtering and semantic search
//! over small per-category datasets of restaurants, dentists and events.

pub mod assistant;
pub mod config;
pub mod corpus;
pub mod display;
pub mod error;
pub mod filter;
pub mod indexing;
pub mod io;
pub mod semantic;
pub mod types;
pub mod vector;

// Explicit exports for better API clarity
pub use config::{DataLayout, RetrievalMode, Settings};
pub use corpus::{load_corpus, load_corpus_or_empty};
pub use error::{CorpusError, CorpusResult, IndexError, IndexResult};
pub use filter::{DEFAULT_LIMIT, filter_and_rank, filter_and_rank_records, filter_and_rank_with_limit};
pub use indexing::{IndexBuilder, IndexReport, IndexSummary, IndexingError};
pub use semantic::{EmbeddingIndex, SemanticSearchEngine, SemanticSearchError};
pub use types::{Category, Intent, Record, ScoredRecord};
pub use vector::{EmbeddingGenerator, FastEmbedGenerator, Score, VectorDimension, VectorError};
