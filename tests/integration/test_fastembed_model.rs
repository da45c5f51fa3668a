//! End-to-end checks against the real embedding model.

use std::sync::Arc;

use crate::common::TestData;
use nearby::vector::DEFAULT_MODEL_NAME;
use nearby::{Category, EmbeddingGenerator, FastEmbedGenerator, IndexBuilder, SemanticSearchEngine};

#[test]
#[ignore = "Downloads 86MB model - run with --ignored for semantic tests"]
fn fastembed_dimension_and_self_similarity() {
    let data = TestData::new();
    let cache_dir = data.path().join("models");
    let generator = Arc::new(
        FastEmbedGenerator::new(DEFAULT_MODEL_NAME, cache_dir, false)
            .expect("Failed to load embedding model"),
    );
    assert_eq!(generator.dimension().get(), 384);

    let layout = data.layout();
    IndexBuilder::new(generator.clone())
        .build(
            Category::Dentist,
            &layout.corpus_path(Category::Dentist),
            &layout.index_path(Category::Dentist),
        )
        .unwrap();

    let engine = SemanticSearchEngine::new(generator);
    let hits = engine
        .search_scored(
            "Tooth Fairy Clinic Jayanagar 4th Block",
            Category::Dentist,
            1,
            &layout.index_path(Category::Dentist),
        )
        .unwrap();

    assert_eq!(hits[0].record.name, "Tooth Fairy Clinic");
    let score = hits[0].score.map(|s| s.get()).unwrap_or_default();
    assert!(score > 0.99, "self similarity was {score}");
}
