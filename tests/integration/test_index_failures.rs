//! Missing, corrupted and mismatched indexes are reported, never hidden.

use std::sync::Arc;

use crate::common::{HashingGenerator, TestData};
use nearby::io::ExitCode;
use nearby::{
    Category, EmbeddingGenerator, IndexBuilder, IndexingError, SemanticSearchEngine,
    VectorDimension, VectorError,
};

fn build_restaurants(data: &TestData) {
    let layout = data.layout();
    IndexBuilder::new(Arc::new(HashingGenerator::new()))
        .build(
            Category::Restaurant,
            &layout.corpus_path(Category::Restaurant),
            &layout.index_path(Category::Restaurant),
        )
        .unwrap();
}

#[test]
fn missing_index_is_a_configuration_problem() {
    let data = TestData::new();
    let engine = SemanticSearchEngine::new(Arc::new(HashingGenerator::new()));

    let err = engine
        .search(
            "dentist",
            Category::Dentist,
            3,
            &data.layout().index_path(Category::Dentist),
        )
        .unwrap_err();

    assert!(err.is_missing_index());
    assert!(!err.is_corrupted());
    assert_eq!(err.status_code(), "INDEX_NOT_FOUND");
    assert_eq!(ExitCode::from_search_error(&err), ExitCode::ConfigError);
    assert!(!err.recovery_suggestions().is_empty());
}

#[test]
fn truncated_index_is_corrupted() {
    let data = TestData::new();
    build_restaurants(&data);
    let path = data.layout().index_path(Category::Restaurant);

    let bytes = std::fs::read(&path).unwrap();
    std::fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

    let engine = SemanticSearchEngine::new(Arc::new(HashingGenerator::new()));
    let err = engine
        .search("biryani", Category::Restaurant, 3, &path)
        .unwrap_err();
    assert!(err.is_corrupted());
    assert_eq!(ExitCode::from_search_error(&err), ExitCode::IndexCorrupted);
}

#[test]
fn garbage_file_is_corrupted() {
    let data = TestData::new();
    let path = data.layout().index_path(Category::Event);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, b"this is not an index file at all").unwrap();

    let engine = SemanticSearchEngine::new(Arc::new(HashingGenerator::new()));
    let err = engine
        .search("jazz", Category::Event, 3, &path)
        .unwrap_err();
    assert!(err.is_corrupted());
    assert!(!err.is_missing_index());
}

#[test]
fn index_for_another_category_is_rejected() {
    let data = TestData::new();
    build_restaurants(&data);
    let layout = data.layout();

    let engine = SemanticSearchEngine::new(Arc::new(HashingGenerator::new()));
    let err = engine
        .search(
            "dentist",
            Category::Dentist,
            3,
            &layout.index_path(Category::Restaurant),
        )
        .unwrap_err();
    assert!(err.is_corrupted());
}

/// Same vectors as [`HashingGenerator`] under a different model name.
struct RenamedGenerator(HashingGenerator);

impl EmbeddingGenerator for RenamedGenerator {
    fn generate_embeddings(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, VectorError> {
        self.0.generate_embeddings(texts)
    }

    fn dimension(&self) -> VectorDimension {
        self.0.dimension()
    }

    fn model_name(&self) -> &str {
        "SomeOtherModel"
    }
}

#[test]
fn query_model_must_match_index_model() {
    let data = TestData::new();
    build_restaurants(&data);

    let engine = SemanticSearchEngine::new(Arc::new(RenamedGenerator(HashingGenerator::new())));
    let err = engine
        .search(
            "biryani",
            Category::Restaurant,
            3,
            &data.layout().index_path(Category::Restaurant),
        )
        .unwrap_err();
    assert_eq!(err.status_code(), "MODEL_MISMATCH");
    assert_eq!(ExitCode::from_search_error(&err), ExitCode::ConfigError);
}

#[test]
fn unreadable_corpus_fails_the_build() {
    let data = TestData::new();
    data.add_file("events.json", "[{\"name\": ");
    let layout = data.layout();

    let err = IndexBuilder::new(Arc::new(HashingGenerator::new()))
        .build(
            Category::Event,
            &layout.corpus_path(Category::Event),
            &layout.index_path(Category::Event),
        )
        .unwrap_err();
    assert!(matches!(err, IndexingError::Corpus(_)));
    assert_eq!(err.status_code(), "CORPUS_PARSE_ERROR");
    assert!(!layout.index_path(Category::Event).exists());
}
