//! Offline index build followed by semantic search through files on disk.

use std::sync::Arc;

use crate::common::{HashingGenerator, TestData};
use nearby::vector::record_text;
use nearby::{Category, EmbeddingGenerator, EmbeddingIndex, IndexBuilder, SemanticSearchEngine};

fn build(data: &TestData, category: Category) -> Arc<HashingGenerator> {
    let generator = Arc::new(HashingGenerator::new());
    let layout = data.layout();
    IndexBuilder::new(generator.clone())
        .build(
            category,
            &layout.corpus_path(category),
            &layout.index_path(category),
        )
        .expect("index build should succeed");
    generator
}

#[test]
fn vectors_line_up_with_records() {
    let data = TestData::new();
    let generator = build(&data, Category::Event);

    let index = EmbeddingIndex::load(&data.layout().index_path(Category::Event), Category::Event)
        .unwrap();
    assert_eq!(index.len(), 3);
    assert_eq!(index.model_name(), "HashingTest");
    assert_eq!(index.dimension().get(), 384);

    for (vector, record) in index.vectors().iter().zip(index.records()) {
        let expected = generator
            .embed_one(&record_text(Category::Event, record))
            .unwrap();
        assert_eq!(vector, &expected, "vector for {} is misaligned", record.name);
    }
}

#[test]
fn record_text_query_finds_its_own_record_first() {
    let data = TestData::new();
    let generator = build(&data, Category::Restaurant);
    let engine = SemanticSearchEngine::new(generator);
    let layout = data.layout();

    let hits = engine
        .search_scored(
            "Toit 100 Feet Road, Indiranagar Brewery",
            Category::Restaurant,
            3,
            &layout.index_path(Category::Restaurant),
        )
        .unwrap();

    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0].record.name, "Toit");
    assert_eq!(hits[0].position, 2);
    let score = hits[0].score.expect("self match has a score").get();
    assert!((score - 1.0).abs() < 1e-5, "self similarity was {score}");

    let scores: Vec<f32> = hits.iter().filter_map(|h| h.score.map(|s| s.get())).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn top_k_beyond_corpus_returns_every_record() {
    let data = TestData::new();
    let engine = SemanticSearchEngine::new(build(&data, Category::Dentist));

    let results = engine
        .search(
            "dental clinic",
            Category::Dentist,
            50,
            &data.layout().index_path(Category::Dentist),
        )
        .unwrap();
    assert_eq!(results.len(), 4);
}

#[test]
fn empty_corpus_builds_an_empty_index() {
    let data = TestData::new();
    data.add_file("dentists.json", "[]");
    let engine = SemanticSearchEngine::new(build(&data, Category::Dentist));

    let results = engine
        .search(
            "dentist near MG Road",
            Category::Dentist,
            3,
            &data.layout().index_path(Category::Dentist),
        )
        .unwrap();
    assert!(results.is_empty());
}

#[test]
fn build_all_writes_every_category() {
    let data = TestData::new();
    let layout = data.layout();

    let outcomes = IndexBuilder::new(Arc::new(HashingGenerator::new())).build_all(&layout);
    assert_eq!(outcomes.len(), Category::ALL.len());

    for (category, outcome) in outcomes {
        let summary = outcome.unwrap();
        assert_eq!(summary.category, category);
        assert!(layout.index_path(category).exists());
    }
}
