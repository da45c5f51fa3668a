//! Conversational turns routed through both retrieval modes.

use std::sync::Arc;

use crate::common::{HashingGenerator, TestData};
use nearby::assistant::{
    Assistant, Conversation, KeywordIntentExtractor, NO_RESULTS_ANSWER, Retriever,
    TemplateAnswerGenerator,
};
use nearby::config::AssistantConfig;
use nearby::io::ExitCode;
use nearby::{Category, DataLayout, IndexBuilder, RetrievalMode, SemanticSearchEngine};

fn assistant(layout: DataLayout, retriever: Retriever) -> Assistant {
    let locations = AssistantConfig::default().known_locations;
    Assistant::new(
        Box::new(KeywordIntentExtractor::new(locations)),
        Box::new(TemplateAnswerGenerator),
        retriever,
        layout,
    )
}

fn semantic_retriever(layout: &DataLayout, categories: &[Category]) -> Retriever {
    let generator = Arc::new(HashingGenerator::new());
    let builder = IndexBuilder::new(generator.clone());
    for &category in categories {
        builder
            .build(
                category,
                &layout.corpus_path(category),
                &layout.index_path(category),
            )
            .unwrap();
    }
    Retriever::Semantic {
        engine: SemanticSearchEngine::new(generator),
        top_k: 3,
    }
}

#[test]
fn filter_mode_answers_from_structured_filters() {
    let data = TestData::new();
    let assistant = assistant(data.layout(), Retriever::Filter { limit: 3 });
    assert_eq!(assistant.mode(), RetrievalMode::Filter);

    let mut conversation = Conversation::new("Hi! What are you looking for?");
    let turn = assistant
        .respond(&mut conversation, "Find a dentist near MG Road")
        .unwrap();

    assert_eq!(turn.category, Some(Category::Dentist));
    let names: Vec<&str> = turn.results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Bright Smiles", "Smile Dental"]);
    assert!(turn.answer.starts_with("Here's what I found:"));
    assert!(turn.warning.is_none());
    assert_eq!(conversation.len(), 3);
}

#[test]
fn unclassified_query_routes_differently_per_mode() {
    let data = TestData::new();
    let layout = data.layout();
    let query = "any good food delivery?";

    let filter = assistant(layout.clone(), Retriever::Filter { limit: 3 });
    let mut conversation = Conversation::default();
    let turn = filter.respond(&mut conversation, query).unwrap();
    assert_eq!(turn.intent.category, None);
    assert_eq!(turn.category, None);
    assert!(turn.results.is_empty());
    assert_eq!(turn.answer, NO_RESULTS_ANSWER);

    let retriever = semantic_retriever(&layout, &[Category::Restaurant]);
    let semantic = assistant(layout, retriever);
    assert_eq!(semantic.mode(), RetrievalMode::Semantic);
    let turn = semantic.respond(&mut conversation, query).unwrap();
    assert_eq!(turn.intent.category, None);
    assert_eq!(turn.category, Some(Category::Restaurant));
    assert_eq!(turn.results.len(), 3);
    assert_eq!(conversation.len(), 4);
}

#[test]
fn missing_index_produces_a_warning_turn() {
    let data = TestData::new();
    let layout = data.layout();
    let retriever = semantic_retriever(&layout, &[Category::Restaurant]);
    let assistant = assistant(layout, retriever);
    let mut conversation = Conversation::default();

    let turn = assistant
        .respond(&mut conversation, "Events this weekend in Indiranagar")
        .unwrap();

    assert_eq!(turn.category, Some(Category::Event));
    assert!(turn.results.is_empty());
    assert_eq!(
        turn.warning.as_deref(),
        Some("The search index for events is not available")
    );
    assert!(turn.answer.contains("can't search right now"));
    assert_eq!(conversation.len(), 2);
}

#[test]
fn corrupted_index_ends_the_turn_with_an_error() {
    let data = TestData::new();
    let layout = data.layout();
    let retriever = semantic_retriever(&layout, &[Category::Dentist]);
    std::fs::write(layout.index_path(Category::Dentist), b"NBIX").unwrap();

    let assistant = assistant(layout, retriever);
    let mut conversation = Conversation::new("Hi!");
    let err = assistant
        .respond(&mut conversation, "dentist near MG Road")
        .unwrap_err();

    assert_eq!(ExitCode::from_assistant_error(&err), ExitCode::IndexCorrupted);
    assert_eq!(conversation.len(), 1);
}

#[test]
fn turn_serializes_without_empty_warning() {
    let data = TestData::new();
    let assistant = assistant(data.layout(), Retriever::Filter { limit: 3 });
    let mut conversation = Conversation::default();

    let turn = assistant
        .respond(&mut conversation, "event on 2025-07-13")
        .unwrap();
    let json = serde_json::to_value(&turn).unwrap();

    assert_eq!(json["intent"]["date"], "2025-07-13");
    assert_eq!(json["results"][0]["name"], "Food Fest");
    assert!(json.get("warning").is_none());
}
