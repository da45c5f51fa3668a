//! One conversational turn: intent, routing, retrieval, answer.

use serde::Serialize;

use crate::assistant::{
    AnswerGenerator, Conversation, IntentExtractor, TemplateAnswerGenerator,
};
use crate::config::{DataLayout, RetrievalMode};
use crate::filter::filter_and_rank_with_limit;
use crate::semantic::{SemanticSearchEngine, SemanticSearchError};
use crate::types::{Category, Intent, Record};

/// Errors that end a turn without an answer
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error(transparent)]
    Search(#[from] SemanticSearchError),
}

impl AssistantError {
    pub fn status_code(&self) -> String {
        match self {
            Self::Search(e) => e.status_code(),
        }
    }

    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::Search(e) => e.recovery_suggestions(),
        }
    }
}

/// Retrieval strategy for every turn.
pub enum Retriever {
    /// Embedding search; unclassified intents use the restaurant index.
    Semantic {
        engine: SemanticSearchEngine,
        top_k: usize,
    },
    /// Exact filters; unclassified intents find nothing.
    Filter { limit: usize },
}

impl Retriever {
    pub fn mode(&self) -> RetrievalMode {
        match self {
            Self::Semantic { .. } => RetrievalMode::Semantic,
            Self::Filter { .. } => RetrievalMode::Filter,
        }
    }
}

/// What one call to [`Assistant::respond`] produced.
#[derive(Debug, Clone, Serialize)]
pub struct Turn {
    pub intent: Intent,

    /// Dataset actually consulted, after any routing default
    pub category: Option<Category>,

    pub results: Vec<Record>,

    pub answer: String,

    /// Set when retrieval could not run, e.g. a missing index
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Conversational front of the retrieval core.
pub struct Assistant {
    extractor: Box<dyn IntentExtractor>,
    answerer: Box<dyn AnswerGenerator>,
    retriever: Retriever,
    layout: DataLayout,
}

impl Assistant {
    pub fn new(
        extractor: Box<dyn IntentExtractor>,
        answerer: Box<dyn AnswerGenerator>,
        retriever: Retriever,
        layout: DataLayout,
    ) -> Self {
        Self {
            extractor,
            answerer,
            retriever,
            layout,
        }
    }

    pub fn mode(&self) -> RetrievalMode {
        self.retriever.mode()
    }

    /// Answer `query`, appending the exchange to `conversation`.
    ///
    /// Collaborator failures degrade (empty intent, template answer). A
    /// missing index is answered honestly and flagged in
    /// [`Turn::warning`]. A corrupted index is an error and leaves the
    /// conversation untouched.
    pub fn respond(
        &self,
        conversation: &mut Conversation,
        query: &str,
    ) -> Result<Turn, AssistantError> {
        let intent = self.extractor.extract(query).unwrap_or_else(|e| {
            tracing::warn!("Intent extraction failed: {e}");
            Intent::default()
        });
        tracing::debug!("Intent: {intent:?}");

        let (category, results, warning) = match &self.retriever {
            Retriever::Semantic { engine, top_k } => {
                let category = Category::or_default_for_semantic(intent.category);
                let index_path = self.layout.index_path(category);
                match engine.search(query, category, *top_k, &index_path) {
                    Ok(results) => (Some(category), results, None),
                    Err(e) if e.is_missing_index() => {
                        tracing::warn!("{e}");
                        let warning = format!(
                            "The search index for {} is not available",
                            category.plural()
                        );
                        (Some(category), Vec::new(), Some(warning))
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            Retriever::Filter { limit } => {
                let results = filter_and_rank_with_limit(&intent, &self.layout, *limit);
                (intent.category, results, None)
            }
        };

        let answer = match &warning {
            Some(warning) => format!("Sorry, I can't search right now. {warning}."),
            None => self.answerer.generate(query, &results).unwrap_or_else(|e| {
                tracing::warn!("Answer generation failed: {e}");
                TemplateAnswerGenerator.render(&results)
            }),
        };

        conversation.push_user(query);
        conversation.push_assistant(answer.clone());

        Ok(Turn {
            intent,
            category,
            results,
            answer,
            warning,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::{CapabilityError, KeywordIntentExtractor, NO_RESULTS_ANSWER};
    use crate::indexing::IndexBuilder;
    use crate::vector::MockEmbeddingGenerator;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct FailingExtractor;

    impl IntentExtractor for FailingExtractor {
        fn extract(&self, _query: &str) -> Result<Intent, CapabilityError> {
            Err(CapabilityError::Provider("timeout".to_string()))
        }
    }

    struct FailingAnswerer;

    impl AnswerGenerator for FailingAnswerer {
        fn generate(&self, _query: &str, _results: &[Record]) -> Result<String, CapabilityError> {
            Err(CapabilityError::Unavailable("no API key".to_string()))
        }
    }

    fn keywords() -> Box<dyn IntentExtractor> {
        Box::new(KeywordIntentExtractor::new(vec![
            "mg road".to_string(),
            "indiranagar".to_string(),
        ]))
    }

    fn fixture() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("restaurants.json"),
            r#"[
                {"name": "Truffles", "address": "St Marks Road", "cuisine": "Burgers", "rating": 4.5},
                {"name": "Toit", "address": "Indiranagar", "cuisine": "Brewery", "rating": 4.7}
            ]"#,
        )
        .unwrap();
        std::fs::write(
            temp_dir.path().join("dentists.json"),
            r#"[
                {"name": "Smile Dental", "address": "MG Road", "rating": 4.2},
                {"name": "Tooth Fairy", "address": "Jayanagar", "rating": 4.9}
            ]"#,
        )
        .unwrap();
        temp_dir
    }

    fn semantic(layout: &DataLayout) -> Retriever {
        let generator = Arc::new(MockEmbeddingGenerator::new());
        IndexBuilder::new(generator.clone())
            .build(
                Category::Restaurant,
                &layout.corpus_path(Category::Restaurant),
                &layout.index_path(Category::Restaurant),
            )
            .unwrap();
        Retriever::Semantic {
            engine: SemanticSearchEngine::new(generator),
            top_k: 3,
        }
    }

    #[test]
    fn test_filter_mode_turn() {
        let data = fixture();
        let layout = DataLayout::new(data.path());
        let assistant = Assistant::new(
            keywords(),
            Box::new(TemplateAnswerGenerator),
            Retriever::Filter { limit: 3 },
            layout,
        );
        let mut conversation = Conversation::new("Hi!");

        let turn = assistant
            .respond(&mut conversation, "dentist near MG Road")
            .unwrap();
        assert_eq!(turn.category, Some(Category::Dentist));
        assert_eq!(turn.results.len(), 1);
        assert_eq!(turn.results[0].name, "Smile Dental");
        assert!(turn.answer.contains("1. Smile Dental - MG Road (4.2⭐)"));
        assert_eq!(conversation.len(), 3);
    }

    #[test]
    fn test_unclassified_routing_differs_by_mode() {
        let data = fixture();
        let layout = DataLayout::new(data.path());
        let mut conversation = Conversation::default();

        let filter = Assistant::new(
            Box::new(FailingExtractor),
            Box::new(TemplateAnswerGenerator),
            Retriever::Filter { limit: 3 },
            layout.clone(),
        );
        let turn = filter.respond(&mut conversation, "anything good?").unwrap();
        assert_eq!(turn.category, None);
        assert!(turn.results.is_empty());
        assert_eq!(turn.answer, NO_RESULTS_ANSWER);

        let semantic = Assistant::new(
            Box::new(FailingExtractor),
            Box::new(TemplateAnswerGenerator),
            semantic(&layout),
            layout,
        );
        let turn = semantic.respond(&mut conversation, "anything good?").unwrap();
        assert_eq!(turn.category, Some(Category::Restaurant));
        assert_eq!(turn.results.len(), 2);
    }

    #[test]
    fn test_missing_index_is_reported_not_hidden() {
        let data = fixture();
        let layout = DataLayout::new(data.path());
        let assistant = Assistant::new(
            keywords(),
            Box::new(TemplateAnswerGenerator),
            semantic(&layout),
            layout,
        );
        let mut conversation = Conversation::default();

        // Only the restaurant index was built
        let turn = assistant
            .respond(&mut conversation, "dentist near MG Road")
            .unwrap();
        assert_eq!(turn.category, Some(Category::Dentist));
        assert!(turn.results.is_empty());
        assert_eq!(
            turn.warning.as_deref(),
            Some("The search index for dentists is not available")
        );
        assert_ne!(turn.answer, NO_RESULTS_ANSWER);
    }

    #[test]
    fn test_corrupted_index_is_an_error() {
        let data = fixture();
        let layout = DataLayout::new(data.path());
        let retriever = semantic(&layout);
        std::fs::write(layout.index_path(Category::Restaurant), b"garbage bytes here!!!!!!!!")
            .unwrap();

        let assistant = Assistant::new(
            keywords(),
            Box::new(TemplateAnswerGenerator),
            retriever,
            layout,
        );
        let mut conversation = Conversation::new("Hi!");

        let err = assistant
            .respond(&mut conversation, "restaurant in Indiranagar")
            .unwrap_err();
        assert_eq!(err.status_code(), "INDEX_INVALID_FORMAT");
        assert_eq!(conversation.len(), 1);
    }

    #[test]
    fn test_answer_falls_back_to_template() {
        let data = fixture();
        let layout = DataLayout::new(data.path());
        let assistant = Assistant::new(
            keywords(),
            Box::new(FailingAnswerer),
            Retriever::Filter { limit: 3 },
            layout,
        );
        let mut conversation = Conversation::default();

        let turn = assistant
            .respond(&mut conversation, "restaurant in Indiranagar")
            .unwrap();
        assert_eq!(turn.answer, "Here's what I found:\n\n1. Toit - Indiranagar (4.7⭐)\n");
    }
}
