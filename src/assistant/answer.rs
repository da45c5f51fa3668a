//! Answer generators and the retrieval context handed to a model.

use std::fmt::Write;

use crate::assistant::{AnswerGenerator, CapabilityError, ChatModel};
use crate::types::Record;

/// Answer used when retrieval found nothing.
pub const NO_RESULTS_ANSWER: &str = "I couldn't find any relevant results for your query.";

/// Context block used when retrieval found nothing.
pub const NO_RESULTS_CONTEXT: &str = "No relevant results found.";

const ANSWER_SYSTEM_PROMPT: &str = "You are a helpful assistant that answers user queries about local businesses and events. \
Use the provided context to answer the user's question in a friendly, concise way. \
If the context is empty or says 'No relevant results found.', say you couldn't find anything.";

/// Deterministic answer listing the results, one numbered line each.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateAnswerGenerator;

impl TemplateAnswerGenerator {
    pub fn render(&self, results: &[Record]) -> String {
        if results.is_empty() {
            return NO_RESULTS_ANSWER.to_string();
        }

        let mut answer = String::from("Here's what I found:\n\n");
        for (i, record) in results.iter().enumerate() {
            let _ = write!(answer, "{}. {}", i + 1, record.name);
            if let Some(address) = &record.address {
                let _ = write!(answer, " - {address}");
            }
            if let Some(rating) = record.rating_label() {
                let _ = write!(answer, " ({rating}⭐)");
            }
            answer.push('\n');
        }
        answer
    }
}

impl AnswerGenerator for TemplateAnswerGenerator {
    fn generate(&self, _query: &str, results: &[Record]) -> Result<String, CapabilityError> {
        Ok(self.render(results))
    }
}

/// Numbered context lines for a model prompt, dates included.
pub fn build_context(results: &[Record]) -> String {
    if results.is_empty() {
        return NO_RESULTS_CONTEXT.to_string();
    }

    let mut context = String::new();
    for (i, record) in results.iter().enumerate() {
        let address = record.address.as_deref().unwrap_or_default();
        let _ = write!(context, "{}. {} - {address}", i + 1, record.name);
        if let Some(rating) = record.rating_label() {
            let _ = write!(context, " ({rating}⭐)");
        }
        if let Some(date) = &record.date {
            let _ = write!(context, " [Date: {date}]");
        }
        context.push('\n');
    }
    context
}

/// Generator that asks a [`ChatModel`] to phrase the answer.
pub struct ModelAnswerGenerator<M> {
    model: M,
}

impl<M: ChatModel> ModelAnswerGenerator<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }
}

impl<M: ChatModel> AnswerGenerator for ModelAnswerGenerator<M> {
    fn generate(&self, query: &str, results: &[Record]) -> Result<String, CapabilityError> {
        let user_prompt = format!(
            "User query: {query}\n\nContext:\n{}",
            build_context(results)
        );
        let answer = self.model.complete(ANSWER_SYSTEM_PROMPT, &user_prompt)?;
        if answer.trim().is_empty() {
            return Err(CapabilityError::MalformedResponse(
                "Model returned an empty answer".to_string(),
            ));
        }
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results() -> Vec<Record> {
        vec![
            Record::new("Smile Dental")
                .with_address("MG Road")
                .with_rating(4.5),
            Record::new("Jazz Night").with_date("2025-07-12"),
        ]
    }

    #[test]
    fn test_template_answer() {
        let answer = TemplateAnswerGenerator.render(&results());
        assert_eq!(
            answer,
            "Here's what I found:\n\n1. Smile Dental - MG Road (4.5⭐)\n2. Jazz Night\n"
        );
        assert_eq!(TemplateAnswerGenerator.render(&[]), NO_RESULTS_ANSWER);
    }

    #[test]
    fn test_whole_ratings_keep_one_decimal() {
        let answer = TemplateAnswerGenerator.render(&[Record::new("Toit").with_rating(4.0)]);
        assert!(answer.contains("1. Toit (4.0⭐)"));

        let context = build_context(&[Record::new("Toit").with_rating(5.0)]);
        assert!(context.contains("(5.0⭐)"));
    }

    #[test]
    fn test_build_context() {
        assert_eq!(
            build_context(&results()),
            "1. Smile Dental - MG Road (4.5⭐)\n2. Jazz Night -  [Date: 2025-07-12]\n"
        );
        assert_eq!(build_context(&[]), NO_RESULTS_CONTEXT);
    }

    struct EchoModel;

    impl ChatModel for EchoModel {
        fn complete(&self, _system: &str, user_prompt: &str) -> Result<String, CapabilityError> {
            Ok(user_prompt.to_string())
        }
    }

    #[test]
    fn test_model_answer_sees_context() {
        let answer = ModelAnswerGenerator::new(EchoModel)
            .generate("dentist near MG Road", &results())
            .unwrap();
        assert!(answer.starts_with("User query: dentist near MG Road\n\nContext:\n1. Smile Dental"));
    }
}
