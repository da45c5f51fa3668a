//! Injected collaborators of the assistant.
//!
//! Intent extraction and answer generation may be backed by a language
//! model or by local rules. Either way they are handed to the
//! [`Assistant`](crate::assistant::Assistant) as trait objects and report
//! failures as a classified [`CapabilityError`].

use thiserror::Error;

use crate::types::{Intent, Record};

/// Classified failure of an injected capability.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    /// The capability cannot be used at all (no credentials, offline).
    #[error("Capability unavailable: {0}")]
    Unavailable(String),

    /// The provider answered but the answer could not be used.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The provider failed while answering.
    #[error("Provider error: {0}")]
    Provider(String),
}

impl CapabilityError {
    pub fn status_code(&self) -> String {
        match self {
            Self::Unavailable(_) => "CAPABILITY_UNAVAILABLE",
            Self::MalformedResponse(_) => "MALFORMED_RESPONSE",
            Self::Provider(_) => "PROVIDER_ERROR",
        }
        .to_string()
    }
}

/// Turns a free-text query into an [`Intent`].
pub trait IntentExtractor: Send + Sync {
    fn extract(&self, query: &str) -> Result<Intent, CapabilityError>;
}

/// Phrases an answer to `query` grounded in `results`.
pub trait AnswerGenerator: Send + Sync {
    fn generate(&self, query: &str, results: &[Record]) -> Result<String, CapabilityError>;
}

/// A chat-completion style language model: system and user prompt in,
/// text out.
///
/// The crate ships no network client; implement this for a provider and
/// wrap it in [`ModelIntentExtractor`](crate::assistant::ModelIntentExtractor)
/// or [`ModelAnswerGenerator`](crate::assistant::ModelAnswerGenerator).
pub trait ChatModel: Send + Sync {
    fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, CapabilityError>;
}
