//! Conversational layer over the retrieval core.
//!
//! Collaborators are injected through [`IntentExtractor`] and
//! [`AnswerGenerator`]; the session lives in a caller-owned
//! [`Conversation`].

mod answer;
mod capability;
mod conversation;
mod intent;
mod turn;

pub use answer::{
    ModelAnswerGenerator, NO_RESULTS_ANSWER, NO_RESULTS_CONTEXT, TemplateAnswerGenerator,
    build_context,
};
pub use capability::{AnswerGenerator, CapabilityError, ChatModel, IntentExtractor};
pub use conversation::{Conversation, Message, Role};
pub use intent::{
    FallbackIntentExtractor, KeywordIntentExtractor, ModelIntentExtractor, parse_intent_json,
};
pub use turn::{Assistant, AssistantError, Retriever, Turn};
