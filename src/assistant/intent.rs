//! Intent extractors: keyword rules, model-backed, and a fallback chain.

use std::sync::LazyLock;

use chrono::{Datelike, Duration, Local, NaiveDate};
use regex::Regex;

use crate::assistant::{CapabilityError, ChatModel, IntentExtractor};
use crate::types::{Category, Intent};

/// Category keywords, checked in order. `food` and `delivery` are
/// recognised but have no dataset, so they leave the intent unclassified.
const CATEGORY_KEYWORDS: [&str; 5] = ["restaurant", "dentist", "event", "food", "delivery"];

/// Location used for "near me" style queries.
const DEFAULT_LOCATION: &str = "Bengaluru";

const INTENT_SYSTEM_PROMPT: &str = "You are an assistant that extracts structured information from user queries about local discovery. \
Given a user query, extract the following as JSON: \
category (restaurant, dentist, event, food, delivery), location (area or city), date (YYYY-MM-DD, if present, else null). \
If not found, set value to null. Only output JSON.";

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4}-\d{2}-\d{2})").expect("Invalid regex"));

static JSON_OBJECT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("Invalid regex"));

/// Rule-based extractor that needs no model.
#[derive(Debug, Clone)]
pub struct KeywordIntentExtractor {
    locations: Vec<String>,
    today: Option<NaiveDate>,
}

impl KeywordIntentExtractor {
    /// `locations` are matched case-insensitively, first match wins.
    pub fn new(locations: Vec<String>) -> Self {
        Self {
            locations: locations.into_iter().map(|l| l.to_lowercase()).collect(),
            today: None,
        }
    }

    /// Pin "today" for relative dates instead of reading the clock.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Pure keyword extraction.
    pub fn extract_intent(&self, query: &str) -> Intent {
        let lowered = query.to_lowercase();

        let category = CATEGORY_KEYWORDS
            .iter()
            .find(|keyword| lowered.contains(*keyword))
            .and_then(|keyword| Category::parse(keyword));

        let location = self
            .locations
            .iter()
            .find(|location| lowered.contains(location.as_str()))
            .map(|location| title_case(location))
            .or_else(|| {
                (lowered.contains("near me") || lowered.contains("around here"))
                    .then(|| DEFAULT_LOCATION.to_string())
            });

        let date = if lowered.contains("this weekend") {
            Some(next_saturday(self.today()).format("%Y-%m-%d").to_string())
        } else {
            DATE_PATTERN
                .captures(query)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        };

        Intent {
            category,
            location,
            date,
        }
    }
}

impl IntentExtractor for KeywordIntentExtractor {
    fn extract(&self, query: &str) -> Result<Intent, CapabilityError> {
        Ok(self.extract_intent(query))
    }
}

/// Saturday on or after `today`.
fn next_saturday(today: NaiveDate) -> NaiveDate {
    let weekday = i64::from(today.weekday().num_days_from_monday());
    today + Duration::days((5 - weekday).rem_euclid(7))
}

/// Capitalise the first letter of every word: `mg road` -> `Mg Road`.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Parse the first `{...}` block of a model response as an [`Intent`].
pub fn parse_intent_json(text: &str) -> Result<Intent, CapabilityError> {
    let block = JSON_OBJECT_PATTERN.find(text).ok_or_else(|| {
        CapabilityError::MalformedResponse("No JSON object in model response".to_string())
    })?;

    serde_json::from_str(block.as_str())
        .map_err(|e| CapabilityError::MalformedResponse(format!("Invalid intent JSON: {e}")))
}

/// Extractor that asks a [`ChatModel`] for intent JSON.
pub struct ModelIntentExtractor<M> {
    model: M,
}

impl<M: ChatModel> ModelIntentExtractor<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }
}

impl<M: ChatModel> IntentExtractor for ModelIntentExtractor<M> {
    fn extract(&self, query: &str) -> Result<Intent, CapabilityError> {
        let response = self
            .model
            .complete(INTENT_SYSTEM_PROMPT, &format!("Query: {query}"))?;
        parse_intent_json(&response)
    }
}

/// Tries `primary`, and on any failure logs it and asks `fallback`.
pub struct FallbackIntentExtractor {
    primary: Box<dyn IntentExtractor>,
    fallback: Box<dyn IntentExtractor>,
}

impl FallbackIntentExtractor {
    pub fn new(primary: Box<dyn IntentExtractor>, fallback: Box<dyn IntentExtractor>) -> Self {
        Self { primary, fallback }
    }
}

impl IntentExtractor for FallbackIntentExtractor {
    fn extract(&self, query: &str) -> Result<Intent, CapabilityError> {
        self.primary.extract(query).or_else(|e| {
            tracing::warn!("Intent extraction failed ({e}), falling back to keyword rules");
            self.fallback.extract(query)
        })
    }
}
