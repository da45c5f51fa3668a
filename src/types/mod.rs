//! Core data model shared by both retrieval strategies.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::vector::Score;

/// Dataset a query is routed to.
///
/// An unclassified query is represented as `Option<Category>::None` rather
/// than a fourth variant, so every `Category` value names a real dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Restaurant,
    Dentist,
    Event,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Restaurant, Category::Dentist, Category::Event];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Restaurant => "restaurant",
            Category::Dentist => "dentist",
            Category::Event => "event",
        }
    }

    /// Plural form used for data file names (`restaurants.json`).
    pub fn plural(&self) -> &'static str {
        match self {
            Category::Restaurant => "restaurants",
            Category::Dentist => "dentists",
            Category::Event => "events",
        }
    }

    /// Parse a free-form label. Unknown labels (`food`, `delivery`, ...) are
    /// unclassified and yield `None`.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "restaurant" | "restaurants" => Some(Category::Restaurant),
            "dentist" | "dentists" => Some(Category::Dentist),
            "event" | "events" => Some(Category::Event),
            _ => None,
        }
    }

    /// Call-site default for semantic search: unclassified queries go to the
    /// restaurant index. Filter-rank deliberately has no such default.
    pub fn or_default_for_semantic(category: Option<Category>) -> Category {
        category.unwrap_or(Category::Restaurant)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::parse(s).ok_or_else(|| {
            format!("Unknown category '{s}'. Expected one of: restaurant, dentist, event")
        })
    }
}

/// One entry of a corpus or an embedding index.
///
/// `name` is always present; everything else is optional and absent fields
/// never match a filter. Attributes outside the known set are kept in
/// `extra` so a round trip through the index file loses nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// ISO `YYYY-MM-DD`, compared by string equality.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Record {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: None,
            location: None,
            date: None,
            rating: None,
            cuisine: None,
            category: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_cuisine(mut self, cuisine: impl Into<String>) -> Self {
        self.cuisine = Some(cuisine.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Rating as shown to users, always with a fraction: `4.0`, `4.5`.
    pub fn rating_label(&self) -> Option<String> {
        self.rating.map(|rating| {
            if rating.fract() == 0.0 {
                format!("{rating:.1}")
            } else {
                rating.to_string()
            }
        })
    }
}

/// Structured reading of a free-text query.
///
/// Deserializes directly from the JSON an intent-extraction model returns,
/// where `category` is an arbitrary label and empty strings mean "absent".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    #[serde(default, deserialize_with = "deserialize_category")]
    pub category: Option<Category>,

    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub location: Option<String>,

    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub date: Option<String>,
}

impl Intent {
    pub fn new(category: Option<Category>) -> Self {
        Self {
            category,
            ..Self::default()
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Location filter value, if one is active.
    pub fn location_filter(&self) -> Option<&str> {
        self.location.as_deref().filter(|l| !l.is_empty())
    }

    /// Date filter value, if one is active.
    pub fn date_filter(&self) -> Option<&str> {
        self.date.as_deref().filter(|d| !d.is_empty())
    }
}

fn deserialize_category<'de, D>(deserializer: D) -> Result<Option<Category>, D::Error>
where
    D: Deserializer<'de>,
{
    let label: Option<String> = Option::deserialize(deserializer)?;
    Ok(label.as_deref().and_then(Category::parse))
}

fn deserialize_non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("null")))
}

/// A semantic search hit with its original index position.
///
/// `score` is `None` when either vector had zero norm; such hits rank below
/// every defined score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRecord {
    pub position: usize,
    pub score: Option<Score>,
    pub record: Record,
}
