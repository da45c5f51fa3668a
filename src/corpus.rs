//! Corpus Store: the raw per-category record collections.
//!
//! A corpus file is a JSON array of record objects. Elements that cannot be
//! read as a [`Record`] (not an object, no string `name`) are skipped with a
//! warning instead of failing the whole file. A known optional field with
//! the wrong type is dropped so the rest of the record survives.

use std::path::Path;

use serde_json::Value;

use crate::error::{CorpusError, CorpusResult};
use crate::types::Record;

/// Load every readable record from a corpus file, in file order.
pub fn load_corpus(path: &Path) -> CorpusResult<Vec<Record>> {
    let content = std::fs::read_to_string(path).map_err(|source| CorpusError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let values: Vec<Value> =
        serde_json::from_str(&content).map_err(|source| CorpusError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let total = values.len();
    let mut records = Vec::with_capacity(total);
    for (position, mut value) in values.into_iter().enumerate() {
        drop_mistyped_fields(&mut value, position, path);
        match serde_json::from_value::<Record>(value) {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!(
                "Skipping record {position} in {}: {e}",
                path.display()
            ),
        }
    }

    tracing::debug!(
        "Loaded {} of {total} records from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

/// Optional text fields of [`Record`]; `rating` is the only numeric one.
const TEXT_FIELDS: [&str; 5] = ["address", "location", "date", "cuisine", "category"];

/// Remove known optional fields whose JSON type cannot be read, so the
/// record loads with that field absent.
fn drop_mistyped_fields(value: &mut Value, position: usize, path: &Path) {
    let Some(object) = value.as_object_mut() else {
        return;
    };

    let mistyped: Vec<&str> = TEXT_FIELDS
        .iter()
        .copied()
        .filter(|field| {
            object
                .get(*field)
                .is_some_and(|v| !(v.is_string() || v.is_null()))
        })
        .chain(
            object
                .get("rating")
                .is_some_and(|v| !(v.is_number() || v.is_null()))
                .then_some("rating"),
        )
        .collect();

    for field in mistyped {
        tracing::warn!(
            "Ignoring mistyped '{field}' of record {position} in {}",
            path.display()
        );
        object.remove(field);
    }
}

/// Fail-soft variant: an unreadable or malformed corpus is an empty corpus.
pub fn load_corpus_or_empty(path: &Path) -> Vec<Record> {
    load_corpus(path).unwrap_or_else(|e| {
        tracing::warn!("{e}");
        Vec::new()
    })
}
