//! Structured Filter-Rank Engine.
//!
//! Exact filters (location substring, event date) over a category's corpus,
//! then a stable rating sort and truncation. Unlike semantic search there is
//! no default category: an unclassified intent finds nothing.

use std::cmp::Ordering;

use crate::config::DataLayout;
use crate::corpus::load_corpus_or_empty;
use crate::types::{Category, Intent, Record};

/// Maximum number of records returned by [`filter_and_rank`].
pub const DEFAULT_LIMIT: usize = 3;

/// Filter and rank the corpus for `intent.category`, returning at most
/// [`DEFAULT_LIMIT`] records.
///
/// Never fails: an unclassified intent or an unreadable corpus yields an
/// empty result.
pub fn filter_and_rank(intent: &Intent, layout: &DataLayout) -> Vec<Record> {
    filter_and_rank_with_limit(intent, layout, DEFAULT_LIMIT)
}

/// [`filter_and_rank`] with an explicit result limit.
pub fn filter_and_rank_with_limit(
    intent: &Intent,
    layout: &DataLayout,
    limit: usize,
) -> Vec<Record> {
    let Some(category) = intent.category else {
        tracing::debug!("Filter-rank skipped: intent has no known category");
        return Vec::new();
    };

    let records = load_corpus_or_empty(&layout.corpus_path(category));
    filter_and_rank_records(intent, category, records, limit)
}

/// Pure filter-and-rank over an already loaded corpus.
pub fn filter_and_rank_records(
    intent: &Intent,
    category: Category,
    records: Vec<Record>,
    limit: usize,
) -> Vec<Record> {
    let total = records.len();
    let location = intent.location_filter().map(str::to_lowercase);
    let date = match category {
        Category::Event => intent.date_filter(),
        _ => None,
    };

    let mut survivors: Vec<Record> = records
        .into_iter()
        .filter(|record| {
            location
                .as_deref()
                .is_none_or(|needle| matches_location(record, needle))
        })
        .filter(|record| date.is_none_or(|d| record.date.as_deref() == Some(d)))
        .collect();

    // Rating sort is keyed on the first survivor only
    if survivors.first().is_some_and(|r| r.rating.is_some()) {
        survivors.sort_by(compare_rating_desc);
    }

    tracing::debug!(
        "Filter-rank {category}: {} of {total} records survived, returning up to {limit}",
        survivors.len()
    );

    survivors.truncate(limit);
    survivors
}

/// `needle` must already be lowercase.
fn matches_location(record: &Record, needle: &str) -> bool {
    [record.address.as_deref(), record.location.as_deref()]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(needle))
}

/// Descending by rating; unrated records after all rated ones.
fn compare_rating_desc(a: &Record, b: &Record) -> Ordering {
    match (a.rating, b.rating) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
