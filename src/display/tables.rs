//! Table formatting utilities for structured output.

use comfy_table::{
    Attribute, Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
};

use crate::indexing::IndexSummary;
use crate::types::{Category, Record, ScoredRecord};

/// Builder for creating formatted tables.
pub struct TableBuilder {
    table: Table,
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TableBuilder {
    /// Create a new table builder.
    pub fn new() -> Self {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        // Apply rounded corners
        table.apply_modifier(UTF8_ROUND_CORNERS);
        Self { table }
    }

    /// Set the table headers.
    pub fn set_headers(mut self, headers: Vec<&str>) -> Self {
        let header_cells: Vec<Cell> = headers
            .into_iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect();
        self.table.set_header(header_cells);
        self
    }

    /// Add a row to the table.
    pub fn add_row(mut self, row: Vec<String>) -> Self {
        self.table.add_row(row);
        self
    }

    /// Build and return the formatted table.
    pub fn build(self) -> String {
        self.table.to_string()
    }
}

/// Column holding the category-specific detail of a record.
fn detail_header(category: Option<Category>) -> &'static str {
    match category {
        Some(Category::Restaurant) => "Cuisine",
        Some(Category::Event) => "Date",
        Some(Category::Dentist) | None => "Details",
    }
}

fn detail_cell(category: Option<Category>, record: &Record) -> String {
    let value = match category {
        Some(Category::Restaurant) => record.cuisine.as_deref(),
        Some(Category::Event) => record.date.as_deref(),
        Some(Category::Dentist) | None => record
            .cuisine
            .as_deref()
            .or(record.date.as_deref())
            .or(record.category.as_deref()),
    };
    value.unwrap_or("-").to_string()
}

fn address_cell(record: &Record) -> String {
    record
        .address
        .as_deref()
        .or(record.location.as_deref())
        .unwrap_or("-")
        .to_string()
}

fn rating_cell(record: &Record) -> String {
    record
        .rating_label()
        .map(|r| format!("{r}⭐"))
        .unwrap_or_else(|| "-".to_string())
}

/// Numbered table of retrieved records.
pub fn create_results_table(category: Option<Category>, records: &[Record]) -> String {
    let mut builder =
        TableBuilder::new().set_headers(vec!["#", "Name", "Address", "Rating", detail_header(category)]);

    for (i, record) in records.iter().enumerate() {
        builder = builder.add_row(vec![
            (i + 1).to_string(),
            record.name.clone(),
            address_cell(record),
            rating_cell(record),
            detail_cell(category, record),
        ]);
    }

    builder.build()
}

/// Semantic hits with their similarity and index position.
pub fn create_scored_table(category: Category, hits: &[ScoredRecord]) -> String {
    let mut builder = TableBuilder::new().set_headers(vec![
        "#",
        "Score",
        "Position",
        "Name",
        "Address",
        detail_header(Some(category)),
    ]);

    for (i, hit) in hits.iter().enumerate() {
        let score = hit
            .score
            .map(|s| format!("{:.3}", s.get()))
            .unwrap_or_else(|| "n/a".to_string());
        builder = builder.add_row(vec![
            (i + 1).to_string(),
            score,
            hit.position.to_string(),
            hit.record.name.clone(),
            address_cell(&hit.record),
            detail_cell(Some(category), &hit.record),
        ]);
    }

    builder.build()
}

/// Create a summary table for index builds.
pub fn create_index_table(summaries: &[IndexSummary]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    // Apply rounded corners for consistency
    table.apply_modifier(UTF8_ROUND_CORNERS);

    table.set_header(vec![
        Cell::new("Category").add_attribute(Attribute::Bold),
        Cell::new("Records").add_attribute(Attribute::Bold),
        Cell::new("Dimension").add_attribute(Attribute::Bold),
        Cell::new("Time").add_attribute(Attribute::Bold),
        Cell::new("Rate").add_attribute(Attribute::Bold),
    ]);

    let mut total_records = 0;
    let mut total_time = std::time::Duration::ZERO;

    for summary in summaries {
        total_records += summary.records;
        total_time += summary.elapsed;

        let rate = summary.records_per_second().unwrap_or(0.0);
        table.add_row(vec![
            summary.category.plural().to_string(),
            summary.records.to_string(),
            summary.dimension.to_string(),
            format!("{:?}", summary.elapsed),
            format!("{rate:.0}/s"),
        ]);
    }

    if summaries.len() > 1 {
        table.add_row(vec![
            Cell::new("TOTAL").add_attribute(Attribute::Bold),
            Cell::new(total_records)
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
            Cell::new(""),
            Cell::new(format!("{total_time:?}")).add_attribute(Attribute::Bold),
            Cell::new(""),
        ]);
    }

    table.to_string()
}
