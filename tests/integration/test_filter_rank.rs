//! Filter-and-rank over corpus files on disk.

use crate::common::TestData;
use nearby::{Category, Intent, Record, filter_and_rank, filter_and_rank_records};

fn names(records: &[Record]) -> Vec<&str> {
    records.iter().map(|r| r.name.as_str()).collect()
}

#[test]
fn location_filter_checks_address_and_location() {
    let data = TestData::new();
    let intent = Intent::new(Some(Category::Dentist)).with_location("MG ROAD");

    let results = filter_and_rank(&intent, &data.layout());

    // Bright Smiles only has a location field; ranking is by rating
    assert_eq!(names(&results), vec!["Bright Smiles", "Smile Dental"]);
}

#[test]
fn rating_ties_keep_corpus_order() {
    let data = TestData::new();
    data.add_file(
        "restaurants.json",
        r#"[
            {"name": "A", "rating": 4},
            {"name": "B", "rating": 4},
            {"name": "C", "rating": 5}
        ]"#,
    );

    let results = filter_and_rank(&Intent::new(Some(Category::Restaurant)), &data.layout());
    assert_eq!(names(&results), vec!["C", "A", "B"]);
}

#[test]
fn results_are_capped_at_three() {
    let data = TestData::new();

    let results = filter_and_rank(&Intent::new(Some(Category::Restaurant)), &data.layout());
    assert_eq!(results.len(), 3);
    // Toit and Vidyarthi Bhavan tie at 4.6, corpus order decides
    assert_eq!(names(&results), vec!["Toit", "Vidyarthi Bhavan", "Truffles"]);
}

#[test]
fn event_date_filter() {
    let data = TestData::new();
    let intent = Intent::new(Some(Category::Event))
        .with_location("indiranagar")
        .with_date("2025-07-12");

    let results = filter_and_rank(&intent, &data.layout());
    assert_eq!(names(&results), vec!["Jazz Night", "Comedy Open Mic"]);
}

#[test]
fn intent_from_model_json_drives_filters() {
    let data = TestData::new();
    let intent: Intent =
        serde_json::from_str(r#"{"category": "dentist", "location": "jayanagar", "date": null}"#)
            .unwrap();

    let results = filter_and_rank(&intent, &data.layout());
    assert_eq!(names(&results), vec!["Tooth Fairy Clinic"]);
}

#[test]
fn unclassified_or_unreadable_yields_nothing() {
    let data = TestData::new();

    let food: Intent = serde_json::from_str(r#"{"category": "food"}"#).unwrap();
    assert!(filter_and_rank(&food, &data.layout()).is_empty());

    data.add_file("events.json", "{ truncated");
    assert!(filter_and_rank(&Intent::new(Some(Category::Event)), &data.layout()).is_empty());
}

#[test]
fn pure_variant_respects_custom_limit() {
    let records: Vec<Record> = (0..6)
        .map(|i| Record::new(format!("R{i}")).with_rating(f64::from(i)))
        .collect();

    let results = filter_and_rank_records(
        &Intent::new(Some(Category::Restaurant)),
        Category::Restaurant,
        records,
        5,
    );
    assert_eq!(names(&results), vec!["R5", "R4", "R3", "R2", "R1"]);
}
