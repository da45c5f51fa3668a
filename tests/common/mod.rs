//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use nearby::{DataLayout, EmbeddingGenerator, VectorDimension, VectorError};
use tempfile::TempDir;

pub const RESTAURANTS: &str = r#"[
    {"name": "Truffles", "address": "St Marks Road, Bengaluru", "cuisine": "Burgers", "rating": 4.5},
    {"name": "Meghana Foods", "address": "Residency Road, Bengaluru", "cuisine": "Biryani", "rating": 4.4},
    {"name": "Toit", "address": "100 Feet Road, Indiranagar", "cuisine": "Brewery", "rating": 4.6},
    {"name": "Vidyarthi Bhavan", "address": "Gandhi Bazaar", "cuisine": "Dosa", "rating": 4.6},
    {"name": "LMB", "address": "Johari Bazaar, Jaipur", "cuisine": "Rajasthani"}
]"#;

pub const DENTISTS: &str = r#"[
    {"name": "Smile Dental", "address": "MG Road, Bengaluru", "rating": 4.2},
    {"name": "Tooth Fairy Clinic", "address": "Jayanagar 4th Block", "rating": 4.8},
    {"name": "Bright Smiles", "location": "mg road", "rating": 4.7},
    {"name": "Dental Hub", "address": "Brigade Road"}
]"#;

pub const EVENTS: &str = r#"[
    {"name": "Jazz Night", "address": "Indiranagar Social", "date": "2025-07-12", "category": "music"},
    {"name": "Food Fest", "address": "Palace Grounds", "date": "2025-07-13", "category": "food"},
    {"name": "Comedy Open Mic", "address": "Indiranagar", "date": "2025-07-12", "category": "comedy"}
]"#;

/// Temporary data directory holding the three corpus files.
pub struct TestData {
    pub dir: TempDir,
}

impl TestData {
    pub fn new() -> Self {
        let data = Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        };
        data.add_file("restaurants.json", RESTAURANTS);
        data.add_file("dentists.json", DENTISTS);
        data.add_file("events.json", EVENTS);
        data
    }

    pub fn add_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn layout(&self) -> DataLayout {
        DataLayout::new(self.dir.path())
    }
}

/// Deterministic bag-of-words generator: lowercase tokens hashed into
/// buckets, L2-normalised. Identical texts embed identically and shared
/// words raise similarity, which is all these tests rely on.
pub struct HashingGenerator {
    dimension: VectorDimension,
}

impl HashingGenerator {
    pub fn new() -> Self {
        Self {
            dimension: VectorDimension::dimension_384(),
        }
    }
}

impl EmbeddingGenerator for HashingGenerator {
    fn generate_embeddings(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, VectorError> {
        let dim = self.dimension.get();
        Ok(texts
            .iter()
            .map(|text| {
                let mut embedding = vec![0.0f32; dim];
                for token in text.split_whitespace() {
                    let token = token
                        .trim_matches(|c: char| !c.is_alphanumeric())
                        .to_lowercase();
                    if token.is_empty() {
                        continue;
                    }
                    let hash = token.bytes().fold(0xcbf2_9ce4_8422_2325u64, |h, b| {
                        (h ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
                    });
                    embedding[(hash % dim as u64) as usize] += 1.0;
                }
                let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
                if norm > 0.0 {
                    embedding.iter_mut().for_each(|x| *x /= norm);
                }
                embedding
            })
            .collect())
    }

    fn dimension(&self) -> VectorDimension {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "HashingTest"
    }
}
