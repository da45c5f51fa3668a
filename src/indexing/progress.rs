//! Reporting for offline index builds

use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::indexing::IndexingError;
use crate::types::Category;

/// Outcome of building one category's embedding index
#[derive(Debug, Clone, Serialize)]
pub struct IndexSummary {
    pub category: Category,

    /// Number of records (and vectors) written
    pub records: usize,

    /// Vector dimension of the model used
    pub dimension: usize,

    pub model_name: String,

    /// Where the index file was written
    pub path: PathBuf,

    /// Time spent loading, embedding and writing
    #[serde(serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

fn serialize_millis<S>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(elapsed.as_millis() as u64)
}

impl IndexSummary {
    /// Records embedded per second, if any time elapsed.
    pub fn records_per_second(&self) -> Option<f64> {
        let secs = self.elapsed.as_secs_f64();
        (secs > 0.0).then(|| self.records as f64 / secs)
    }
}

/// A category whose index could not be built
#[derive(Debug, Clone, Serialize)]
pub struct IndexFailure {
    pub category: Category,
    pub code: String,
    pub message: String,
}

/// Outcome of a batch of index builds, in build order
#[derive(Debug, Clone, Default, Serialize)]
pub struct IndexReport {
    pub built: Vec<IndexSummary>,
    pub failed: Vec<IndexFailure>,
}

impl IndexReport {
    /// Split build outcomes into a report and the errors behind its
    /// failures, which keep their recovery hints and exit status.
    pub fn collect(
        outcomes: Vec<(Category, Result<IndexSummary, IndexingError>)>,
    ) -> (Self, Vec<IndexingError>) {
        let mut report = Self::default();
        let mut errors = Vec::new();

        for (category, outcome) in outcomes {
            match outcome {
                Ok(summary) => report.built.push(summary),
                Err(e) => {
                    report.failed.push(IndexFailure {
                        category,
                        code: e.status_code(),
                        message: e.to_string(),
                    });
                    errors.push(e);
                }
            }
        }

        (report, errors)
    }
}
