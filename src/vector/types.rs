//! Type-safe wrappers and core types for vector search functionality.
//!
//! Newtypes keep similarity scores and dimensions from degrading into bare
//! floats and integers at API boundaries.

use thiserror::Error;

/// Standard vector dimension for record embeddings (all-MiniLM-L6-v2 model).
pub const VECTOR_DIMENSION_384: usize = 384;

/// Type-safe wrapper for cosine similarity scores.
///
/// Scores are in the range [-1.0, 1.0] where:
/// - 1.0 indicates identical direction
/// - 0.0 indicates orthogonal vectors
/// - -1.0 indicates opposite direction
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct Score(f32);

impl Score {
    /// Creates a new `Score` with validation.
    ///
    /// Returns an error if the score is not in the range [-1.0, 1.0] or is NaN.
    pub fn new(value: f32) -> Result<Self, VectorError> {
        if value.is_nan() {
            return Err(VectorError::InvalidScore {
                value,
                reason: "Score cannot be NaN",
            });
        }
        if !(-1.0..=1.0).contains(&value) {
            return Err(VectorError::InvalidScore {
                value,
                reason: "Score must be in range [-1.0, 1.0]",
            });
        }
        Ok(Self(value))
    }

    /// Creates a score from a raw cosine value, clamping rounding overshoot.
    ///
    /// Returns `None` for NaN.
    #[must_use]
    pub fn from_cosine(value: f32) -> Option<Self> {
        if value.is_nan() {
            None
        } else if value == 0.0 {
            // -0.0 from orthogonal vectors must tie with 0.0
            Some(Self(0.0))
        } else {
            Some(Self(value.clamp(-1.0, 1.0)))
        }
    }

    /// Creates a score of 1.0 (perfect similarity).
    #[must_use]
    pub const fn one() -> Self {
        Self(1.0)
    }

    /// Returns the underlying f32 value.
    #[must_use]
    pub fn get(&self) -> f32 {
        self.0
    }
}

impl Eq for Score {}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Scores are never NaN, so `partial_cmp` is total and agrees with `==`
        self.0
            .partial_cmp(&other.0)
            .unwrap_or(std::cmp::Ordering::Equal)
    }
}

/// Type-safe wrapper for vector dimensions.
///
/// Ensures runtime validation of vector dimensions to prevent
/// dimension mismatches between the query and the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorDimension(usize);

impl VectorDimension {
    /// Creates a new `VectorDimension` with validation.
    ///
    /// Returns an error if the dimension is zero.
    pub fn new(dim: usize) -> Result<Self, VectorError> {
        if dim == 0 {
            return Err(VectorError::InvalidDimension {
                dimension: 0,
                reason: "Vector dimension cannot be zero",
            });
        }
        Ok(Self(dim))
    }

    /// Creates a standard 384-dimensional vector dimension.
    #[must_use]
    pub const fn dimension_384() -> Self {
        Self(VECTOR_DIMENSION_384)
    }

    /// Returns the underlying dimension value.
    #[must_use]
    pub const fn get(&self) -> usize {
        self.0
    }

    /// Validates that a vector has the expected dimension.
    pub fn validate_vector(&self, vector: &[f32]) -> Result<(), VectorError> {
        if vector.len() != self.0 {
            return Err(VectorError::DimensionMismatch {
                expected: self.0,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}

/// Errors that can occur during vector operations.
///
/// All error messages include actionable suggestions for resolution.
#[derive(Error, Debug)]
pub enum VectorError {
    #[error(
        "Vector dimension mismatch: expected {expected}, got {actual}\nSuggestion: Ensure the index and the query use the same embedding model"
    )]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid vector dimension: {dimension}\nReason: {reason}")]
    InvalidDimension {
        dimension: usize,
        reason: &'static str,
    },

    #[error("Invalid score value: {value}\nReason: {reason}")]
    InvalidScore { value: f32, reason: &'static str },

    #[error("Storage error: {0}\nSuggestion: Check disk space and file permissions")]
    Storage(#[from] std::io::Error),

    #[error(
        "Embedding generation failed: {0}\nSuggestion: Verify the embedding model is properly initialized"
    )]
    EmbeddingFailed(String),

    #[error(
        "Unsupported embedding model '{0}'\nSuggestion: Use one of the models listed by `nearby config` (default: AllMiniLML6V2)"
    )]
    UnsupportedModel(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_validation() {
        let score = Score::new(0.5).unwrap();
        assert_eq!(score.get(), 0.5);

        let negative = Score::new(-0.5).unwrap();
        assert_eq!(negative.get(), -0.5);

        assert!(Score::new(-1.1).is_err());
        assert!(Score::new(1.1).is_err());
        assert!(Score::new(f32::NAN).is_err());
    }

    #[test]
    fn test_score_from_cosine_clamps() {
        assert_eq!(Score::from_cosine(1.000_001).unwrap(), Score::one());
        assert_eq!(Score::from_cosine(-1.2).unwrap().get(), -1.0);
        assert!(Score::from_cosine(f32::NAN).is_none());
        assert!(Score::from_cosine(-0.0).unwrap().get().is_sign_positive());
    }

    #[test]
    fn test_score_ordering() {
        let low = Score::new(-0.3).unwrap();
        let high = Score::new(0.7).unwrap();
        assert!(low < high);

        // Undefined scores rank below every defined score
        assert!(None < Some(low));

        let negative_zero = Score::new(-0.0).unwrap();
        let zero = Score::new(0.0).unwrap();
        assert_eq!(negative_zero.cmp(&zero), std::cmp::Ordering::Equal);
    }

    #[test]
    fn test_vector_dimension() {
        let dim = VectorDimension::new(384).unwrap();
        assert_eq!(dim.get(), 384);

        let standard = VectorDimension::dimension_384();
        assert_eq!(standard, dim);

        assert!(VectorDimension::new(0).is_err());

        assert!(dim.validate_vector(&vec![0.1; 384]).is_ok());
        match dim.validate_vector(&vec![0.1; 100]) {
            Err(VectorError::DimensionMismatch { expected, actual }) => {
                assert_eq!(expected, 384);
                assert_eq!(actual, 100);
            }
            other => panic!("Expected DimensionMismatch, got {other:?}"),
        }
    }
}
