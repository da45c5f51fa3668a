//! Cosine similarity scoring and deterministic top-K selection.

use rayon::prelude::*;
use std::cmp::Ordering;

use crate::vector::{Score, VectorError};

/// Calculates cosine similarity between two vectors.
///
/// Returns `None` when either vector has zero norm, where the measure is
/// undefined. Callers rank `None` below every defined score.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<Score> {
    debug_assert_eq!(a.len(), b.len(), "Vectors must have same dimension");

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }

    Score::from_cosine(dot_product / (norm_a * norm_b))
}

/// Ranking order: higher score first, then lower original position.
fn rank_order(a: &(usize, Option<Score>), b: &(usize, Option<Score>)) -> Ordering {
    b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}

/// Scores every vector against `query` and returns the `top_k` best
/// `(position, score)` pairs, most similar first.
///
/// Ties are broken by original position so results are deterministic.
/// `top_k == 0` and an empty `vectors` slice both yield an empty result;
/// `top_k >= vectors.len()` returns every position in ranked order.
pub fn rank_top_k(
    query: &[f32],
    vectors: &[Vec<f32>],
    top_k: usize,
) -> Result<Vec<(usize, Option<Score>)>, VectorError> {
    if top_k == 0 || vectors.is_empty() {
        return Ok(Vec::new());
    }

    for vector in vectors {
        if vector.len() != query.len() {
            return Err(VectorError::DimensionMismatch {
                expected: vector.len(),
                actual: query.len(),
            });
        }
    }

    let mut scored: Vec<(usize, Option<Score>)> = vectors
        .par_iter()
        .enumerate()
        .map(|(position, vector)| (position, cosine_similarity(query, vector)))
        .collect();

    if top_k < scored.len() {
        scored.select_nth_unstable_by(top_k, rank_order);
        scored.truncate(top_k);
    }
    scored.sort_by(rank_order);

    Ok(scored)
}
