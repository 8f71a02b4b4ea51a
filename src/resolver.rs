//! # Nearest-neighbour resolution
//!
//! Brute-force cosine search over a [`VectorStore`]. Each call to
//! [`NeighborResolver::resolve`] scans every entry, so a single lookup costs
//! `O(V·D)` (V words, D dimensions) and a pipeline resolving W tokens costs
//! `O(W·V·D)`. That product is the dominant cost of the whole program; no index
//! is built.
//!
//! ## Rules
//! - A word that is not in the store resolves to itself.
//! - The query word itself is never a candidate.
//! - Candidates with zero magnitude (or a zero-magnitude query) have no defined
//!   similarity and are skipped.
//! - Equal best similarities go to the lexicographically smallest word, so the
//!   answer never depends on hash-map iteration order.
//! - A candidate whose length differs from the query's fails the call with
//!   [`SwapError::DimensionMismatch`].

use std::sync::Arc;

use crate::error::{Result, SwapError};
use crate::vector_store::VectorStore;

/// Cosine similarity `dot(a, b) / (‖a‖·‖b‖)`, clamped to `[-1, 1]`.
///
/// Each vector is divided by its largest absolute component before the sums
/// are taken, so very small or very large magnitudes neither underflow to zero
/// nor overflow to infinity.
///
/// Returns `Ok(None)` when either vector has zero magnitude, or when the
/// result is not a finite number.
///
/// # Errors
/// [`SwapError::DimensionMismatch`] if `a.len() != b.len()`.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Result<Option<f64>> {
    if a.len() != b.len() {
        return Err(SwapError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let (scale_a, scale_b) = (max_abs(a), max_abs(b));
    if scale_a == 0.0 || scale_b == 0.0 {
        return Ok(None);
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0, 0.0, 0.0);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (x / scale_a, y / scale_b);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());
    if !similarity.is_finite() {
        return Ok(None);
    }
    Ok(Some(similarity.clamp(-1.0, 1.0)))
}

fn max_abs(v: &[f64]) -> f64 {
    v.iter().fold(0.0, |max, x| max.max(x.abs()))
}

/// Best candidate found for a query.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub word: String,
    pub similarity: f64,
}

/// Finds the most cosine-similar other word for a query word.
///
/// Cheap to clone; clones share the same store.
#[derive(Debug, Clone)]
pub struct NeighborResolver {
    store: Arc<VectorStore>,
}

impl NeighborResolver {
    pub fn new(store: Arc<VectorStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    /// The nearest other word, or `word` itself when there is none.
    pub fn resolve(&self, word: &str) -> Result<String> {
        Ok(self
            .nearest(word)?
            .map_or_else(|| word.to_string(), |neighbor| neighbor.word))
    }

    /// The nearest other word together with its similarity.
    ///
    /// `Ok(None)` when `word` is unknown, has zero magnitude, or the store holds
    /// no usable candidate besides it.
    pub fn nearest(&self, word: &str) -> Result<Option<Neighbor>> {
        let Some(query) = self.store.get(word) else {
            return Ok(None);
        };

        let mut best: Option<(&str, f64)> = None;
        for (candidate, vector) in self.store.iter() {
            if candidate == word {
                continue;
            }
            let Some(similarity) = cosine_similarity(query, vector)? else {
                continue;
            };
            let better = match best {
                None => true,
                Some((best_word, best_similarity)) => {
                    similarity > best_similarity
                        || (similarity == best_similarity && candidate < best_word)
                }
            };
            if better {
                best = Some((candidate, similarity));
            }
        }

        Ok(best.map(|(word, similarity)| Neighbor {
            word: word.to_string(),
            similarity,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(records: Vec<(&str, Vec<f64>)>) -> NeighborResolver {
        NeighborResolver::new(Arc::new(VectorStore::from_records(records)))
    }

    #[test]
    fn test_self_similarity_is_one() {
        for v in [vec![1.0, 2.0, 3.0], vec![-0.3, 0.7], vec![1e-3, 5e4, 2.5]] {
            let s = cosine_similarity(&v, &v).unwrap().unwrap();
            assert!((s - 1.0).abs() < 1e-12, "got {s}");
        }
    }

    #[test]
    fn test_similarity_is_symmetric() {
        let a = [0.2, -1.0, 3.5];
        let b = [1.1, 0.4, -0.9];
        assert_eq!(
            cosine_similarity(&a, &b).unwrap(),
            cosine_similarity(&b, &a).unwrap()
        );
    }

    #[test]
    fn test_similarity_rejects_mismatched_lengths() {
        let err = cosine_similarity(&[1.0, 0.0], &[1.0]).unwrap_err();
        assert!(matches!(
            err,
            SwapError::DimensionMismatch { left: 2, right: 1 }
        ));
    }

    #[test]
    fn test_zero_vector_has_no_similarity() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).unwrap(), None);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 0.0]).unwrap(), None);
    }

    #[test]
    fn test_extreme_magnitudes_stay_finite() {
        let tiny = [1e-200, 1e-200];
        let huge = [1e200, 1e200];
        for v in [&tiny, &huge] {
            let s = cosine_similarity(v, v).unwrap().unwrap();
            assert!((s - 1.0).abs() < 1e-12, "got {s}");
        }
        let s = cosine_similarity(&tiny, &huge).unwrap().unwrap();
        assert!((s - 1.0).abs() < 1e-12, "got {s}");
        let s = cosine_similarity(&[1e-300, 0.0], &[0.0, 1e300]).unwrap().unwrap();
        assert_eq!(s, 0.0);
    }

    #[test]
    fn test_large_vectors_resolve_deterministically() {
        for _ in 0..20 {
            let r = resolver(vec![
                ("query", vec![1e200, 0.0]),
                ("c", vec![3e200, 0.0]),
                ("a", vec![2e200, 0.0]),
                ("b", vec![1e200, 1e199]),
            ]);
            let n = r.nearest("query").unwrap().unwrap();
            assert_eq!(n.word, "a");
            assert!((n.similarity - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_king_resolves_to_queen() {
        let r = resolver(vec![
            ("king", vec![1.0, 0.0]),
            ("queen", vec![0.9, 0.1]),
            ("cat", vec![0.0, 1.0]),
        ]);
        assert_eq!(r.resolve("king").unwrap(), "queen");
    }

    #[test]
    fn test_unknown_word_resolves_to_itself() {
        let r = resolver(vec![("king", vec![1.0, 0.0])]);
        assert_eq!(r.resolve("dragon").unwrap(), "dragon");
    }

    #[test]
    fn test_empty_store_resolves_to_itself() {
        let r = resolver(vec![]);
        assert_eq!(r.resolve("anything").unwrap(), "anything");
    }

    #[test]
    fn test_only_self_resolves_to_itself() {
        let r = resolver(vec![("alone", vec![1.0, 2.0])]);
        assert_eq!(r.resolve("alone").unwrap(), "alone");
    }

    #[test]
    fn test_never_returns_query_when_other_candidate_exists() {
        // Even an opposite vector beats "no candidate".
        let r = resolver(vec![("up", vec![0.0, 1.0]), ("down", vec![0.0, -1.0])]);
        assert_eq!(r.resolve("up").unwrap(), "down");
        let n = r.nearest("up").unwrap().unwrap();
        assert!((n.similarity + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_ties_go_to_smallest_word() {
        let r = resolver(vec![
            ("query", vec![1.0, 0.0]),
            ("zeta", vec![2.0, 0.0]),
            ("alpha", vec![3.0, 0.0]),
            ("mid", vec![5.0, 0.0]),
        ]);
        for _ in 0..10 {
            assert_eq!(r.resolve("query").unwrap(), "alpha");
        }
    }

    #[test]
    fn test_zero_candidates_are_skipped() {
        let r = resolver(vec![
            ("query", vec![1.0, 0.0]),
            ("void", vec![0.0, 0.0]),
            ("far", vec![-1.0, 0.1]),
        ]);
        assert_eq!(r.resolve("query").unwrap(), "far");
        // A zero query has nothing to compare against.
        assert_eq!(r.resolve("void").unwrap(), "void");
    }

    #[test]
    fn test_mismatched_candidate_fails() {
        let r = resolver(vec![("a", vec![1.0, 0.0]), ("b", vec![1.0, 0.0, 0.0])]);
        assert!(matches!(
            r.resolve("a"),
            Err(SwapError::DimensionMismatch { .. })
        ));
    }
}
