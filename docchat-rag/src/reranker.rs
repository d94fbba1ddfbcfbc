//! Reranker trait for second-stage relevance scoring.

use async_trait::async_trait;

use crate::error::Result;

/// A candidate position paired with its reranked relevance score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedIndex {
    /// Position into the candidate array passed to [`Reranker::rerank`].
    pub index: usize,
    /// Relevance score (higher is more relevant).
    pub relevance_score: f32,
}

/// A reranker that re-scores a small candidate set against a query.
///
/// First-stage vector similarity is coarse and cheap; reranking applies a
/// more accurate relevance model to the handful of survivors. Results
/// reference candidates by *position*, never by text identity, so
/// duplicate candidate texts stay distinguishable.
#[async_trait]
pub trait Reranker: Send + Sync {
    /// Score `candidates` against `query`.
    ///
    /// Returns at most `top_n` entries, descending by relevance score,
    /// each indexing into `candidates`.
    async fn rerank(
        &self,
        query: &str,
        candidates: &[&str],
        top_n: usize,
    ) -> Result<Vec<RankedIndex>>;
}

/// A reranker that preserves first-stage order.
///
/// Keeps the first `top_n` candidates with synthetic, rank-derived scores.
/// Useful as a default when no rerank service is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughReranker;

#[async_trait]
impl Reranker for PassthroughReranker {
    async fn rerank(
        &self,
        _query: &str,
        candidates: &[&str],
        top_n: usize,
    ) -> Result<Vec<RankedIndex>> {
        Ok((0..candidates.len().min(top_n))
            .map(|index| RankedIndex { index, relevance_score: 1.0 / (index + 1) as f32 })
            .collect())
    }
}
