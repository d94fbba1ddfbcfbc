//! Vector index trait for storing and searching embeddings.

use async_trait::async_trait;

use crate::document::{IndexEntry, SearchHit};
use crate::error::Result;

/// A similarity-search index over `(id, vector, metadata)` entries.
///
/// One index is exclusively owned by one document session. The backing
/// structure is created lazily by the first non-empty [`upsert`], which
/// fixes the index dimensionality to the first entry's vector length;
/// every later vector (stored or queried) must match it exactly —
/// mismatches are a hard [`RagError::DimensionMismatch`], never silently
/// truncated or padded.
///
/// Concurrent `upsert` and `query` against the same index are not
/// supported; callers serialize them.
///
/// [`upsert`]: VectorIndex::upsert
/// [`RagError::DimensionMismatch`]: crate::RagError::DimensionMismatch
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or replace entries, idempotent by id.
    ///
    /// Zero entries is a no-op and must not fail.
    async fn upsert(&self, entries: Vec<IndexEntry>) -> Result<()>;

    /// Return the `top_k` nearest entries by cosine similarity, descending
    /// by score.
    ///
    /// A never-written index returns an empty result, not an error.
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<SearchHit>>;

    /// Tear the index down: discard all entries and the fixed
    /// dimensionality, returning to the never-written state.
    async fn reset(&self) -> Result<()>;
}
