//! In-memory vector index using cosine similarity.
//!
//! This module provides [`InMemoryVectorIndex`], a zero-dependency index
//! backed by a `HashMap` protected by a `tokio::sync::RwLock`. It is
//! suitable for development, testing, and small single-document sessions.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{IndexEntry, SearchHit};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorIndex;

/// An in-memory [`VectorIndex`] using cosine similarity for search.
///
/// Dimensionality is fixed by the first upserted entry and enforced on
/// every subsequent write and query.
///
/// # Example
///
/// ```rust,ignore
/// use docchat_rag::{InMemoryVectorIndex, VectorIndex};
///
/// let index = InMemoryVectorIndex::new();
/// index.upsert(entries).await?;
/// let hits = index.query(&query_vector, 10).await?;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryVectorIndex {
    inner: RwLock<IndexState>,
}

#[derive(Debug, Default)]
struct IndexState {
    dimensions: Option<usize>,
    entries: HashMap<String, IndexEntry>,
}

impl InMemoryVectorIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn upsert(&self, entries: Vec<IndexEntry>) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut state = self.inner.write().await;
        let dimensions = state.dimensions.unwrap_or(entries[0].vector.len());
        for entry in &entries {
            if entry.vector.len() != dimensions {
                return Err(RagError::DimensionMismatch {
                    got: entry.vector.len(),
                    want: dimensions,
                });
            }
        }

        state.dimensions = Some(dimensions);
        for entry in entries {
            state.entries.insert(entry.id.clone(), entry);
        }
        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<SearchHit>> {
        let state = self.inner.read().await;
        let Some(dimensions) = state.dimensions else {
            return Ok(Vec::new());
        };
        if vector.len() != dimensions {
            return Err(RagError::DimensionMismatch { got: vector.len(), want: dimensions });
        }

        let mut hits: Vec<SearchHit> = state
            .entries
            .values()
            .map(|entry| SearchHit {
                id: entry.id.clone(),
                score: cosine_similarity(&entry.vector, vector),
                metadata: entry.metadata.clone(),
            })
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(top_k);
        Ok(hits)
    }

    async fn reset(&self) -> Result<()> {
        let mut state = self.inner.write().await;
        *state = IndexState::default();
        Ok(())
    }
}
