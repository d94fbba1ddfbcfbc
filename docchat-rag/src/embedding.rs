//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::Result;

/// The retrieval role a text plays when embedded.
///
/// Embedding services tune their output differently for short queries and
/// long documents; the same text can produce materially different vectors
/// under each role. Ingestion must embed with [`EmbedRole::Document`] and
/// queries with [`EmbedRole::Query`] against the same model, or retrieval
/// quality silently degrades without an explicit error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedRole {
    /// A short search query.
    Query,
    /// A document chunk being indexed.
    Document,
}

/// A provider that generates vector embeddings from text input.
///
/// Implementations wrap a specific embedding backend behind a unified
/// async interface. Backends with request-size limits batch internally;
/// callers always receive exactly one vector per input text, in input
/// order, or an error. A failed batch fails the whole call — partial
/// results are never returned.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate one embedding vector per input text, order-preserving.
    async fn embed(&self, texts: &[&str], role: EmbedRole) -> Result<Vec<Vec<f32>>>;
}
