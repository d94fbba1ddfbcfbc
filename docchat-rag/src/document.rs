//! Data types for chunks, index entries, and retrieval results.

use serde::{Deserialize, Serialize};

/// A contiguous span of source text, the atomic retrieval unit.
///
/// Chunk ids are the decimal rendering of `source_order`, unique within a
/// document; concatenating chunks in `source_order` reconstructs the
/// source text modulo the configured overlap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    /// Unique identifier within the document.
    pub id: String,
    /// The text content of the chunk.
    pub text: String,
    /// Insertion order within the source document.
    pub source_order: usize,
}

impl Chunk {
    /// Create a chunk at the given source position.
    pub fn new(source_order: usize, text: impl Into<String>) -> Self {
        Self { id: source_order.to_string(), text: text.into(), source_order }
    }
}

/// Metadata persisted alongside each indexed vector.
///
/// Carries at minimum the chunk text so retrieval results can be displayed
/// and used for grounding without a second lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntryMetadata {
    /// The chunk's text content.
    pub text: String,
    /// The chunk's position in the source document.
    pub source_order: usize,
}

/// An `(id, vector, metadata)` triple stored in a vector index.
///
/// Created during ingestion, immutable thereafter, destroyed only when the
/// index is reset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexEntry {
    /// Identifier, matching the originating chunk's id.
    pub id: String,
    /// The embedding vector.
    pub vector: Vec<f32>,
    /// Metadata returned with query results.
    pub metadata: EntryMetadata,
}

impl IndexEntry {
    /// Build an entry from a chunk and its embedding vector.
    pub fn from_chunk(chunk: &Chunk, vector: Vec<f32>) -> Self {
        Self {
            id: chunk.id.clone(),
            vector,
            metadata: EntryMetadata { text: chunk.text.clone(), source_order: chunk.source_order },
        }
    }
}

/// A first-stage similarity search result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    /// The matched entry's id.
    pub id: String,
    /// Similarity score (higher is more similar).
    pub score: f32,
    /// The matched entry's metadata.
    pub metadata: EntryMetadata,
}

/// A reranked retrieval result, the final output of a query.
///
/// Ephemeral: exists only for the duration of one query/response cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievedDocument {
    /// The retrieved chunk text.
    pub text: String,
    /// 0-based position after reranking (0 is most relevant).
    pub rank: usize,
    /// Relevance score assigned by the reranker.
    pub relevance_score: f32,
}
