//! # docchat-rag
//!
//! The retrieval half of the docchat engine: chunking, embedding,
//! vector indexing, and two-stage retrieve-then-rerank querying over a
//! single document.
//!
//! ## Overview
//!
//! - [`Chunker`] / [`RecursiveChunker`] / [`FixedSizeChunker`] — split
//!   source text into retrievable chunks
//! - [`EmbeddingProvider`] — role-tagged text → vector embedding
//! - [`VectorIndex`] / [`InMemoryVectorIndex`] — similarity search over
//!   `(id, vector, metadata)` entries
//! - [`Reranker`] / [`PassthroughReranker`] — second-stage relevance
//!   scoring by candidate index
//! - [`RetrievalPipeline`] — composes the above into `ingest` + `query`
//!
//! Cohere-backed providers live behind the `cohere` feature; a Qdrant
//! index backend lives behind the `qdrant` feature.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docchat_rag::{
//!     InMemoryVectorIndex, PassthroughReranker, RetrievalConfig, RetrievalPipeline,
//! };
//!
//! let pipeline = RetrievalPipeline::builder()
//!     .config(RetrievalConfig::default())
//!     .embedder(Arc::new(embedder))
//!     .index(Arc::new(InMemoryVectorIndex::new()))
//!     .reranker(Arc::new(PassthroughReranker))
//!     .build()?;
//!
//! pipeline.ingest(&text).await?;
//! let documents = pipeline.query("what does the document say?").await?;
//! ```

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod inmemory;
pub mod pipeline;
pub mod reranker;
pub mod vectorstore;

#[cfg(feature = "cohere")]
pub mod cohere;
#[cfg(feature = "qdrant")]
pub mod qdrant;

pub use chunking::{Chunker, FixedSizeChunker, RecursiveChunker};
pub use config::{RetrievalConfig, RetrievalConfigBuilder};
pub use document::{Chunk, EntryMetadata, IndexEntry, RetrievedDocument, SearchHit};
pub use embedding::{EmbedRole, EmbeddingProvider};
pub use error::{RagError, Result};
pub use inmemory::InMemoryVectorIndex;
pub use pipeline::{IngestStats, RetrievalPipeline, RetrievalPipelineBuilder};
pub use reranker::{PassthroughReranker, RankedIndex, Reranker};
pub use vectorstore::VectorIndex;

#[cfg(feature = "cohere")]
pub use cohere::{CohereEmbeddingProvider, CohereReranker};
#[cfg(feature = "qdrant")]
pub use qdrant::QdrantVectorIndex;
