//! Retrieval pipeline orchestrator.
//!
//! The [`RetrievalPipeline`] composes a [`Chunker`], an
//! [`EmbeddingProvider`], a [`VectorIndex`], and a [`Reranker`] into the
//! ingest-and-query contract for one document.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docchat_rag::{InMemoryVectorIndex, PassthroughReranker, RetrievalConfig, RetrievalPipeline};
//!
//! let pipeline = RetrievalPipeline::builder()
//!     .config(RetrievalConfig::default())
//!     .embedder(Arc::new(my_embedder))
//!     .index(Arc::new(InMemoryVectorIndex::new()))
//!     .reranker(Arc::new(PassthroughReranker))
//!     .build()?;
//!
//! pipeline.ingest(&text).await?;
//! let documents = pipeline.query("search query").await?;
//! ```

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::chunking::{Chunker, RecursiveChunker};
use crate::config::RetrievalConfig;
use crate::document::{IndexEntry, RetrievedDocument};
use crate::embedding::{EmbedRole, EmbeddingProvider};
use crate::error::{RagError, Result};
use crate::reranker::Reranker;
use crate::vectorstore::VectorIndex;

/// Outcome of an ingestion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestStats {
    /// Number of chunks embedded and indexed. Zero indicates the
    /// empty-document degenerate case: the index was left empty and
    /// queries will return empty result sets.
    pub chunks_indexed: usize,
}

/// The retrieve-then-rerank pipeline for a single document.
///
/// Ingestion (chunk → embed → upsert) runs once per document; querying
/// (embed → search → rerank) runs once per conversation turn. The two are
/// not safe to run concurrently against the same index — callers
/// serialize them.
pub struct RetrievalPipeline {
    config: RetrievalConfig,
    chunker: Arc<dyn Chunker>,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    reranker: Arc<dyn Reranker>,
}

impl RetrievalPipeline {
    /// Create a new [`RetrievalPipelineBuilder`].
    pub fn builder() -> RetrievalPipelineBuilder {
        RetrievalPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Ingest a document: chunk → embed (document role) → upsert.
    ///
    /// A document that produces zero chunks leaves the index empty and
    /// reports `chunks_indexed = 0`; this is a warning condition for the
    /// caller, not an error.
    ///
    /// # Errors
    ///
    /// Returns embedding or index errors unchanged; on any failure nothing
    /// is committed to the index beyond what previous calls stored.
    pub async fn ingest(&self, text: &str) -> Result<IngestStats> {
        let chunks = self.chunker.split(text);
        if chunks.is_empty() {
            warn!("document produced no chunks; index left empty");
            return Ok(IngestStats { chunks_indexed: 0 });
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();

        let vectors = self.embedder.embed(&texts, EmbedRole::Document).await.map_err(|e| {
            error!(error = %e, "embedding failed during ingestion");
            e
        })?;

        if vectors.len() != chunks.len() {
            return Err(RagError::Pipeline(format!(
                "embedding count mismatch: {} chunks, {} vectors",
                chunks.len(),
                vectors.len()
            )));
        }

        let entries: Vec<IndexEntry> = chunks
            .iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexEntry::from_chunk(chunk, vector))
            .collect();

        self.index.upsert(entries).await.map_err(|e| {
            error!(error = %e, "upsert failed during ingestion");
            e
        })?;

        let chunks_indexed = chunks.len();
        info!(chunks_indexed, "ingested document");

        Ok(IngestStats { chunks_indexed })
    }

    /// Query the pipeline: embed (query role) → search → rerank.
    ///
    /// Returns at most `rerank_top_n` documents in rerank order. An empty
    /// index yields an empty result set without an error. Reranked
    /// positions are mapped back into the coarse candidate list by
    /// *index*, so duplicate chunk texts resolve correctly.
    ///
    /// # Errors
    ///
    /// Returns embedding, index (including dimension mismatch), or rerank
    /// errors unchanged; a rerank result referencing a position outside
    /// the candidate list is a [`RagError::Pipeline`].
    pub async fn query(&self, text: &str) -> Result<Vec<RetrievedDocument>> {
        let vectors = self.embedder.embed(&[text], EmbedRole::Query).await.map_err(|e| {
            error!(error = %e, "embedding failed during query");
            e
        })?;
        let query_vector = vectors
            .into_iter()
            .next()
            .ok_or_else(|| RagError::Pipeline("query embedding returned no vector".to_string()))?;

        let hits = self.index.query(&query_vector, self.config.retrieve_top_k).await?;
        if hits.is_empty() {
            info!("query found no candidates");
            return Ok(Vec::new());
        }

        let candidates: Vec<&str> = hits.iter().map(|h| h.metadata.text.as_str()).collect();

        let ranked = self
            .reranker
            .rerank(text, &candidates, self.config.rerank_top_n)
            .await
            .map_err(|e| {
                error!(error = %e, "reranking failed");
                e
            })?;

        let mut documents = Vec::with_capacity(ranked.len());
        for (rank, result) in ranked.into_iter().enumerate() {
            let hit = hits.get(result.index).ok_or_else(|| {
                RagError::Pipeline(format!(
                    "rerank index {} out of range for {} candidates",
                    result.index,
                    hits.len()
                ))
            })?;
            documents.push(RetrievedDocument {
                text: hit.metadata.text.clone(),
                rank,
                relevance_score: result.relevance_score,
            });
        }

        info!(result_count = documents.len(), "query completed");
        Ok(documents)
    }

    /// Tear down the underlying index, discarding all entries.
    pub async fn reset(&self) -> Result<()> {
        self.index.reset().await
    }
}

/// Builder for constructing a [`RetrievalPipeline`].
///
/// `embedder`, `index`, and `reranker` are required. `config` defaults to
/// [`RetrievalConfig::default`] and `chunker` defaults to a
/// [`RecursiveChunker`] sized from the config.
#[derive(Default)]
pub struct RetrievalPipelineBuilder {
    config: Option<RetrievalConfig>,
    chunker: Option<Arc<dyn Chunker>>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    index: Option<Arc<dyn VectorIndex>>,
    reranker: Option<Arc<dyn Reranker>>,
}

impl RetrievalPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RetrievalConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set the embedding provider.
    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the vector index backend.
    pub fn index(mut self, index: Arc<dyn VectorIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Set the reranker.
    pub fn reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    /// Build the [`RetrievalPipeline`], validating that all required
    /// components are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if `embedder`, `index`, or `reranker`
    /// is missing.
    pub fn build(self) -> Result<RetrievalPipeline> {
        let config = self.config.unwrap_or_default();
        let embedder = self
            .embedder
            .ok_or_else(|| RagError::Config("embedder is required".to_string()))?;
        let index = self.index.ok_or_else(|| RagError::Config("index is required".to_string()))?;
        let reranker =
            self.reranker.ok_or_else(|| RagError::Config("reranker is required".to_string()))?;
        let chunker = self
            .chunker
            .unwrap_or_else(|| Arc::new(RecursiveChunker::new(config.chunk_size, config.chunk_overlap)));

        Ok(RetrievalPipeline { config, chunker, embedder, index, reranker })
    }
}
