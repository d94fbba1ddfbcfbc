//! Configuration for the retrieval pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Tuning parameters for the retrieval pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetrievalConfig {
    /// Maximum chunk size in bytes of UTF-8 text.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of coarse candidates fetched from the vector index.
    pub retrieve_top_k: usize,
    /// Number of results kept after reranking.
    pub rerank_top_n: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { chunk_size: 1000, chunk_overlap: 100, retrieve_top_k: 10, rerank_top_n: 3 }
    }
}

impl RetrievalConfig {
    /// Create a new builder for constructing a [`RetrievalConfig`].
    pub fn builder() -> RetrievalConfigBuilder {
        RetrievalConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RetrievalConfig`].
#[derive(Debug, Clone, Default)]
pub struct RetrievalConfigBuilder {
    config: RetrievalConfig,
}

impl RetrievalConfigBuilder {
    /// Set the maximum chunk size.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of coarse candidates fetched per query.
    pub fn retrieve_top_k(mut self, k: usize) -> Self {
        self.config.retrieve_top_k = k;
        self
    }

    /// Set the number of results kept after reranking.
    pub fn rerank_top_n(mut self, n: usize) -> Self {
        self.config.rerank_top_n = n;
        self
    }

    /// Build the [`RetrievalConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if:
    /// - `chunk_overlap >= chunk_size`
    /// - `retrieve_top_k == 0`
    /// - `rerank_top_n == 0`
    pub fn build(self) -> Result<RetrievalConfig> {
        if self.config.chunk_overlap >= self.config.chunk_size {
            return Err(RagError::Config(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.config.chunk_overlap, self.config.chunk_size
            )));
        }
        if self.config.retrieve_top_k == 0 {
            return Err(RagError::Config("retrieve_top_k must be greater than zero".to_string()));
        }
        if self.config.rerank_top_n == 0 {
            return Err(RagError::Config("rerank_top_n must be greater than zero".to_string()));
        }
        Ok(self.config)
    }
}
