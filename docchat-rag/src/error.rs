//! Error types for the `docchat-rag` crate.

use thiserror::Error;

/// Errors that can occur in retrieval operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector index backend.
    #[error("Vector index error ({backend}): {message}")]
    VectorIndex {
        /// The vector index backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A vector's dimensionality disagrees with the index.
    #[error("dimension mismatch: got {got}, index holds {want}")]
    DimensionMismatch {
        /// Dimensionality of the offending vector.
        got: usize,
        /// Dimensionality fixed by the index.
        want: usize,
    },

    /// An error occurred during result reranking.
    #[error("Rerank error ({provider}): {message}")]
    Rerank {
        /// The rerank provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error in the retrieval pipeline orchestration.
    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

/// A convenience result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;
