//! Error types for the `docchat-session` crate.

use thiserror::Error;

use docchat_core::ChatError;
use docchat_rag::RagError;

use crate::extract::ExtractionError;

/// Errors that can occur while driving a conversation session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A question was asked before any document was ingested.
    #[error("session not ready: no document has been ingested")]
    NotReady,

    /// The uploaded document could not be turned into text.
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// A retrieval-side failure (embedding, indexing, reranking).
    #[error(transparent)]
    Rag(#[from] RagError),

    /// A generation-service failure.
    #[error(transparent)]
    Chat(#[from] ChatError),

    /// A session construction problem.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A convenience result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
