//! Error types for generation-service interactions.

use thiserror::Error;

/// Errors produced by [`ChatModel`](crate::ChatModel) implementations.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The generation service rejected or failed the request.
    #[error("Generation error ({provider}): {message}")]
    Model {
        /// The backend that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The response stream failed mid-flight.
    #[error("Stream error ({provider}): {message}")]
    Stream {
        /// The backend that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A client configuration problem (missing key, bad endpoint).
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A convenience result type for generation operations.
pub type Result<T> = std::result::Result<T, ChatError>;
