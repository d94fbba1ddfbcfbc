//! # docchat-session
//!
//! The conversational session manager for docchat: the caller-facing
//! `upload`/`ask` surface over the retrieval pipeline and a streaming
//! generation model.
//!
//! ## Overview
//!
//! - [`ConversationSession`] — one document, one conversation; uploads
//!   rebuild the index, asks stream grounded answers
//! - [`TextExtractor`] / [`Utf8TextExtractor`] — the bytes → text seam
//! - [`AskReply`] — retrieved documents plus the text-delta stream
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use futures::StreamExt;
//! use docchat_session::ConversationSession;
//!
//! let mut session = ConversationSession::builder()
//!     .model(Arc::new(model))
//!     .pipeline(pipeline)
//!     .build()?;
//!
//! session.upload(&bytes, "guide.txt").await?;
//! let mut reply = session.ask("Summarize the guide").await?;
//! while let Some(delta) = reply.deltas.next().await {
//!     print!("{}", delta?);
//! }
//! ```

mod error;
pub mod extract;
mod session;

pub use error::{Result, SessionError};
pub use extract::{ExtractionError, TextExtractor, Utf8TextExtractor};
pub use session::{
    AskReply, ConversationSession, SessionBuilder, TextDeltaStream, UploadReport, UploadWarning,
};
