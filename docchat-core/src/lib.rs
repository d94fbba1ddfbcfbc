//! # docchat-core
//!
//! Core types shared across the docchat workspace: conversation content,
//! the generation-service abstraction, and the typed event stream that
//! streaming chat backends produce.
//!
//! The crate is deliberately small. Everything network-facing lives in
//! `docchat-model`; everything retrieval-facing lives in `docchat-rag`.

mod content;
mod error;
mod model;

pub use content::{ChatTurn, GroundingDoc, Role};
pub use error::{ChatError, Result};
pub use model::{ChatEvent, ChatEventStream, ChatModel, ChatRequest, Citation};
