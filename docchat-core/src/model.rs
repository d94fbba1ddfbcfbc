//! The generation-service abstraction.
//!
//! A [`ChatModel`] turns a [`ChatRequest`] into an ordered stream of
//! [`ChatEvent`]s. Only [`ChatEvent::TextDelta`] events carry visible
//! transcript text; the other kinds expose retrieval and citation
//! metadata for callers that want it.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::content::{ChatTurn, GroundingDoc};
use crate::error::Result;

/// A request to the generation service.
///
/// `history` is the full prior transcript in original order, including the
/// turn being asked; replaying it on every call is the sole mechanism
/// providing multi-turn memory.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// The current user message.
    pub message: String,
    /// Prior conversation turns, oldest first.
    pub history: Vec<ChatTurn>,
    /// Retrieved chunks grounding the response.
    pub documents: Vec<GroundingDoc>,
}

/// A span of generated text attributed to grounding documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Start offset into the generated text.
    pub start: usize,
    /// End offset into the generated text.
    pub end: usize,
    /// The cited span of generated text.
    pub text: String,
    /// Identifiers of the grounding documents backing the span.
    pub document_ids: Vec<String>,
}

/// One event in a streaming generation response.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    /// An appendable fragment of generated text, in arrival order.
    TextDelta(String),
    /// A search query the service derived from the conversation.
    SearchQuery(String),
    /// A citation attributing generated text to grounding documents.
    Citation(Citation),
    /// The stream completed normally. No events follow.
    Done,
}

/// A pinned, boxed stream of generation events.
pub type ChatEventStream = Pin<Box<dyn Stream<Item = Result<ChatEvent>> + Send>>;

/// A streaming text-generation backend.
///
/// Implementations wrap a concrete service (Cohere, a mock, ...) behind a
/// unified async interface. Event order in the returned stream is the
/// order the service produced them; consumers must not reorder deltas.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// The model identifier, for logging and display.
    fn name(&self) -> &str;

    /// Open a streaming generation call.
    ///
    /// Dropping the returned stream cancels the in-flight call without
    /// side effects.
    async fn stream_chat(&self, request: ChatRequest) -> Result<ChatEventStream>;
}
