//! Wire types for the Cohere v1 chat API.
//!
//! The streaming endpoint emits newline-delimited JSON events, each tagged
//! with an `event_type`. Only a subset of event kinds carries data the
//! engine consumes; everything else is ignored by [`to_events`].

use serde::{Deserialize, Serialize};

use docchat_core::{ChatError, ChatEvent, ChatRequest, Citation, Role};

/// Map an internal role to the service's chat-history vocabulary.
///
/// This is the single place internal roles meet the wire format.
pub(crate) fn service_role(role: Role) -> &'static str {
    match role {
        Role::User => "User",
        Role::Assistant => "Chatbot",
    }
}

/// Request body for `/v1/chat` with `stream: true`.
#[derive(Debug, Serialize)]
pub(crate) struct WireChatRequest<'a> {
    pub message: &'a str,
    pub model: &'a str,
    pub stream: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub documents: Vec<WireDocument<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub chat_history: Vec<WireTurn<'a>>,
}

/// A grounding document as the service expects it.
#[derive(Debug, Serialize)]
pub(crate) struct WireDocument<'a> {
    pub text: &'a str,
}

/// A translated conversation turn.
#[derive(Debug, Serialize)]
pub(crate) struct WireTurn<'a> {
    pub role: &'static str,
    pub message: &'a str,
}

/// Translate a [`ChatRequest`] into the service's request body.
pub(crate) fn to_wire_request<'a>(model: &'a str, request: &'a ChatRequest) -> WireChatRequest<'a> {
    WireChatRequest {
        message: &request.message,
        model,
        stream: true,
        documents: request.documents.iter().map(|d| WireDocument { text: &d.text }).collect(),
        chat_history: request
            .history
            .iter()
            .map(|turn| WireTurn { role: service_role(turn.role), message: &turn.content })
            .collect(),
    }
}

/// Error body shape returned on non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub message: String,
}

/// One newline-delimited event from the streaming chat endpoint.
#[derive(Debug, Deserialize)]
#[serde(tag = "event_type", rename_all = "kebab-case")]
pub(crate) enum StreamEvent {
    // Start/end markers carry fields (generation id, finish reason) the
    // engine does not consume; struct variants ignore them on parse.
    StreamStart {},
    TextGeneration {
        text: String,
    },
    SearchQueriesGeneration {
        search_queries: Vec<WireSearchQuery>,
    },
    CitationGeneration {
        citations: Vec<WireCitation>,
    },
    StreamEnd {},
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireSearchQuery {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireCitation {
    pub start: usize,
    pub end: usize,
    pub text: String,
    #[serde(default)]
    pub document_ids: Vec<String>,
}

/// Parse one raw stream line into zero or more [`ChatEvent`]s.
///
/// Blank lines and unrecognized event kinds produce no events; malformed
/// JSON is a stream error.
pub(crate) fn parse_line(line: &[u8]) -> Result<Vec<ChatEvent>, ChatError> {
    let line = std::str::from_utf8(line)
        .map_err(|e| stream_error(format!("non-UTF-8 stream data: {e}")))?
        .trim();
    if line.is_empty() {
        return Ok(Vec::new());
    }

    let event: StreamEvent = serde_json::from_str(line)
        .map_err(|e| stream_error(format!("malformed stream event: {e}")))?;
    Ok(to_events(event))
}

fn stream_error(message: String) -> ChatError {
    ChatError::Stream { provider: "Cohere".to_string(), message }
}

/// Map a wire event to the engine's typed events.
fn to_events(event: StreamEvent) -> Vec<ChatEvent> {
    match event {
        StreamEvent::TextGeneration { text } => vec![ChatEvent::TextDelta(text)],
        StreamEvent::SearchQueriesGeneration { search_queries } => {
            search_queries.into_iter().map(|q| ChatEvent::SearchQuery(q.text)).collect()
        }
        StreamEvent::CitationGeneration { citations } => citations
            .into_iter()
            .map(|c| {
                ChatEvent::Citation(Citation {
                    start: c.start,
                    end: c.end,
                    text: c.text,
                    document_ids: c.document_ids,
                })
            })
            .collect(),
        StreamEvent::StreamEnd {} => vec![ChatEvent::Done],
        StreamEvent::StreamStart {} | StreamEvent::Unknown => Vec::new(),
    }
}
