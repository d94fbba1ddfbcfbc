//! Mock chat model for tests.

use std::collections::VecDeque;

use async_trait::async_trait;
use futures::stream;
use tokio::sync::Mutex;

use docchat_core::{ChatEvent, ChatEventStream, ChatModel, ChatRequest, Result};

/// A scripted [`ChatModel`] for tests.
///
/// Pops one scripted response per call, streams it as word-granularity
/// [`ChatEvent::TextDelta`]s followed by [`ChatEvent::Done`], and records
/// every received [`ChatRequest`] so tests can assert on history
/// threading and grounding documents.
///
/// # Example
///
/// ```rust,ignore
/// use docchat_model::MockChatModel;
///
/// let model = MockChatModel::new(["Paris.", "The Eiffel Tower."]);
/// // ... drive the session ...
/// let requests = model.requests().await;
/// assert_eq!(requests.len(), 2);
/// ```
pub struct MockChatModel {
    responses: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockChatModel {
    /// Create a mock that replies with the given responses in order.
    ///
    /// Calls beyond the scripted responses reply with a fixed fallback.
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// All requests received so far, in call order.
    pub async fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    fn name(&self) -> &str {
        "mock"
    }

    async fn stream_chat(&self, request: ChatRequest) -> Result<ChatEventStream> {
        self.requests.lock().await.push(request);

        let response = self
            .responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| "I have no scripted answer.".to_string());

        let mut events: Vec<Result<ChatEvent>> = response
            .split_inclusive(' ')
            .map(|piece| Ok(ChatEvent::TextDelta(piece.to_string())))
            .collect();
        events.push(Ok(ChatEvent::Done));

        Ok(Box::pin(stream::iter(events)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn deltas_reassemble_into_the_scripted_response() {
        let model = MockChatModel::new(["Paris is the capital of France."]);
        let request = ChatRequest {
            message: "capital?".to_string(),
            history: Vec::new(),
            documents: Vec::new(),
        };

        let mut stream = model.stream_chat(request).await.unwrap();
        let mut text = String::new();
        let mut saw_done = false;
        while let Some(event) = stream.next().await {
            match event.unwrap() {
                ChatEvent::TextDelta(delta) => text.push_str(&delta),
                ChatEvent::Done => saw_done = true,
                _ => {}
            }
        }

        assert!(saw_done);
        assert_eq!(text, "Paris is the capital of France.");
        assert_eq!(model.requests().await.len(), 1);
    }
}
