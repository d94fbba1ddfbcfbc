//! Cohere streaming chat client.
//!
//! This module is only available when the `cohere` feature is enabled.
//!
//! [`CohereChatModel`] calls `/v1/chat` with `stream: true` and turns the
//! newline-delimited JSON response body into a [`ChatEventStream`].
//! Dropping the stream closes the underlying connection, cancelling the
//! in-flight generation.

mod wire;

use async_stream::try_stream;
use async_trait::async_trait;
use futures::StreamExt;
use tracing::{debug, error};

use docchat_core::{ChatError, ChatEventStream, ChatModel, ChatRequest, Result};

/// The Cohere chat endpoint.
const COHERE_CHAT_URL: &str = "https://api.cohere.com/v1/chat";

/// Default generation model.
const DEFAULT_CHAT_MODEL: &str = "command-a-03-2025";

/// A [`ChatModel`] backed by the Cohere v1 chat API.
///
/// Conversation memory is provided by replaying the translated history on
/// every call; grounding documents are passed as `[{text}]` entries the
/// service can cite.
///
/// # Example
///
/// ```rust,ignore
/// use docchat_model::CohereChatModel;
///
/// let model = CohereChatModel::new("co-...")?;
/// let mut stream = model.stream_chat(request).await?;
/// while let Some(event) = stream.next().await {
///     // append TextDelta payloads as they arrive
/// }
/// ```
pub struct CohereChatModel {
    client: reqwest::Client,
    api_key: String,
    model: String,
    chat_url: String,
}

impl CohereChatModel {
    /// Create a new client with the given API key and default model.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(ChatError::Config("API key must not be empty".to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_CHAT_MODEL.to_string(),
            chat_url: COHERE_CHAT_URL.to_string(),
        })
    }

    /// Create a new client using the `COHERE_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("COHERE_API_KEY")
            .map_err(|_| ChatError::Config("COHERE_API_KEY environment variable not set".into()))?;
        Self::new(api_key)
    }

    /// Set the generation model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the client at a different API base URL (proxies, test servers).
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Self {
        self.chat_url = format!("{}/v1/chat", base_url.as_ref().trim_end_matches('/'));
        self
    }
}

#[async_trait]
impl ChatModel for CohereChatModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn stream_chat(&self, request: ChatRequest) -> Result<ChatEventStream> {
        let body = wire::to_wire_request(&self.model, &request);

        debug!(
            model = %self.model,
            history_turns = request.history.len(),
            documents = request.documents.len(),
            "opening chat stream"
        );

        let response = self
            .client
            .post(&self.chat_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "Cohere", error = %e, "chat request failed");
                ChatError::Model {
                    provider: "Cohere".to_string(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<wire::ApiErrorBody>(&body)
                .map(|e| e.message)
                .unwrap_or(body);

            error!(provider = "Cohere", %status, "chat API error");
            return Err(ChatError::Model {
                provider: "Cohere".to_string(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let mut bytes = response.bytes_stream();

        let stream = try_stream! {
            let mut buffer: Vec<u8> = Vec::new();

            while let Some(chunk) = bytes.next().await {
                let chunk = chunk.map_err(|e| ChatError::Stream {
                    provider: "Cohere".to_string(),
                    message: format!("transport error: {e}"),
                })?;
                buffer.extend_from_slice(&chunk);

                while let Some(newline) = buffer.iter().position(|b| *b == b'\n') {
                    let line: Vec<u8> = buffer.drain(..=newline).collect();
                    for event in wire::parse_line(&line)? {
                        yield event;
                    }
                }
            }

            // A final event may arrive without a trailing newline.
            if !buffer.is_empty() {
                for event in wire::parse_line(&buffer)? {
                    yield event;
                }
            }
        };

        Ok(Box::pin(stream))
    }
}
