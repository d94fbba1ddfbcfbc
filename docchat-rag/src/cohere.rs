//! Cohere embedding and rerank providers.
//!
//! This module is only available when the `cohere` feature is enabled.
//! Both providers call the Cohere v1 REST API directly with `reqwest`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::{EmbedRole, EmbeddingProvider};
use crate::error::{RagError, Result};
use crate::reranker::{RankedIndex, Reranker};

/// The Cohere embeddings endpoint.
const COHERE_EMBED_URL: &str = "https://api.cohere.com/v1/embed";

/// The Cohere rerank endpoint.
const COHERE_RERANK_URL: &str = "https://api.cohere.com/v1/rerank";

/// Default embedding model.
const DEFAULT_EMBED_MODEL: &str = "embed-multilingual-v3.0";

/// Default rerank model.
const DEFAULT_RERANK_MODEL: &str = "rerank-v3.5";

/// Maximum texts per embedding request accepted by the service.
const DEFAULT_EMBED_BATCH: usize = 90;

/// Map an [`EmbedRole`] to the service's `input_type` value.
fn input_type(role: EmbedRole) -> &'static str {
    match role {
        EmbedRole::Query => "search_query",
        EmbedRole::Document => "search_document",
    }
}

/// Extract a readable detail string from a non-2xx Cohere response.
async fn error_detail(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let detail =
        serde_json::from_str::<ApiErrorBody>(&body).map(|e| e.message).unwrap_or(body);
    format!("API returned {status}: {detail}")
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

// ── Embedding provider ─────────────────────────────────────────────

/// An [`EmbeddingProvider`] backed by the Cohere embed API.
///
/// Inputs are partitioned into batches of at most 90 texts; batches are
/// issued serially and the results concatenated in input order. Any batch
/// failure fails the whole call, so partial embedding sets never reach
/// the index.
///
/// # Example
///
/// ```rust,ignore
/// use docchat_rag::cohere::CohereEmbeddingProvider;
///
/// let provider = CohereEmbeddingProvider::new("co-...")?;
/// let vectors = provider.embed(&["hello"], EmbedRole::Query).await?;
/// ```
pub struct CohereEmbeddingProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    batch_size: usize,
}

impl CohereEmbeddingProvider {
    /// Create a new provider with the given API key and default model.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::Embedding {
                provider: "Cohere".into(),
                message: "API key must not be empty".into(),
            });
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_EMBED_MODEL.into(),
            batch_size: DEFAULT_EMBED_BATCH,
        })
    }

    /// Create a new provider using the `COHERE_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("COHERE_API_KEY").map_err(|_| RagError::Embedding {
            provider: "Cohere".into(),
            message: "COHERE_API_KEY environment variable not set".into(),
        })?;
        Self::new(api_key)
    }

    /// Set the embedding model (e.g. `embed-english-v3.0`).
    ///
    /// The same model must serve both ingestion and queries; mixing models
    /// silently degrades retrieval.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the per-request batch size (clamped to at least 1).
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    texts: &'a [&'a str],
    model: &'a str,
    input_type: &'static str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[async_trait]
impl EmbeddingProvider for CohereEmbeddingProvider {
    async fn embed(&self, texts: &[&str], role: EmbedRole) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            provider = "Cohere",
            total = texts.len(),
            batch_size = self.batch_size,
            model = %self.model,
            input_type = input_type(role),
            "embedding texts"
        );

        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let request_body =
                EmbedRequest { texts: batch, model: &self.model, input_type: input_type(role) };

            let response = self
                .client
                .post(COHERE_EMBED_URL)
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await
                .map_err(|e| {
                    error!(provider = "Cohere", error = %e, "embed request failed");
                    RagError::Embedding {
                        provider: "Cohere".into(),
                        message: format!("request failed: {e}"),
                    }
                })?;

            if !response.status().is_success() {
                let message = error_detail(response).await;
                error!(provider = "Cohere", message, "embed API error");
                return Err(RagError::Embedding { provider: "Cohere".into(), message });
            }

            let parsed: EmbedResponse = response.json().await.map_err(|e| {
                error!(provider = "Cohere", error = %e, "failed to parse embed response");
                RagError::Embedding {
                    provider: "Cohere".into(),
                    message: format!("failed to parse response: {e}"),
                }
            })?;

            if parsed.embeddings.len() != batch.len() {
                return Err(RagError::Embedding {
                    provider: "Cohere".into(),
                    message: format!(
                        "expected {} embeddings, got {}",
                        batch.len(),
                        parsed.embeddings.len()
                    ),
                });
            }

            vectors.extend(parsed.embeddings);
        }

        Ok(vectors)
    }
}

// ── Rerank provider ────────────────────────────────────────────────

/// A [`Reranker`] backed by the Cohere rerank API.
///
/// Returns candidate positions with relevance scores, descending,
/// truncated to `top_n`.
pub struct CohereReranker {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl CohereReranker {
    /// Create a new reranker with the given API key and default model.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::Rerank {
                provider: "Cohere".into(),
                message: "API key must not be empty".into(),
            });
        }

        Ok(Self { client: reqwest::Client::new(), api_key, model: DEFAULT_RERANK_MODEL.into() })
    }

    /// Create a new reranker using the `COHERE_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("COHERE_API_KEY").map_err(|_| RagError::Rerank {
            provider: "Cohere".into(),
            message: "COHERE_API_KEY environment variable not set".into(),
        })?;
        Self::new(api_key)
    }

    /// Set the rerank model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[derive(Serialize)]
struct RerankRequest<'a> {
    model: &'a str,
    query: &'a str,
    documents: &'a [&'a str],
    top_n: usize,
}

#[derive(Deserialize)]
struct RerankResponse {
    results: Vec<RerankResult>,
}

#[derive(Deserialize)]
struct RerankResult {
    index: usize,
    relevance_score: f32,
}

#[async_trait]
impl Reranker for CohereReranker {
    async fn rerank(
        &self,
        query: &str,
        candidates: &[&str],
        top_n: usize,
    ) -> Result<Vec<RankedIndex>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            provider = "Cohere",
            candidates = candidates.len(),
            top_n,
            model = %self.model,
            "reranking candidates"
        );

        let request_body =
            RerankRequest { model: &self.model, query, documents: candidates, top_n };

        let response = self
            .client
            .post(COHERE_RERANK_URL)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "Cohere", error = %e, "rerank request failed");
                RagError::Rerank {
                    provider: "Cohere".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let message = error_detail(response).await;
            error!(provider = "Cohere", message, "rerank API error");
            return Err(RagError::Rerank { provider: "Cohere".into(), message });
        }

        let parsed: RerankResponse = response.json().await.map_err(|e| {
            error!(provider = "Cohere", error = %e, "failed to parse rerank response");
            RagError::Rerank {
                provider: "Cohere".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        Ok(parsed
            .results
            .into_iter()
            .map(|r| RankedIndex { index: r.index, relevance_score: r.relevance_score })
            .collect())
    }
}
