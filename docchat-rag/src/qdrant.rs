//! Qdrant vector index backend.
//!
//! Provides [`QdrantVectorIndex`] which implements [`VectorIndex`] using
//! the [qdrant-client](https://docs.rs/qdrant-client) crate over gRPC.
//! Only available when the `qdrant` feature is enabled.
//!
//! # Example
//!
//! ```rust,ignore
//! use docchat_rag::qdrant::QdrantVectorIndex;
//!
//! let index = QdrantVectorIndex::new("http://localhost:6334", "docchat")?;
//! index.upsert(entries).await?;
//! let hits = index.query(&query_vector, 10).await?;
//! ```

use async_trait::async_trait;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointId, PointStruct, SearchPointsBuilder,
    UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use tokio::sync::RwLock;
use tracing::debug;

use crate::document::{EntryMetadata, IndexEntry, SearchHit};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorIndex;

/// A [`VectorIndex`] backed by [Qdrant](https://qdrant.tech/).
///
/// The collection is created lazily (create-if-absent, cosine distance)
/// by the first non-empty upsert, which also fixes the index
/// dimensionality. Entry metadata travels as Qdrant payload; entry ids
/// with a decimal form become numeric point ids.
pub struct QdrantVectorIndex {
    client: Qdrant,
    collection: String,
    dimensions: RwLock<Option<usize>>,
}

impl QdrantVectorIndex {
    /// Create a new index connecting to the given URL.
    pub fn new(url: &str, collection: impl Into<String>) -> Result<Self> {
        let client = Qdrant::from_url(url).build().map_err(Self::map_err)?;
        Ok(Self::from_client(client, collection))
    }

    /// Create a new index from an existing client.
    pub fn from_client(client: Qdrant, collection: impl Into<String>) -> Self {
        Self { client, collection: collection.into(), dimensions: RwLock::new(None) }
    }

    fn map_err(e: qdrant_client::QdrantError) -> RagError {
        RagError::VectorIndex { backend: "qdrant".to_string(), message: e.to_string() }
    }

    /// Create the collection if it does not exist yet.
    async fn ensure_collection(&self, dimensions: usize) -> Result<()> {
        let collections = self.client.list_collections().await.map_err(Self::map_err)?;
        if collections.collections.iter().any(|c| c.name == self.collection) {
            debug!(collection = %self.collection, "qdrant collection already exists");
            return Ok(());
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection).vectors_config(
                    VectorParamsBuilder::new(dimensions as u64, Distance::Cosine),
                ),
            )
            .await
            .map_err(Self::map_err)?;

        debug!(collection = %self.collection, dimensions, "created qdrant collection");
        Ok(())
    }

    /// Extract a string from a Qdrant payload value.
    fn extract_string(value: &QdrantValue) -> Option<String> {
        match &value.kind {
            Some(Kind::StringValue(s)) => Some(s.clone()),
            _ => None,
        }
    }

    /// Extract an integer from a Qdrant payload value.
    fn extract_integer(value: &QdrantValue) -> Option<i64> {
        match &value.kind {
            Some(Kind::IntegerValue(n)) => Some(*n),
            _ => None,
        }
    }
}

#[async_trait]
impl VectorIndex for QdrantVectorIndex {
    async fn upsert(&self, entries: Vec<IndexEntry>) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut dimensions = self.dimensions.write().await;
        let want = dimensions.unwrap_or(entries[0].vector.len());
        for entry in &entries {
            if entry.vector.len() != want {
                return Err(RagError::DimensionMismatch { got: entry.vector.len(), want });
            }
        }
        if dimensions.is_none() {
            self.ensure_collection(want).await?;
            *dimensions = Some(want);
        }

        let count = entries.len();
        let points: Vec<PointStruct> = entries
            .into_iter()
            .map(|entry| {
                let payload = Payload::try_from(serde_json::json!({
                    "text": entry.metadata.text,
                    "source_order": entry.metadata.source_order,
                }))
                .unwrap_or_default();

                let id: PointId = match entry.id.parse::<u64>() {
                    Ok(n) => n.into(),
                    Err(_) => entry.id.into(),
                };

                PointStruct::new(id, entry.vector, payload)
            })
            .collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await
            .map_err(Self::map_err)?;

        debug!(collection = %self.collection, count, "upserted entries to qdrant");
        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<SearchHit>> {
        let Some(want) = *self.dimensions.read().await else {
            return Ok(Vec::new());
        };
        if vector.len() != want {
            return Err(RagError::DimensionMismatch { got: vector.len(), want });
        }

        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, vector.to_vec(), top_k as u64)
                    .with_payload(true),
            )
            .await
            .map_err(Self::map_err)?;

        let hits = response
            .result
            .into_iter()
            .map(|scored| {
                let id = scored
                    .id
                    .as_ref()
                    .and_then(|pid| match &pid.point_id_options {
                        Some(PointIdOptions::Uuid(s)) => Some(s.clone()),
                        Some(PointIdOptions::Num(n)) => Some(n.to_string()),
                        None => None,
                    })
                    .unwrap_or_default();

                let text = scored
                    .payload
                    .get("text")
                    .and_then(Self::extract_string)
                    .unwrap_or_default();
                let source_order = scored
                    .payload
                    .get("source_order")
                    .and_then(Self::extract_integer)
                    .unwrap_or_default() as usize;

                SearchHit {
                    id,
                    score: scored.score,
                    metadata: EntryMetadata { text, source_order },
                }
            })
            .collect();

        Ok(hits)
    }

    async fn reset(&self) -> Result<()> {
        let mut dimensions = self.dimensions.write().await;

        let collections = self.client.list_collections().await.map_err(Self::map_err)?;
        if collections.collections.iter().any(|c| c.name == self.collection) {
            self.client.delete_collection(&self.collection).await.map_err(Self::map_err)?;
            debug!(collection = %self.collection, "deleted qdrant collection");
        }

        *dimensions = None;
        Ok(())
    }
}
