//! End-to-end pipeline tests with deterministic fakes in place of the
//! hosted embedding and rerank services.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use docchat_rag::{
    EmbedRole, EmbeddingProvider, InMemoryVectorIndex, PassthroughReranker, RagError,
    RankedIndex, Reranker, RetrievalConfig, RetrievalPipeline, VectorIndex,
};

/// Embeds text as keyword-count vectors over a fixed vocabulary, with a
/// small constant tail component so no vector is zero. Deterministic and
/// role-independent, but records the roles it was called with.
struct KeywordEmbedder {
    vocab: Vec<&'static str>,
    roles_seen: Mutex<Vec<EmbedRole>>,
}

impl KeywordEmbedder {
    fn new(vocab: Vec<&'static str>) -> Self {
        Self { vocab, roles_seen: Mutex::new(Vec::new()) }
    }
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(
        &self,
        texts: &[&str],
        role: EmbedRole,
    ) -> docchat_rag::Result<Vec<Vec<f32>>> {
        self.roles_seen.lock().await.push(role);
        Ok(texts
            .iter()
            .map(|text| {
                let lower = text.to_lowercase();
                let mut vector: Vec<f32> = self
                    .vocab
                    .iter()
                    .map(|word| lower.matches(word).count() as f32)
                    .collect();
                vector.push(0.1);
                vector
            })
            .collect())
    }
}

/// Always fails, simulating an embedding service outage.
struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _: &[&str], _: EmbedRole) -> docchat_rag::Result<Vec<Vec<f32>>> {
        Err(RagError::Embedding { provider: "fake".into(), message: "quota exhausted".into() })
    }
}

/// Returns a fixed list of candidate positions regardless of the query.
struct FixedOrderReranker {
    order: Vec<usize>,
}

#[async_trait]
impl Reranker for FixedOrderReranker {
    async fn rerank(
        &self,
        _query: &str,
        _candidates: &[&str],
        top_n: usize,
    ) -> docchat_rag::Result<Vec<RankedIndex>> {
        Ok(self
            .order
            .iter()
            .take(top_n)
            .enumerate()
            .map(|(i, &index)| RankedIndex { index, relevance_score: 1.0 - i as f32 * 0.1 })
            .collect())
    }
}

fn pipeline_with(
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    reranker: Arc<dyn Reranker>,
    config: RetrievalConfig,
) -> RetrievalPipeline {
    RetrievalPipeline::builder()
        .config(config)
        .embedder(embedder)
        .index(index)
        .reranker(reranker)
        .build()
        .unwrap()
}

#[tokio::test]
async fn ingest_then_query_retrieves_the_relevant_chunk() {
    let embedder = Arc::new(KeywordEmbedder::new(vec!["paris", "eiffel", "rust", "cargo"]));
    let pipeline = pipeline_with(
        embedder.clone(),
        Arc::new(InMemoryVectorIndex::new()),
        Arc::new(PassthroughReranker),
        RetrievalConfig::builder().chunk_size(60).chunk_overlap(0).build().unwrap(),
    );

    let text = "Paris is known for the Eiffel Tower and fine food.\n\n\
                Rust projects are built with cargo and a manifest file.";
    let stats = pipeline.ingest(text).await.unwrap();
    assert_eq!(stats.chunks_indexed, 2);

    let documents = pipeline.query("tell me about the Eiffel Tower in Paris").await.unwrap();
    assert!(!documents.is_empty());
    assert!(documents[0].text.contains("Eiffel Tower"));
    assert_eq!(documents[0].rank, 0);

    // Ingestion embedded with the document role, the query with the query role.
    let roles = embedder.roles_seen.lock().await.clone();
    assert_eq!(roles, vec![EmbedRole::Document, EmbedRole::Query]);
}

#[tokio::test]
async fn rerank_results_map_back_by_index() {
    let embedder = Arc::new(KeywordEmbedder::new(vec!["alpha", "beta", "gamma"]));
    // The reranker promotes the third coarse candidate, then the first.
    let pipeline = pipeline_with(
        embedder,
        Arc::new(InMemoryVectorIndex::new()),
        Arc::new(FixedOrderReranker { order: vec![2, 0] }),
        RetrievalConfig::builder().chunk_size(30).chunk_overlap(0).build().unwrap(),
    );

    let text = "alpha one two three four.\n\nbeta one two three four.\n\ngamma one two three.";
    pipeline.ingest(text).await.unwrap();

    // The query matches alpha most, then beta, then gamma, fixing the
    // coarse candidate order.
    let documents = pipeline.query("alpha alpha beta").await.unwrap();
    assert_eq!(documents.len(), 2);
    assert!(documents[0].text.contains("gamma"));
    assert!(documents[1].text.contains("alpha"));
    assert!(documents[0].relevance_score >= documents[1].relevance_score);
    assert_eq!(documents[0].rank, 0);
    assert_eq!(documents[1].rank, 1);
}

#[tokio::test]
async fn duplicate_chunk_texts_survive_reranking() {
    let embedder = Arc::new(KeywordEmbedder::new(vec!["repeat"]));
    let pipeline = pipeline_with(
        embedder,
        Arc::new(InMemoryVectorIndex::new()),
        Arc::new(FixedOrderReranker { order: vec![1, 0, 2] }),
        RetrievalConfig::builder().chunk_size(30).chunk_overlap(0).build().unwrap(),
    );

    // Identical paragraphs produce identical candidate texts.
    let text = "repeat this phrase please.\n\nrepeat this phrase please.\n\nrepeat this phrase please.";
    let stats = pipeline.ingest(text).await.unwrap();
    assert_eq!(stats.chunks_indexed, 3);

    let documents = pipeline.query("repeat").await.unwrap();
    assert_eq!(documents.len(), 3);
    for (rank, doc) in documents.iter().enumerate() {
        assert_eq!(doc.rank, rank);
        assert!(doc.text.contains("repeat"));
    }
}

#[tokio::test]
async fn out_of_range_rerank_index_is_a_pipeline_error() {
    let embedder = Arc::new(KeywordEmbedder::new(vec!["solo"]));
    let pipeline = pipeline_with(
        embedder,
        Arc::new(InMemoryVectorIndex::new()),
        Arc::new(FixedOrderReranker { order: vec![7] }),
        RetrievalConfig::default(),
    );

    pipeline.ingest("solo chunk").await.unwrap();
    let err = pipeline.query("solo").await.unwrap_err();
    assert!(matches!(err, RagError::Pipeline(_)));
}

#[tokio::test]
async fn empty_document_leaves_index_empty_and_queries_degrade() {
    let embedder = Arc::new(KeywordEmbedder::new(vec!["anything"]));
    let pipeline = pipeline_with(
        embedder,
        Arc::new(InMemoryVectorIndex::new()),
        Arc::new(PassthroughReranker),
        RetrievalConfig::default(),
    );

    let stats = pipeline.ingest("").await.unwrap();
    assert_eq!(stats.chunks_indexed, 0);

    let documents = pipeline.query("anything").await.unwrap();
    assert!(documents.is_empty());
}

#[tokio::test]
async fn embedding_failure_aborts_ingest_without_partial_state() {
    let index = Arc::new(InMemoryVectorIndex::new());

    let failing = pipeline_with(
        Arc::new(FailingEmbedder),
        index.clone(),
        Arc::new(PassthroughReranker),
        RetrievalConfig::default(),
    );
    let err = failing.ingest("some document text").await.unwrap_err();
    assert!(matches!(err, RagError::Embedding { .. }));

    // Nothing was committed: a working pipeline over the same index still
    // sees it empty.
    let working = pipeline_with(
        Arc::new(KeywordEmbedder::new(vec!["some"])),
        index,
        Arc::new(PassthroughReranker),
        RetrievalConfig::default(),
    );
    let documents = working.query("some").await.unwrap();
    assert!(documents.is_empty());
}

#[tokio::test]
async fn reset_clears_previous_document() {
    let embedder = Arc::new(KeywordEmbedder::new(vec!["first", "second"]));
    let pipeline = pipeline_with(
        embedder,
        Arc::new(InMemoryVectorIndex::new()),
        Arc::new(PassthroughReranker),
        RetrievalConfig::default(),
    );

    pipeline.ingest("first document contents").await.unwrap();
    pipeline.reset().await.unwrap();
    pipeline.ingest("second document contents").await.unwrap();

    let documents = pipeline.query("first").await.unwrap();
    assert_eq!(documents.len(), 1);
    assert!(documents[0].text.contains("second"));
}
