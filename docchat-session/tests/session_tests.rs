//! End-to-end session tests over the mock generation model and a
//! deterministic keyword embedder.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;

use docchat_core::{ChatError, ChatEvent, ChatEventStream, ChatModel, ChatRequest, Role};
use docchat_model::MockChatModel;
use docchat_rag::{
    EmbedRole, EmbeddingProvider, InMemoryVectorIndex, PassthroughReranker, RetrievalConfig,
    RetrievalPipeline,
};
use docchat_session::{ConversationSession, SessionError, UploadWarning};

/// Embeds text as keyword-count vectors over a fixed vocabulary, with a
/// constant tail component so no vector is zero.
struct KeywordEmbedder {
    vocab: Vec<&'static str>,
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(
        &self,
        texts: &[&str],
        _role: EmbedRole,
    ) -> docchat_rag::Result<Vec<Vec<f32>>> {
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

/// Streams one delta and then fails, without ever completing.
struct BrokenChatModel;

#[async_trait]
impl ChatModel for BrokenChatModel {
    fn name(&self) -> &str {
        "broken"
    }

    async fn stream_chat(&self, _request: ChatRequest) -> docchat_core::Result<ChatEventStream> {
        let events: Vec<docchat_core::Result<ChatEvent>> = vec![
            Ok(ChatEvent::TextDelta("partial ".to_string())),
            Err(ChatError::Stream {
                provider: "broken".to_string(),
                message: "connection reset".to_string(),
            }),
        ];
        Ok(Box::pin(futures::stream::iter(events)))
    }
}

fn session_with(model: Arc<dyn ChatModel>) -> ConversationSession {
    let pipeline = RetrievalPipeline::builder()
        .config(RetrievalConfig::builder().chunk_size(1000).chunk_overlap(100).build().unwrap())
        .embedder(Arc::new(KeywordEmbedder {
            vocab: vec!["paris", "eiffel", "capital", "france"],
        }))
        .index(Arc::new(InMemoryVectorIndex::new()))
        .reranker(Arc::new(PassthroughReranker))
        .build()
        .unwrap();

    ConversationSession::builder().model(model).pipeline(pipeline).build().unwrap()
}

/// Drain a reply's delta stream to completion, returning the full text.
async fn drain(reply: docchat_session::AskReply) -> String {
    let mut deltas = reply.deltas;
    let mut text = String::new();
    while let Some(delta) = deltas.next().await {
        text.push_str(&delta.unwrap());
    }
    text
}

const PARIS: &str = "Paris is the capital of France. It is known for the Eiffel Tower.";

#[tokio::test]
async fn upload_then_ask_grounds_the_answer() {
    let model = Arc::new(MockChatModel::new(["Paris is known for the Eiffel Tower."]));
    let mut session = session_with(model.clone());

    let report = session.upload(PARIS.as_bytes(), "paris.txt").await.unwrap();
    assert_eq!(report.chunks_indexed, 1);
    assert!(report.warning.is_none());
    assert!(session.is_ready());
    assert!(session.conversation_id().is_some());

    let reply = session.ask("What is Paris known for?").await.unwrap();
    assert!(!reply.documents.is_empty());
    assert!(reply.documents[0].text.contains("Eiffel Tower"));

    let answer = drain(reply).await;
    assert_eq!(answer, "Paris is known for the Eiffel Tower.");

    // The model received the retrieved chunk as grounding.
    let requests = model.requests().await;
    assert_eq!(requests.len(), 1);
    assert!(requests[0].documents.iter().any(|d| d.text.contains("Eiffel Tower")));

    // The completed turn is committed: greeting, user, assistant.
    let history = session.history().await;
    assert_eq!(history.len(), 3);
    assert_eq!(history[1].role, Role::User);
    assert_eq!(history[1].content, "What is Paris known for?");
    assert_eq!(history[2].role, Role::Assistant);
    assert_eq!(history[2].content, "Paris is known for the Eiffel Tower.");
}

#[tokio::test]
async fn ask_before_upload_is_not_ready_and_leaves_no_trace() {
    let mut session = session_with(Arc::new(MockChatModel::new(["unused"])));

    let err = session.ask("anything").await.unwrap_err();
    assert!(matches!(err, SessionError::NotReady));
    assert!(session.history().await.is_empty());
    assert!(!session.is_ready());
}

#[tokio::test]
async fn second_ask_replays_the_full_history() {
    let model = Arc::new(MockChatModel::new([
        "The capital of France is Paris.",
        "It is known for the Eiffel Tower.",
    ]));
    let mut session = session_with(model.clone());
    session.upload(PARIS.as_bytes(), "paris.txt").await.unwrap();

    let first = session.ask("What is the capital of France?").await.unwrap();
    assert_eq!(drain(first).await, "The capital of France is Paris.");

    let second = session.ask("What is it known for?").await.unwrap();
    assert_eq!(drain(second).await, "It is known for the Eiffel Tower.");

    // The second request carried the whole conversation so far, in order:
    // greeting, first question, first answer, and the pending question.
    let requests = model.requests().await;
    let history = &requests[1].history;
    assert_eq!(history.len(), 4);
    assert_eq!(history[0].role, Role::Assistant);
    assert_eq!(history[1].content, "What is the capital of France?");
    assert_eq!(history[2].content, "The capital of France is Paris.");
    assert_eq!(history[3].content, "What is it known for?");
}

#[tokio::test]
async fn empty_document_warns_but_stays_usable() {
    let model = Arc::new(MockChatModel::new(["I have no document to draw on."]));
    let mut session = session_with(model.clone());

    let report = session.upload(b"", "empty.txt").await.unwrap();
    assert_eq!(report.chunks_indexed, 0);
    assert_eq!(report.warning, Some(UploadWarning::EmptyDocument));
    assert!(session.is_ready());

    // Queries against the empty index return no grounding documents but
    // still stream an answer.
    let reply = session.ask("what does it say?").await.unwrap();
    assert!(reply.documents.is_empty());
    let answer = drain(reply).await;
    assert_eq!(answer, "I have no document to draw on.");

    let requests = model.requests().await;
    assert!(requests[0].documents.is_empty());
}

#[tokio::test]
async fn dropping_the_stream_discards_the_partial_turn() {
    let model = Arc::new(MockChatModel::new(["one two three four"]));
    let mut session = session_with(model);
    session.upload(PARIS.as_bytes(), "paris.txt").await.unwrap();

    let mut reply = session.ask("What is Paris known for?").await.unwrap();
    let first = reply.deltas.next().await.unwrap().unwrap();
    assert_eq!(first, "one ");
    drop(reply);

    // Neither the user turn nor the partial answer reached history.
    let history = session.history().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].role, Role::Assistant);
}

#[tokio::test]
async fn mid_stream_failure_leaves_history_unchanged() {
    let mut session = session_with(Arc::new(BrokenChatModel));
    session.upload(PARIS.as_bytes(), "paris.txt").await.unwrap();

    let mut reply = session.ask("What is Paris known for?").await.unwrap();
    let first = reply.deltas.next().await.unwrap().unwrap();
    assert_eq!(first, "partial ");
    let err = reply.deltas.next().await.unwrap().unwrap_err();
    assert!(matches!(err, ChatError::Stream { .. }));

    assert!(session.is_ready());
    assert_eq!(session.history().await.len(), 1);
}

#[tokio::test]
async fn failed_upload_leaves_the_session_uninitialized() {
    let mut session = session_with(Arc::new(MockChatModel::new(["unused"])));
    session.upload(PARIS.as_bytes(), "paris.txt").await.unwrap();
    assert!(session.is_ready());

    // Invalid UTF-8 fails extraction; the previous document must not keep
    // answering.
    let err = session.upload(&[0xff, 0xfe], "broken.bin").await.unwrap_err();
    assert!(matches!(err, SessionError::Extraction(_)));
    assert!(!session.is_ready());

    let err = session.ask("still there?").await.unwrap_err();
    assert!(matches!(err, SessionError::NotReady));
}

#[tokio::test]
async fn re_upload_resets_history_and_index() {
    let model = Arc::new(MockChatModel::new(["About Paris.", "About France."]));
    let mut session = session_with(model);

    session.upload(PARIS.as_bytes(), "paris.txt").await.unwrap();
    let reply = session.ask("What is Paris known for?").await.unwrap();
    drain(reply).await;
    assert_eq!(session.history().await.len(), 3);

    let second_doc = "France is a country in Europe.";
    let report = session.upload(second_doc.as_bytes(), "france.txt").await.unwrap();
    assert_eq!(report.document_name, "france.txt");
    assert_eq!(session.document_name(), Some("france.txt"));

    // Fresh conversation: only the new greeting remains.
    let history = session.history().await;
    assert_eq!(history.len(), 1);
    assert!(history[0].content.contains("france.txt"));

    // The old document's chunks are gone from the index.
    let reply = session.ask("Tell me about france").await.unwrap();
    assert!(reply.documents.iter().all(|d| !d.text.contains("Eiffel")));
    assert!(reply.documents.iter().any(|d| d.text.contains("country in Europe")));
    drain(reply).await;
}
