//! The conversational session state machine.
//!
//! A [`ConversationSession`] owns one document's retrieval pipeline and
//! conversation history. [`upload`](ConversationSession::upload) ingests a
//! document (resetting any previous one); [`ask`](ConversationSession::ask)
//! retrieves grounding chunks and opens a streaming generation call whose
//! text deltas the caller renders incrementally.
//!
//! History commits are transactional: the user turn and the assistant turn
//! are appended together when the generation stream completes. Dropping
//! the delta stream mid-flight (cancellation) or a mid-stream error
//! discards the partial transcript without touching history.

use std::pin::Pin;
use std::sync::Arc;

use async_stream::try_stream;
use futures::{Stream, StreamExt};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use docchat_core::{ChatError, ChatEvent, ChatModel, ChatRequest, ChatTurn, GroundingDoc};
use docchat_rag::{RetrievalPipeline, RetrievedDocument};

use crate::error::{Result, SessionError};
use crate::extract::{TextExtractor, Utf8TextExtractor};

/// Outcome of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    /// The uploaded document's display name.
    pub document_name: String,
    /// Number of chunks embedded and indexed.
    pub chunks_indexed: usize,
    /// Non-fatal condition the caller should surface, if any.
    pub warning: Option<UploadWarning>,
}

/// Non-fatal upload conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadWarning {
    /// The document yielded zero chunks; the index is empty and every
    /// query will return an empty retrieval set.
    EmptyDocument,
}

/// A pinned, boxed stream of generated text deltas.
pub type TextDeltaStream =
    Pin<Box<dyn Stream<Item = std::result::Result<String, ChatError>> + Send>>;

/// Response to one [`ask`](ConversationSession::ask) call.
pub struct AskReply {
    /// The reranked grounding documents used for this turn, most relevant
    /// first.
    pub documents: Vec<RetrievedDocument>,
    /// Generated text deltas in arrival order. Consume to completion to
    /// commit the turn to history; drop to cancel.
    pub deltas: TextDeltaStream,
}

impl std::fmt::Debug for AskReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AskReply")
            .field("documents", &self.documents)
            .field("deltas", &"<TextDeltaStream>")
            .finish()
    }
}

enum SessionState {
    Uninitialized,
    Ready(ActiveDocument),
}

struct ActiveDocument {
    document_name: String,
    conversation_id: String,
    history: Arc<Mutex<Vec<ChatTurn>>>,
}

/// Greeting turn seeded into a fresh conversation.
fn greeting(document_name: &str) -> String {
    format!("Document '{document_name}' processed successfully! Ask your first question.")
}

/// A conversational QA session over a single uploaded document.
///
/// The session moves between two states: `Uninitialized` (no document;
/// [`ask`](ConversationSession::ask) fails with
/// [`SessionError::NotReady`]) and `Ready` (a document is indexed and a
/// conversation is open). A new upload discards the previous document,
/// history, and index before re-ingesting.
///
/// Operations are not safe to overlap: finish or drop an in-flight ask
/// before starting another upload.
///
/// # Example
///
/// ```rust,ignore
/// use docchat_session::ConversationSession;
///
/// let mut session = ConversationSession::builder()
///     .model(model)
///     .pipeline(pipeline)
///     .build()?;
///
/// session.upload(&bytes, "report.txt").await?;
/// let mut reply = session.ask("What does the report conclude?").await?;
/// while let Some(delta) = reply.deltas.next().await {
///     print!("{}", delta?);
/// }
/// ```
pub struct ConversationSession {
    extractor: Arc<dyn TextExtractor>,
    model: Arc<dyn ChatModel>,
    pipeline: RetrievalPipeline,
    state: SessionState,
}

impl ConversationSession {
    /// Create a new [`SessionBuilder`].
    pub fn builder() -> SessionBuilder {
        SessionBuilder::default()
    }

    /// Whether a document has been ingested and questions can be asked.
    pub fn is_ready(&self) -> bool {
        matches!(self.state, SessionState::Ready(_))
    }

    /// The active document's name, if any.
    pub fn document_name(&self) -> Option<&str> {
        match &self.state {
            SessionState::Ready(active) => Some(&active.document_name),
            SessionState::Uninitialized => None,
        }
    }

    /// The active conversation's correlation id, if any.
    pub fn conversation_id(&self) -> Option<&str> {
        match &self.state {
            SessionState::Ready(active) => Some(&active.conversation_id),
            SessionState::Uninitialized => None,
        }
    }

    /// A snapshot of the conversation history for rendering.
    pub async fn history(&self) -> Vec<ChatTurn> {
        match &self.state {
            SessionState::Ready(active) => active.history.lock().await.clone(),
            SessionState::Uninitialized => Vec::new(),
        }
    }

    /// Ingest a document, replacing any previously uploaded one.
    ///
    /// Tears down the session first (index and history included), then
    /// extracts text and runs the ingestion pipeline. On success the
    /// session is `Ready` with a fresh conversation seeded by an assistant
    /// greeting. A document yielding zero chunks still succeeds, with
    /// [`UploadWarning::EmptyDocument`] in the report.
    ///
    /// # Errors
    ///
    /// Extraction, embedding, and indexing errors abort the upload and
    /// leave the session `Uninitialized` — never half-initialized.
    pub async fn upload(&mut self, bytes: &[u8], filename: &str) -> Result<UploadReport> {
        self.state = SessionState::Uninitialized;
        self.pipeline.reset().await?;

        let text = self.extractor.extract_text(bytes)?;
        let stats = self.pipeline.ingest(&text).await?;

        let warning = (stats.chunks_indexed == 0).then_some(UploadWarning::EmptyDocument);
        if warning.is_some() {
            warn!(document_name = filename, "document yielded no indexable text");
        }

        let conversation_id = Uuid::new_v4().to_string();
        info!(
            document_name = filename,
            conversation_id = %conversation_id,
            chunks_indexed = stats.chunks_indexed,
            "document ready"
        );

        self.state = SessionState::Ready(ActiveDocument {
            document_name: filename.to_string(),
            conversation_id,
            history: Arc::new(Mutex::new(vec![ChatTurn::assistant(greeting(filename))])),
        });

        Ok(UploadReport {
            document_name: filename.to_string(),
            chunks_indexed: stats.chunks_indexed,
            warning,
        })
    }

    /// Ask a question about the active document.
    ///
    /// Retrieves grounding chunks, opens a streaming generation call with
    /// the full translated history, and returns the retrieved documents
    /// together with the delta stream. Only `TextDelta` events surface as
    /// deltas; search-query and citation events are consumed silently.
    ///
    /// The user and assistant turns are appended to history only when the
    /// stream reports completion, so a failed or abandoned turn leaves
    /// history exactly as it was.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotReady`] before any successful upload; retrieval
    /// and generation errors abort this call only and leave the session
    /// `Ready`.
    pub async fn ask(&mut self, user_text: &str) -> Result<AskReply> {
        let SessionState::Ready(active) = &self.state else {
            return Err(SessionError::NotReady);
        };

        info!(conversation_id = %active.conversation_id, "asking");

        let documents = self.pipeline.query(user_text).await?;
        let grounding: Vec<GroundingDoc> =
            documents.iter().map(|d| GroundingDoc::new(d.text.clone())).collect();

        let mut history = active.history.lock().await.clone();
        history.push(ChatTurn::user(user_text));

        let request =
            ChatRequest { message: user_text.to_string(), history, documents: grounding };
        let mut upstream = self.model.stream_chat(request).await?;

        let shared_history = Arc::clone(&active.history);
        let user_message = user_text.to_string();

        let deltas: TextDeltaStream = Box::pin(try_stream! {
            let mut transcript = String::new();
            while let Some(event) = upstream.next().await {
                match event? {
                    ChatEvent::TextDelta(delta) => {
                        transcript.push_str(&delta);
                        yield delta;
                    }
                    ChatEvent::Done => {
                        let mut history = shared_history.lock().await;
                        history.push(ChatTurn::user(user_message.clone()));
                        history.push(ChatTurn::assistant(std::mem::take(&mut transcript)));
                        break;
                    }
                    _ => {}
                }
            }
        });

        Ok(AskReply { documents, deltas })
    }
}

/// Builder for constructing a [`ConversationSession`].
///
/// `model` and `pipeline` are required; `extractor` defaults to
/// [`Utf8TextExtractor`].
#[derive(Default)]
pub struct SessionBuilder {
    extractor: Option<Arc<dyn TextExtractor>>,
    model: Option<Arc<dyn ChatModel>>,
    pipeline: Option<RetrievalPipeline>,
}

impl SessionBuilder {
    /// Set the text extractor for uploaded bytes.
    pub fn extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Set the generation model.
    pub fn model(mut self, model: Arc<dyn ChatModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Set the retrieval pipeline.
    pub fn pipeline(mut self, pipeline: RetrievalPipeline) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    /// Build the [`ConversationSession`], validating that required
    /// components are set.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Config`] if `model` or `pipeline` is
    /// missing.
    pub fn build(self) -> Result<ConversationSession> {
        let model =
            self.model.ok_or_else(|| SessionError::Config("model is required".to_string()))?;
        let pipeline = self
            .pipeline
            .ok_or_else(|| SessionError::Config("pipeline is required".to_string()))?;
        let extractor = self.extractor.unwrap_or_else(|| Arc::new(Utf8TextExtractor));

        Ok(ConversationSession {
            extractor,
            model,
            pipeline,
            state: SessionState::Uninitialized,
        })
    }
}
