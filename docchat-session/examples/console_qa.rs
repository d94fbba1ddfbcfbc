//! # Console document QA
//!
//! Upload a plain-text document, then ask questions about it in a loop.
//! Answers stream token-by-token and cite the reranked source chunks.
//!
//! Requires: `COHERE_API_KEY` environment variable.
//!
//! Run: `cargo run -p docchat-session --example console_qa -- path/to/document.txt`

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::Context;
use futures::StreamExt;

use docchat_model::CohereChatModel;
use docchat_rag::{
    CohereEmbeddingProvider, CohereReranker, InMemoryVectorIndex, RetrievalConfig,
    RetrievalPipeline,
};
use docchat_session::ConversationSession;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .context("usage: console_qa <document.txt>")?;
    let bytes = std::fs::read(&path).with_context(|| format!("failed to read {path}"))?;
    let filename = std::path::Path::new(&path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.clone());

    let pipeline = RetrievalPipeline::builder()
        .config(RetrievalConfig::default())
        .embedder(Arc::new(CohereEmbeddingProvider::from_env()?))
        .index(Arc::new(InMemoryVectorIndex::new()))
        .reranker(Arc::new(CohereReranker::from_env()?))
        .build()?;

    let mut session = ConversationSession::builder()
        .model(Arc::new(CohereChatModel::from_env()?))
        .pipeline(pipeline)
        .build()?;

    println!("Indexing {filename}...");
    let report = session.upload(&bytes, &filename).await?;
    match report.warning {
        Some(warning) => println!("Indexed 0 chunks ({warning:?}); answers will be ungrounded."),
        None => println!("Indexed {} chunks. Ask away (empty line to quit).\n", report.chunks_indexed),
    }

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() {
            break;
        }

        let reply = match session.ask(question).await {
            Ok(reply) => reply,
            Err(e) => {
                eprintln!("error: {e}");
                continue;
            }
        };

        let mut deltas = reply.deltas;
        while let Some(delta) = deltas.next().await {
            match delta {
                Ok(text) => {
                    print!("{text}");
                    std::io::stdout().flush()?;
                }
                Err(e) => {
                    eprintln!("\nstream error: {e}");
                    break;
                }
            }
        }
        println!();

        if !reply.documents.is_empty() {
            println!("\nSources:");
            for doc in &reply.documents {
                let snippet: String = doc.text.chars().take(120).collect();
                println!("  [{}] {snippet}", doc.rank + 1);
            }
        }
        println!();
    }

    Ok(())
}
