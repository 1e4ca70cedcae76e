//! Chat RAG server binary
//!
//! Run with: cargo run -p chat-rag --bin chat-rag-server -- --config crates/chat-rag/chat-rag.example.toml

use chat_rag::{config::RagConfig, server::RagServer};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "chat-rag-server", version, about = "Retrieval-augmented chat server")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen port (overrides config and PORT)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_rag=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = RagConfig::load(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    tracing::info!("Configuration loaded");
    tracing::info!("  - Embedding: {} ({})", config.embeddings.model, config.embeddings.url);
    tracing::info!("  - Generation: {} ({})", config.llm.model, config.llm.url);
    tracing::info!(
        "  - Vector index: {} (collection {})",
        config.vector_db.base_url,
        config.vector_db.collection
    );
    tracing::info!(
        "  - Top-K: {}, request timeout: {}s",
        config.pipeline.top_k,
        config.pipeline.request_timeout_secs
    );

    let server = RagServer::new(config)?;
    tracing::info!("Endpoints: POST /chat, GET /health");

    server.start().await?;

    Ok(())
}
