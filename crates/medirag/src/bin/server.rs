//! Assistant server binary
//!
//! Run with: cargo run -p medirag --bin medirag-server

use medirag::{config::AssistantConfig, providers::GatewayClient, server::AssistantServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "medirag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load and validate configuration before anything touches the network
    let config = AssistantConfig::from_env()?;
    config.validate()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Model: {}", config.gateway.model);
    tracing::info!("  - Embedding model: {}", config.embeddings.model);
    tracing::info!("  - Chunk size: {}", config.chunking.chunk_size);
    tracing::info!("  - Top-k: {}", config.retrieval.top_k);
    tracing::info!("  - Storage: {}", config.storage.storage_dir.display());

    // Probe the gateway before serving
    let gateway = GatewayClient::new(&config.gateway, &config.embeddings)?;
    match gateway.health_check().await {
        Ok(true) => tracing::info!("Gateway reachable at {}", config.gateway.base_url),
        _ => tracing::warn!(
            "Gateway not reachable at {} - queries will fail until it is",
            config.gateway.base_url
        ),
    }

    let server = AssistantServer::new(config)?;

    println!("\nServer starting...");
    println!("  Web: http://{}/", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST /api/ingest    - Upload documents");
    println!("  POST /api/query     - Ask questions");
    println!("  POST /api/consult   - Consult about a patient");
    println!("  GET  /api/documents - List documents");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
