//! PDF Summary Client - Entry point
//!
//! MCP server for uploading PDFs to a summarization service.

use pdf_summary_client::{run_server_with_config, ClientConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging; stdout carries the MCP protocol
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_summary_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ClientConfig::from_env()?;
    tracing::info!(base_url = %config.base_url, "Starting PDF summary client");

    run_server_with_config(config).await
}
