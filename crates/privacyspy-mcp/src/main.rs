mod config;
mod error;
mod server;

use std::sync::Arc;

use rmcp::{ServiceExt, transport::stdio};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use privacyspy_common::fetch::PolicyFetcher;
use privacyspy_common::pipeline::PolicyAnalyzer;
use privacyspy_common::weights::KeywordWeights;

use config::Config;
use error::AppError;
use server::PrivacySpyServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout is reserved for MCP JSON-RPC
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting privacyspy MCP server");

    let config = Config::from_env()?;
    let weights = KeywordWeights::load(&config.coefficients_path).map_err(AppError::from)?;
    info!(
        path = %config.coefficients_path.display(),
        keywords = weights.len(),
        "keyword weights loaded"
    );
    if weights.is_empty() {
        warn!("keyword weights are empty, every sentence will score 0");
    }

    let fetcher = PolicyFetcher::new(config.fetch.clone()).map_err(AppError::from)?;
    let analyzer = Arc::new(PolicyAnalyzer::new(Arc::new(weights), fetcher));
    let server = PrivacySpyServer::new(analyzer);

    info!("MCP server ready, serving on stdio");
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!(error = %e, "MCP server error");
    })?;

    service.waiting().await?;
    info!("MCP server shut down");
    Ok(())
}
