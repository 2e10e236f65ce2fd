use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use privacyspy_common::fetch::PolicyFetcher;
use privacyspy_common::pipeline::PolicyAnalyzer;
use privacyspy_common::weights::KeywordWeights;
use privacyspy_server::config::Config;
use privacyspy_server::create_router;
use privacyspy_server::error::AppError;
use privacyspy_server::handlers::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting privacyspy HTTP server");

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

    info!(
        timeout_ms = config.fetch.timeout.as_millis(),
        max_body_bytes = config.fetch.max_body_bytes,
        "policy fetcher configured"
    );
    let fetcher = PolicyFetcher::new(config.fetch.clone()).map_err(AppError::from)?;
    let analyzer = PolicyAnalyzer::new(Arc::new(weights), fetcher);

    if config.token.is_none() {
        warn!("auth disabled by PRIVACYSPY_AUTH_DISABLED, /analyze accepts requests without a token");
    }
    let state = AppState::new(analyzer, config.token.as_deref());

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(addr = %config.bind, "HTTP server ready");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
