//! drip-mm (Mix & Match) - Outfit compatibility matching service
//!
//! Given an anchor garment, queries the external compatibility scorer
//! for candidate garments and serves ranked category matches or full
//! outfit assemblies over HTTP.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use drip_mm::catalog::HttpCatalog;
use drip_mm::config::{CliArgs, MatchServiceConfig};
use drip_mm::matching::MatchEngine;
use drip_mm::scoring::HttpScorer;
use drip_mm::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting Drip Mix & Match (drip-mm) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = CliArgs::parse();
    let config = MatchServiceConfig::resolve(&args)?;
    info!("Catalog service: {}", config.catalog_base_url);
    info!("Scoring service: {}", config.scoring_base_url);

    let catalog = Arc::new(HttpCatalog::new(&config.catalog_base_url));
    let scorer = Arc::new(HttpScorer::new(
        &config.scoring_base_url,
        Duration::from_secs(config.scoring_timeout_secs),
        config.scoring_rate_limit,
    ));
    let engine = Arc::new(MatchEngine::new(
        scorer,
        Duration::from_secs(config.scoring_timeout_secs),
    ));

    let state = AppState::new(catalog, engine);
    let app = build_router(state);

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;
    info!("drip-mm listening on http://{}:{}", config.host, config.port);
    info!("Health check: http://{}:{}/health", config.host, config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
