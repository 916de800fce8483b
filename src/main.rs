//! Enrichment Service - Main Entry Point
//!
//! HTTP microservice that annotates scanned cosmetic products: raw
//! ingredient names in, structured safety/benefit records out.

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use enrichment::clients::{HttpSafetySearchClient, OpenAIGenerationClient};
use enrichment::config::Config;
use enrichment::handlers::{self, AppState};
use enrichment::services::{EnrichmentOrchestrator, InMemoryIngredientCache};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "enrichment=info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    info!("🚀 Starting Enrichment Service v{}", env!("CARGO_PKG_VERSION"));
    info!("🔧 Port: {}", config.port);
    info!("📦 Generation model: {}", config.generation_model);
    info!("🔎 Safety search: {}", config.safety_search_url);

    if config.has_generation_provider() {
        info!("✅ Generation provider configured");
    } else {
        warn!("⚠️  OPENAI_API_KEY not set: cache misses will resolve to fallback records");
    }

    // Wire the pipeline
    let store = Arc::new(InMemoryIngredientCache::new());
    let search = Arc::new(HttpSafetySearchClient::new(&config));
    let generation = Arc::new(OpenAIGenerationClient::new(&config));
    let orchestrator = Arc::new(EnrichmentOrchestrator::new(
        store,
        search,
        generation,
        config.clone(),
    ));

    let state = Arc::new(AppState {
        orchestrator,
        config: config.clone(),
    });

    // Build HTTP routes
    let app = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/enrich", post(handlers::enrich))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("✅ Enrichment Service listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
