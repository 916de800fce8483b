//! HTTP handlers module.
//!
//! Provides the narrow caller surface of the enrichment pipeline.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::models::{EnrichRequest, EnrichResponse, ErrorResponse, HealthResponse};
use crate::services::EnrichmentOrchestrator;

/// Upper bound on names per request; product labels stay well below this.
const MAX_INGREDIENTS_PER_REQUEST: usize = 100;

/// Application state shared across handlers.
pub struct AppState {
    pub orchestrator: Arc<EnrichmentOrchestrator>,
    pub config: Config,
}

/// Health check endpoint.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "enrichment".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        provider: state.orchestrator.provider_name().to_string(),
        generation_available: state.orchestrator.generation_available(),
        model: state.config.generation_model.clone(),
        endpoints: vec!["/health".to_string(), "/enrich".to_string()],
    })
}

/// Enrich a list of ingredient names.
///
/// The pipeline is total: every failure mode downstream resolves to a
/// fully-shaped record, so this handler only rejects oversized payloads.
pub async fn enrich(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EnrichRequest>,
) -> Result<Json<EnrichResponse>, (StatusCode, Json<ErrorResponse>)> {
    if request.ingredients.len() > MAX_INGREDIENTS_PER_REQUEST {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!(
                    "Too many ingredients: {} (maximum {})",
                    request.ingredients.len(),
                    MAX_INGREDIENTS_PER_REQUEST
                ),
                code: Some("TOO_MANY_INGREDIENTS".to_string()),
            }),
        ));
    }

    info!("Enriching {} ingredients", request.ingredients.len());

    let ingredients = state.orchestrator.enrich(&request.ingredients).await;

    Ok(Json(EnrichResponse {
        count: ingredients.len(),
        ingredients,
    }))
}
