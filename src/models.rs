//! API models for request/response types.
//!
//! Defines the JSON request/response structures for the enrichment API.

use serde::{Deserialize, Serialize};

use crate::traits::IngredientRecord;

/// Request to enrich a list of ingredient names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichRequest {
    /// Raw ingredient names, typically produced by the OCR/matching
    /// pipeline upstream.
    pub ingredients: Vec<String>,
}

/// Response with one entry per input name, order-aligned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichResponse {
    /// `null` entries correspond to blank input names.
    pub ingredients: Vec<Option<IngredientRecord>>,
    /// Number of input names processed.
    pub count: usize,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
    /// Generation provider name.
    pub provider: String,
    /// Whether the generation provider is configured.
    pub generation_available: bool,
    /// Generation model in use.
    pub model: String,
    /// Available endpoints.
    pub endpoints: Vec<String>,
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
    /// Error code (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}
