//! Core contracts for the enrichment pipeline.
//!
//! Defines the ingredient data model plus the three narrow traits the
//! orchestrator consumes: record persistence, similarity search over the
//! safety corpus, and the batched generation service.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Risk classification for a single ingredient.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "no-risk")]
    NoRisk,
    #[serde(rename = "low-risk")]
    LowRisk,
    #[serde(rename = "moderate-risk")]
    ModerateRisk,
    #[serde(rename = "high-risk")]
    HighRisk,
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
}

/// Skin types and concerns an ingredient can be recommended for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkinConcern {
    Oily,
    Dry,
    Combination,
    Sensitive,
    Normal,
    Acne,
    Aging,
    Pigmentation,
    Sensitivity,
    Dryness,
    Oilness,
}

/// A fully-shaped knowledge record for one cosmetic ingredient.
///
/// Either loaded whole from the cache or freshly generated; partially
/// populated records are never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientRecord {
    /// Cache key, case-sensitive as supplied by the caller.
    pub name: String,
    pub description: String,
    /// Exactly 3 entries when generated; empty for fallback records.
    pub benefits: Vec<String>,
    pub good_for: Vec<SkinConcern>,
    pub risk_level: RiskLevel,
    /// Human-readable justification for the risk assessment.
    pub reason: String,
}

/// A safety-database entry returned by similarity search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetySubstance {
    pub name: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub risk: String,
}

/// One ranked similarity-search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityMatch {
    pub data: SafetySubstance,
    pub similarity: f32,
}

/// A retained match inside a safety context.
#[derive(Debug, Clone)]
pub struct MatchedSubstance {
    pub name: String,
    pub details: String,
    pub risk: String,
    pub similarity: f32,
}

/// Per-ingredient retrieval context injected into generation requests.
///
/// Ephemeral: built from similarity-search results, consumed by the batch
/// generator, never persisted.
#[derive(Debug, Clone, Default)]
pub struct SafetyContext {
    /// True only when at least one match cleared the alert threshold.
    pub has_safety_concerns: bool,
    /// Retained matches, descending by similarity.
    pub matched_substances: Vec<MatchedSubstance>,
    /// Similarity of the top match, 0 when no match survived.
    pub highest_similarity: f32,
}

/// Paraphrased safety alert embedded into a generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct SafetyAlert {
    pub ingredient: String,
    pub substance: String,
    pub similarity_percent: u32,
    pub risk: String,
}

/// One batched generation request: ingredient names in order plus the
/// safety alerts that cleared the confidence threshold.
#[derive(Debug, Clone)]
pub struct GenerationBatchRequest {
    pub ingredients: Vec<String>,
    pub safety_alerts: Vec<SafetyAlert>,
}

/// Persistence for enriched ingredient records.
#[async_trait]
pub trait IngredientStore: Send + Sync {
    /// Return the subset of `names` already enriched, keyed by name.
    async fn find_by_names(&self, names: &[String]) -> Result<HashMap<String, IngredientRecord>>;

    /// Insert or overwrite the record keyed by its name (last writer wins).
    async fn upsert(&self, record: &IngredientRecord) -> Result<()>;
}

/// Similarity search over the safety/banned-substance corpus.
#[async_trait]
pub trait SafetySearchClient: Send + Sync {
    /// Return ranked matches for `query` with similarity above
    /// `min_similarity`, at most `top_k` of them.
    async fn search(
        &self,
        query: &str,
        top_k: usize,
        min_similarity: f32,
    ) -> Result<Vec<SimilarityMatch>>;
}

/// Batch-capable text generation service.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Execute one batched generation call and return the raw structured
    /// payload. Parsing and count reconciliation happen in the batch
    /// generator, not here.
    async fn generate(&self, request: &GenerationBatchRequest) -> Result<String>;

    /// Get the provider name.
    fn provider_name(&self) -> &str;

    /// Check if the client is properly configured.
    fn is_available(&self) -> bool;
}
