//! Enrichment Service - Library Entry Point
//!
//! A cache-first, retrieval-augmented enrichment pipeline for cosmetic
//! ingredient names: curated safety context via similarity search, batched
//! record generation, deterministic fallbacks on every failure path.

pub mod clients;
pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod traits;

// Re-export commonly used types
pub use clients::{HttpSafetySearchClient, OpenAIGenerationClient};
pub use config::Config;
pub use services::{EnrichmentOrchestrator, InMemoryIngredientCache};
pub use traits::{IngredientRecord, RiskLevel, SafetyContext, SkinConcern};
