//! Services module.

pub mod cache;
pub mod context;
pub mod generator;
pub mod orchestrator;

pub use cache::InMemoryIngredientCache;
pub use context::build_safety_context;
pub use generator::{BatchGenerator, Resolution};
pub use orchestrator::EnrichmentOrchestrator;
