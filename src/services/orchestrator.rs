//! Enrichment orchestrator service.
//!
//! Top-level coordinator for the cache-first RAG pipeline: resolves cache
//! hits, drives retrieval and generation for misses concurrently, merges
//! results in input order and persists fresh records best-effort. No error
//! crosses the `enrich` boundary; every failure mode resolves to a
//! fully-shaped record.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::join_all;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::services::context::build_safety_context;
use crate::services::generator::{fallback_record, BatchGenerator, Resolution};
use crate::traits::{
    GenerationClient, IngredientRecord, IngredientStore, SafetyContext, SafetySearchClient,
};

/// Reason attached to fallback records when the generation provider is not
/// configured at all.
const UNCONFIGURED_REASON: &str =
    "The enrichment service is not configured; no assessment was performed.";

/// The main orchestrator that coordinates cache, retrieval and generation.
pub struct EnrichmentOrchestrator {
    store: Arc<dyn IngredientStore>,
    search: Arc<dyn SafetySearchClient>,
    client: Arc<dyn GenerationClient>,
    generator: BatchGenerator,
    config: Config,
}

impl EnrichmentOrchestrator {
    pub fn new(
        store: Arc<dyn IngredientStore>,
        search: Arc<dyn SafetySearchClient>,
        client: Arc<dyn GenerationClient>,
        config: Config,
    ) -> Self {
        let generator = BatchGenerator::new(client.clone(), &config);
        Self {
            store,
            search,
            client,
            generator,
            config,
        }
    }

    /// Get the generation provider name.
    pub fn provider_name(&self) -> &str {
        self.client.provider_name()
    }

    /// Check if the generation provider is configured.
    pub fn generation_available(&self) -> bool {
        self.client.is_available()
    }

    /// Enrich a list of ingredient names with structured records.
    ///
    /// Output is aligned 1:1 with input; an entry is `None` only for a
    /// blank name. Duplicate names each receive the same resolved record.
    pub async fn enrich(&self, names: &[String]) -> Vec<Option<IngredientRecord>> {
        if names.is_empty() {
            return vec![];
        }

        let cached = match self.store.find_by_names(names).await {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, "ingredient cache lookup failed, treating all names as misses");
                HashMap::new()
            }
        };

        // Distinct cache misses in first-seen order; blank names are never
        // resolved.
        let mut seen = HashSet::new();
        let mut missing: Vec<String> = Vec::new();
        for name in names {
            if name.trim().is_empty() || cached.contains_key(name) {
                continue;
            }
            if seen.insert(name.clone()) {
                missing.push(name.clone());
            }
        }

        let mut resolved: HashMap<String, IngredientRecord> = HashMap::new();
        if !missing.is_empty() {
            if !self.client.is_available() {
                error!(
                    provider = self.client.provider_name(),
                    count = missing.len(),
                    "generation provider is not configured, returning fallback records"
                );
                for name in &missing {
                    resolved.insert(name.clone(), fallback_record(name, UNCONFIGURED_REASON));
                }
            } else {
                info!(
                    cached = cached.len(),
                    missing = missing.len(),
                    "enriching ingredient list"
                );
                let contexts = self.retrieve_contexts(&missing).await;
                let resolutions = self.generator.generate(&missing, &contexts).await;

                for (name, resolution) in missing.iter().zip(resolutions) {
                    if let Resolution::Resolved(record) = &resolution {
                        if let Err(e) = self.store.upsert(record).await {
                            warn!(name = %record.name, error = %e, "failed to persist enriched ingredient");
                        }
                    }
                    resolved.insert(name.clone(), resolution.into_record());
                }
            }
        }

        names
            .iter()
            .map(|name| {
                if name.trim().is_empty() {
                    return None;
                }
                cached
                    .get(name)
                    .cloned()
                    .or_else(|| resolved.get(name).cloned())
            })
            .collect()
    }

    /// Fan out one similarity search per missing name. Calls are issued
    /// concurrently and isolated: a failed search degrades that name to an
    /// empty context without delaying or aborting its siblings.
    async fn retrieve_contexts(&self, names: &[String]) -> HashMap<String, SafetyContext> {
        let lookups = names.iter().map(|name| async move {
            let matches = match self
                .search
                .search(
                    name,
                    self.config.retrieval_top_k,
                    self.config.retrieval_min_similarity,
                )
                .await
            {
                Ok(matches) => matches,
                Err(e) => {
                    warn!(name = %name, error = %e, "safety retrieval failed, continuing without context");
                    vec![]
                }
            };
            (
                name.clone(),
                build_safety_context(&matches, self.config.safety_alert_threshold),
            )
        });

        join_all(lookups).await.into_iter().collect()
    }
}
