//! Batched record generation with per-batch fallback.
//!
//! Partitions missing ingredient names into fixed-size batches, issues one
//! generation call per batch (all batches concurrently, each with its own
//! timeout, single attempt), parses the structured payload and reconciles
//! the response against the batch by position.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use futures::future::join_all;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::config::Config;
use crate::traits::{
    GenerationBatchRequest, GenerationClient, IngredientRecord, RiskLevel, SafetyAlert,
    SafetyContext, SkinConcern,
};

/// Description used when no assessment could be produced.
pub const FALLBACK_DESCRIPTION: &str = "Information not available";

/// Outcome of resolving one missing ingredient.
///
/// Collapsed to a plain record at the orchestrator boundary; the tag decides
/// whether the record is worth persisting.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// The generation service produced this record.
    Resolved(IngredientRecord),
    /// Deterministic stand-in after a failure; never persisted.
    Fallback(IngredientRecord),
}

impl Resolution {
    pub fn record(&self) -> &IngredientRecord {
        match self {
            Resolution::Resolved(record) | Resolution::Fallback(record) => record,
        }
    }

    pub fn into_record(self) -> IngredientRecord {
        match self {
            Resolution::Resolved(record) | Resolution::Fallback(record) => record,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }
}

/// Build a minimal, fully-shaped record for a name that could not be
/// assessed.
pub fn fallback_record(name: &str, reason: &str) -> IngredientRecord {
    IngredientRecord {
        name: name.to_string(),
        description: FALLBACK_DESCRIPTION.to_string(),
        benefits: vec![],
        good_for: vec![],
        risk_level: RiskLevel::Unknown,
        reason: reason.to_string(),
    }
}

/// Converts missing ingredient names plus their safety contexts into
/// ingredient records via the generation service.
pub struct BatchGenerator {
    client: Arc<dyn GenerationClient>,
    batch_size: usize,
    alert_threshold: f32,
    timeout: Duration,
}

impl BatchGenerator {
    pub fn new(client: Arc<dyn GenerationClient>, config: &Config) -> Self {
        Self {
            client,
            batch_size: config.batch_size.max(1),
            alert_threshold: config.safety_alert_threshold,
            timeout: Duration::from_secs(config.generation_timeout_seconds),
        }
    }

    /// Generate one record per name, aligned with `names`. Failures never
    /// drop a name: every position resolves to either a generated record or
    /// a fallback.
    pub async fn generate(
        &self,
        names: &[String],
        contexts: &HashMap<String, SafetyContext>,
    ) -> Vec<Resolution> {
        let batches = names
            .chunks(self.batch_size)
            .map(|batch| self.generate_batch(batch, contexts));

        join_all(batches).await.into_iter().flatten().collect()
    }

    async fn generate_batch(
        &self,
        batch: &[String],
        contexts: &HashMap<String, SafetyContext>,
    ) -> Vec<Resolution> {
        let request = self.build_request(batch, contexts);

        let raw = match tokio::time::timeout(self.timeout, self.client.generate(&request)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                warn!(batch_size = batch.len(), error = %e, "generation call failed");
                return fallback_batch(batch, "The generation service request failed.");
            }
            Err(_) => {
                warn!(batch_size = batch.len(), "generation call timed out");
                return fallback_batch(batch, "The generation service did not respond in time.");
            }
        };

        let generated = match parse_generation_payload(&raw) {
            Ok(generated) => generated,
            Err(e) => {
                warn!(batch_size = batch.len(), error = %e, "generation response could not be parsed");
                return fallback_batch(batch, "The generation response could not be parsed.");
            }
        };

        reconcile(batch, generated)
    }

    /// Build the data contract for one batch. Alerts are re-validated
    /// against the confidence threshold here so a context-builder defect
    /// cannot leak low-confidence alerts into a prompt.
    fn build_request(
        &self,
        batch: &[String],
        contexts: &HashMap<String, SafetyContext>,
    ) -> GenerationBatchRequest {
        let safety_alerts = batch
            .iter()
            .filter_map(|name| {
                let ctx = contexts.get(name)?;
                if !ctx.has_safety_concerns || ctx.highest_similarity <= self.alert_threshold {
                    return None;
                }
                let top = ctx.matched_substances.first()?;
                Some(SafetyAlert {
                    ingredient: name.clone(),
                    substance: top.name.clone(),
                    similarity_percent: (top.similarity * 100.0).round() as u32,
                    risk: top.risk.clone(),
                })
            })
            .collect();

        GenerationBatchRequest {
            ingredients: batch.to_vec(),
            safety_alerts,
        }
    }
}

fn fallback_batch(batch: &[String], reason: &str) -> Vec<Resolution> {
    batch
        .iter()
        .map(|name| Resolution::Fallback(fallback_record(name, reason)))
        .collect()
}

/// Align the parsed response with the batch by position. Missing positions
/// are fallback-filled; record names are taken from the batch, not the
/// response, so a misnamed response entry cannot break output alignment.
fn reconcile(batch: &[String], generated: Vec<GeneratedIngredient>) -> Vec<Resolution> {
    batch
        .iter()
        .enumerate()
        .map(|(i, name)| match generated.get(i) {
            Some(entry) => Resolution::Resolved(entry.clone().into_record(name)),
            None => Resolution::Fallback(fallback_record(
                name,
                "The generation response omitted this ingredient.",
            )),
        })
        .collect()
}

/// One entry of a generation response, parsed leniently: unknown skin
/// concerns are dropped, unknown risk labels map to `unknown`, missing
/// fields default.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedIngredient {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default, deserialize_with = "lenient_concerns")]
    pub good_for: Vec<SkinConcern>,
    #[serde(default, deserialize_with = "lenient_risk")]
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub reason: String,
}

impl GeneratedIngredient {
    fn into_record(self, name: &str) -> IngredientRecord {
        IngredientRecord {
            name: name.to_string(),
            description: self
                .description
                .unwrap_or_else(|| FALLBACK_DESCRIPTION.to_string()),
            benefits: self.benefits,
            good_for: self.good_for,
            risk_level: self.risk_level,
            reason: self.reason,
        }
    }
}

fn lenient_concerns<'de, D>(deserializer: D) -> Result<Vec<SkinConcern>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(vec![]);
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

fn lenient_risk<'de, D>(deserializer: D) -> Result<RiskLevel, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Parse a raw generation payload into per-ingredient entries.
///
/// Accepts a bare JSON array, an object wrapping a single array field (some
/// models insist on returning an object), or either of those inside a
/// markdown code fence. Anything else is a parse failure, handled by the
/// caller's batch fallback.
pub fn parse_generation_payload(raw: &str) -> Result<Vec<GeneratedIngredient>> {
    let trimmed = strip_code_fences(raw.trim());
    let value: Value = serde_json::from_str(trimmed)?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(map) => {
            let mut arrays = map.into_iter().filter_map(|(_, v)| match v {
                Value::Array(items) => Some(items),
                _ => None,
            });
            match arrays.next() {
                Some(items) => items,
                None => bail!("generation response object contains no array field"),
            }
        }
        other => bail!("unexpected generation payload shape: {}", other),
    };

    items
        .into_iter()
        .map(|item| serde_json::from_value::<GeneratedIngredient>(item).map_err(Into::into))
        .collect()
}

fn strip_code_fences(raw: &str) -> &str {
    let Some(rest) = raw.strip_prefix("```") else {
        return raw;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.trim().strip_suffix("```").unwrap_or(rest).trim()
}
