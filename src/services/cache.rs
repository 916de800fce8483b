//! In-memory ingredient record store.
//!
//! Backs the cache-first enrichment path when no external database is wired
//! in. Keys are ingredient names exactly as supplied; upserts are
//! last-writer-wins.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use anyhow::Result;
use async_trait::async_trait;

use crate::traits::{IngredientRecord, IngredientStore};

/// A thread-safe in-memory ingredient cache.
#[derive(Clone, Default)]
pub struct InMemoryIngredientCache {
    records: Arc<RwLock<HashMap<String, IngredientRecord>>>,
}

impl InMemoryIngredientCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached records.
    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl IngredientStore for InMemoryIngredientCache {
    async fn find_by_names(&self, names: &[String]) -> Result<HashMap<String, IngredientRecord>> {
        let records = self.records.read().unwrap();
        Ok(names
            .iter()
            .filter_map(|name| records.get(name).map(|r| (name.clone(), r.clone())))
            .collect())
    }

    async fn upsert(&self, record: &IngredientRecord) -> Result<()> {
        let mut records = self.records.write().unwrap();
        records.insert(record.name.clone(), record.clone());
        Ok(())
    }
}
