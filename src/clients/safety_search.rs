//! HTTP client for the safety-corpus similarity search service.
//!
//! The search engine itself is a black box: it indexes the curated
//! safety/banned-substance database and answers ranked similarity queries.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::traits::{SafetySearchClient, SimilarityMatch};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    text: &'a str,
    top_k: usize,
    min_similarity: f32,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    matches: Vec<SimilarityMatch>,
}

/// Similarity search client backed by an HTTP service.
pub struct HttpSafetySearchClient {
    client: Client,
    base_url: String,
}

impl HttpSafetySearchClient {
    pub fn new(config: &Config) -> Self {
        Self::with_base_url(config.safety_search_url.clone())
    }

    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }
}

#[async_trait]
impl SafetySearchClient for HttpSafetySearchClient {
    async fn search(
        &self,
        query: &str,
        top_k: usize,
        min_similarity: f32,
    ) -> Result<Vec<SimilarityMatch>> {
        let request = SearchRequest {
            text: query,
            top_k,
            min_similarity,
        };

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("safety search error ({}): {}", status, error_text));
        }

        let search_response: SearchResponse = response.json().await?;
        Ok(search_response.matches)
    }
}
