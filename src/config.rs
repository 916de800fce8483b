//! Configuration module for the enrichment service.

/// Main service configuration loaded from environment variables.
///
/// Credentials are captured here at construction and injected into the
/// orchestrator, never read from the environment at call time.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub host: String,
    /// Generation provider credential. Absence is a configuration failure:
    /// every cache miss resolves to a fallback record.
    pub generation_api_key: Option<String>,
    pub generation_base_url: String,
    pub generation_model: String,
    pub safety_search_url: String,
    /// Ingredients per generation call.
    pub batch_size: usize,
    pub retrieval_top_k: usize,
    /// Floor for retaining a similarity-search candidate at all.
    pub retrieval_min_similarity: f32,
    /// Stricter floor for treating a candidate as a safety alert. Kept above
    /// the retrieval floor to suppress lexically-similar but chemically
    /// unrelated matches.
    pub safety_alert_threshold: f32,
    pub generation_timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3022,
            host: "0.0.0.0".to_string(),
            generation_api_key: None,
            generation_base_url: "https://api.openai.com/v1".to_string(),
            generation_model: "gpt-4o-mini".to_string(),
            safety_search_url: "http://127.0.0.1:3030".to_string(),
            batch_size: 5,
            retrieval_top_k: 1,
            retrieval_min_similarity: 0.8,
            safety_alert_threshold: 0.85,
            generation_timeout_seconds: 60,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            host: std::env::var("HOST").unwrap_or(defaults.host),
            generation_api_key: std::env::var("OPENAI_API_KEY").ok(),
            generation_base_url: std::env::var("GENERATION_BASE_URL")
                .unwrap_or(defaults.generation_base_url),
            generation_model: std::env::var("GENERATION_MODEL")
                .unwrap_or(defaults.generation_model),
            safety_search_url: std::env::var("SAFETY_SEARCH_URL")
                .unwrap_or(defaults.safety_search_url),
            batch_size: std::env::var("ENRICHMENT_BATCH_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.batch_size),
            retrieval_top_k: std::env::var("RETRIEVAL_TOP_K")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.retrieval_top_k),
            retrieval_min_similarity: std::env::var("RETRIEVAL_MIN_SIMILARITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.retrieval_min_similarity),
            safety_alert_threshold: std::env::var("SAFETY_ALERT_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.safety_alert_threshold),
            generation_timeout_seconds: std::env::var("GENERATION_TIMEOUT_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.generation_timeout_seconds),
        }
    }

    /// Check if the generation provider is configured.
    pub fn has_generation_provider(&self) -> bool {
        self.generation_api_key
            .as_deref()
            .is_some_and(|key| !key.is_empty())
    }
}
