//! OpenAI generation client.
//!
//! Sends one chat-completion request per ingredient batch and returns the
//! model's raw structured payload; parsing and count reconciliation live in
//! the batch generator.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::traits::{GenerationBatchRequest, GenerationClient};

const SYSTEM_PROMPT: &str = "You are a cosmetic ingredient safety analyst. For each ingredient in the \
list, respond with one JSON object containing: \"name\", \"description\" (one or two sentences), \
\"benefits\" (exactly 3 short strings), \"goodFor\" (subset of: oily, dry, combination, sensitive, \
normal, acne, aging, pigmentation, sensitivity, dryness, oilness), \"riskLevel\" (one of: no-risk, \
low-risk, moderate-risk, high-risk) and \"reason\" (a short justification of the risk level). \
Respond with a JSON array only, one object per ingredient, in the same order as the input list. \
If a safety alert with more than 90% similarity is given for an ingredient, its riskLevel must \
reflect that alert's risk; an alert for a banned substance means high-risk.";

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// OpenAI chat-completions generation client.
pub struct OpenAIGenerationClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl OpenAIGenerationClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            api_key: config.generation_api_key.clone(),
            base_url: config.generation_base_url.clone(),
            model: config.generation_model.clone(),
        }
    }

    /// Render the user prompt from the batch's data contract. Safety alerts
    /// are paraphrased (substance, rounded percentage, risk label) rather
    /// than passed as raw structured data.
    fn render_user_prompt(request: &GenerationBatchRequest) -> String {
        let mut prompt = String::from("Ingredients to assess:\n");
        for (i, name) in request.ingredients.iter().enumerate() {
            prompt.push_str(&format!("{}. {}\n", i + 1, name));
        }

        if !request.safety_alerts.is_empty() {
            prompt.push_str("\nSafety alerts from the regulatory database:\n");
            for alert in &request.safety_alerts {
                prompt.push_str(&format!(
                    "- {}: close match to \"{}\" ({}% similarity, risk: {})\n",
                    alert.ingredient, alert.substance, alert.similarity_percent, alert.risk
                ));
            }
        }

        prompt
    }
}

#[async_trait]
impl GenerationClient for OpenAIGenerationClient {
    async fn generate(&self, request: &GenerationBatchRequest) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| anyhow!("OPENAI_API_KEY is not configured"))?;

        let chat_request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: Self::render_user_prompt(request),
                },
            ],
            temperature: 0.2,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&chat_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("OpenAI API error ({}): {}", status, error_text));
        }

        let api_response: ChatResponse = response.json().await?;
        let content = api_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("No completion returned from OpenAI"))?;

        Ok(content)
    }

    fn provider_name(&self) -> &str {
        "openai"
    }

    fn is_available(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::SafetyAlert;

    #[test]
    fn test_prompt_lists_ingredients_in_order() {
        let request = GenerationBatchRequest {
            ingredients: vec!["Glycerin".to_string(), "Retinol".to_string()],
            safety_alerts: vec![],
        };
        let prompt = OpenAIGenerationClient::render_user_prompt(&request);
        assert!(prompt.contains("1. Glycerin"));
        assert!(prompt.contains("2. Retinol"));
        assert!(!prompt.contains("Safety alerts"));
    }

    #[test]
    fn test_prompt_paraphrases_safety_alerts() {
        let request = GenerationBatchRequest {
            ingredients: vec!["Phenylbutazone".to_string()],
            safety_alerts: vec![SafetyAlert {
                ingredient: "Phenylbutazone".to_string(),
                substance: "Phenylbutazone".to_string(),
                similarity_percent: 95,
                risk: "banned".to_string(),
            }],
        };
        let prompt = OpenAIGenerationClient::render_user_prompt(&request);
        assert!(prompt.contains("Safety alerts"));
        assert!(prompt.contains("95% similarity"));
        assert!(prompt.contains("risk: banned"));
    }

    #[test]
    fn test_availability_tracks_api_key() {
        let mut config = Config::default();
        let client = OpenAIGenerationClient::new(&config);
        assert!(!client.is_available());

        config.generation_api_key = Some("sk-test".to_string());
        let client = OpenAIGenerationClient::new(&config);
        assert!(client.is_available());

        config.generation_api_key = Some(String::new());
        let client = OpenAIGenerationClient::new(&config);
        assert!(!client.is_available());
    }
}
