use super::{GenerationBackend, GenerationOptions, LLMError};
use crate::config::LLMConfig;
use crate::secrets::{scrub_secrets, SecretString};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

/// Gemini `generateContent` REST backend
pub struct GeminiProvider {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(config: &LLMConfig) -> super::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| LLMError::ProviderUnavailable(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            client,
        })
    }

    fn build_payload(prompt: &str, options: &GenerationOptions) -> serde_json::Value {
        let mut payload = serde_json::Map::new();
        payload.insert(
            "contents".to_string(),
            json!([{ "role": "user", "parts": [{ "text": prompt }] }]),
        );

        let mut generation_config = serde_json::Map::new();
        if let Some(temperature) = options.temperature {
            generation_config.insert("temperature".to_string(), json!(temperature));
        }
        if let Some(max_tokens) = options.max_output_tokens {
            generation_config.insert("maxOutputTokens".to_string(), json!(max_tokens));
        }
        if !generation_config.is_empty() {
            payload.insert(
                "generationConfig".to_string(),
                serde_json::Value::Object(generation_config),
            );
        }

        serde_json::Value::Object(payload)
    }
}

#[async_trait]
impl GenerationBackend for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(
        &self,
        api_key: &SecretString,
        prompt: &str,
        options: &GenerationOptions,
    ) -> super::Result<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let payload = Self::build_payload(prompt, options);

        tracing::debug!("Gemini request to model {} ({} chars)", self.model, prompt.len());

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key.unsecure())])
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| LLMError::NetworkError(scrub_secrets(&e.to_string())))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = scrub_secrets(&response.text().await.unwrap_or_default());

            return Err(match status.as_u16() {
                429 => LLMError::RateLimitExceeded,
                400 | 404 => LLMError::InvalidRequest(text),
                401 | 403 => LLMError::AuthenticationFailed(text),
                _ => LLMError::ProviderUnavailable(format!(
                    "Gemini API error ({}): {}",
                    status, text
                )),
            });
        }

        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LLMError::ParseError(scrub_secrets(&e.to_string())))?;

        let candidate = data
            .get("candidates")
            .and_then(|c| c.as_array())
            .and_then(|c| c.first())
            .ok_or_else(|| LLMError::ParseError("No candidates in response".to_string()))?;

        let parts = candidate
            .get("content")
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.as_array())
            .ok_or_else(|| LLMError::ParseError("No parts in candidate content".to_string()))?;

        let full_text: String = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
            .collect();

        Ok(full_text)
    }
}
