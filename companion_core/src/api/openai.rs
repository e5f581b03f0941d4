//! OpenAI-compatible `chat/completions` backend (OpenAI, OpenRouter, Ollama).

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::generator::{tidy_remark, RemarkGenerator, RemarkPrompt};
use super::http_client::{create_generator_client, truncate_body, GeneratorClientConfig};
use crate::utils::config::{GeneratorConfig, Provider};
use crate::utils::error::GeneratorError;

#[derive(Debug, Clone)]
pub struct OpenAiCompatibleGenerator {
    client: Client,
    provider: Provider,
    api_url: String,
    model: String,
    api_key: String,
    temperature: f32,
    max_output_tokens: u32,
    timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiCompatibleGenerator {
    pub fn new(config: &GeneratorConfig, api_key: String) -> Result<Self, GeneratorError> {
        let client = create_generator_client(GeneratorClientConfig::with_timeout(config.timeout()))?;
        Ok(Self {
            client,
            provider: config.provider,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            timeout_secs: config.timeout_secs,
        })
    }
}

#[async_trait]
impl RemarkGenerator for OpenAiCompatibleGenerator {
    async fn generate(&self, prompt: RemarkPrompt) -> Result<String, GeneratorError> {
        tracing::debug!(provider = %self.provider, model = %self.model, "requesting remark");

        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": prompt.system_instruction },
                { "role": "user", "content": prompt.user_prompt }
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_output_tokens,
            "stream": false
        });

        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.api_url))
            .json(&body);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| GeneratorError::from_request(e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeneratorError::ServerError {
                status_code: status.as_u16(),
                message: truncate_body(&body, 200),
            });
        }

        let payload: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| GeneratorError::InvalidResponse(e.to_string()))?;

        let text = payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .unwrap_or_default();

        tidy_remark(&text).ok_or_else(|| GeneratorError::EmptyResponse {
            provider: self.provider.to_string(),
        })
    }
}
