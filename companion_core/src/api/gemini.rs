//! Google Gemini `generateContent` backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::generator::{tidy_remark, RemarkGenerator, RemarkPrompt};
use super::http_client::{create_generator_client, truncate_body, GeneratorClientConfig};
use crate::utils::config::GeneratorConfig;
use crate::utils::error::GeneratorError;

const PROVIDER: &str = "gemini";

#[derive(Debug, Clone)]
pub struct GeminiGenerator {
    client: Client,
    api_url: String,
    model: String,
    api_key: String,
    temperature: f32,
    max_output_tokens: u32,
    timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiGenerator {
    pub fn new(config: &GeneratorConfig, api_key: String) -> Result<Self, GeneratorError> {
        let client = create_generator_client(GeneratorClientConfig::with_timeout(config.timeout()))?;
        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            timeout_secs: config.timeout_secs,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_url, self.model)
    }

    fn request_body(&self, prompt: &RemarkPrompt) -> serde_json::Value {
        json!({
            "systemInstruction": {
                "parts": [{ "text": prompt.system_instruction }]
            },
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt.user_prompt }]
            }],
            "generationConfig": {
                "temperature": self.temperature,
                "maxOutputTokens": self.max_output_tokens,
                "thinkingConfig": { "thinkingBudget": 0 }
            }
        })
    }
}

#[async_trait]
impl RemarkGenerator for GeminiGenerator {
    async fn generate(&self, prompt: RemarkPrompt) -> Result<String, GeneratorError> {
        tracing::debug!(model = %self.model, "requesting remark from gemini");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request_body(&prompt))
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

        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GeneratorError::InvalidResponse(e.to_string()))?;

        let text: String = payload
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        tidy_remark(&text).ok_or_else(|| GeneratorError::EmptyResponse {
            provider: PROVIDER.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::generator::RemarkAction;
    use assert_matches::assert_matches;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn generator_for(server: &MockServer) -> GeminiGenerator {
        let mut config = GeneratorConfig::default();
        config.api_url = server.uri();
        GeminiGenerator::new(&config, "test-key".to_string()).unwrap()
    }

    fn prompt() -> RemarkPrompt {
        RemarkPrompt::new("You are a cat.", RemarkAction::Clicked)
    }

    #[tokio::test]
    async fn test_generate_returns_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "generationConfig": { "maxOutputTokens": 30 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "Red dot. " }, { "text": "Mine." }] }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = generator_for(&server).generate(prompt()).await.unwrap();
        assert_eq!(text, "Red dot. Mine.");
    }

    #[tokio::test]
    async fn test_generate_maps_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let result = generator_for(&server).generate(prompt()).await;
        assert_matches!(
            result,
            Err(GeneratorError::ServerError { status_code: 429, message }) if message == "quota exceeded"
        );
    }

    #[tokio::test]
    async fn test_generate_rejects_empty_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let result = generator_for(&server).generate(prompt()).await;
        assert_matches!(result, Err(GeneratorError::EmptyResponse { .. }));
    }

    #[tokio::test]
    async fn test_generate_rejects_malformed_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let result = generator_for(&server).generate(prompt()).await;
        assert_matches!(result, Err(GeneratorError::InvalidResponse(_)));
    }
}
