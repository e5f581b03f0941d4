//! The seam between the scheduler and whatever produces remark text.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use super::gemini::GeminiGenerator;
use super::openai::OpenAiCompatibleGenerator;
use crate::constants::REMARK_WORD_LIMIT;
use crate::utils::config::{GeneratorConfig, Provider};
use crate::utils::error::GeneratorError;

/// What the user just did, as told to the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemarkAction {
    /// Pointer button pressed
    Clicked,
    /// Ambient remark from the periodic tick
    Wandered,
}

impl RemarkAction {
    pub fn label(&self) -> &'static str {
        match self {
            RemarkAction::Clicked => "clicked the mouse",
            RemarkAction::Wandered => "moved the cursor randomly",
        }
    }
}

impl fmt::Display for RemarkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Instruction pair sent to a text-generation backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemarkPrompt {
    pub system_instruction: String,
    pub user_prompt: String,
}

impl RemarkPrompt {
    pub fn new(persona_prompt: &str, action: RemarkAction) -> Self {
        Self {
            system_instruction: format!(
                "{} Keep your response under {} words. Avoid hashtags.",
                persona_prompt, REMARK_WORD_LIMIT
            ),
            user_prompt: format!("The user just {}. What do you think?", action.label()),
        }
    }
}

/// Produces a short in-character remark.
///
/// Implementations report every failure as a [`GeneratorError`]; callers
/// decide what to show instead.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemarkGenerator: Send + Sync {
    async fn generate(&self, prompt: RemarkPrompt) -> Result<String, GeneratorError>;
}

/// Generator used when no backend can be configured; always fails so the
/// scheduler falls back to canned phrases.
#[derive(Debug, Clone)]
pub struct OfflineGenerator {
    provider: Provider,
}

impl OfflineGenerator {
    pub fn new(provider: Provider) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl RemarkGenerator for OfflineGenerator {
    async fn generate(&self, _prompt: RemarkPrompt) -> Result<String, GeneratorError> {
        Err(GeneratorError::MissingApiKey {
            provider: self.provider.to_string(),
        })
    }
}

/// Builds the generator for the configured provider.
pub fn build_generator(
    config: &GeneratorConfig,
) -> Result<Arc<dyn RemarkGenerator>, GeneratorError> {
    let api_key = config.resolved_api_key();
    if config.provider.requires_api_key() && api_key.is_none() {
        return Err(GeneratorError::MissingApiKey {
            provider: config.provider.to_string(),
        });
    }
    let api_key = api_key.unwrap_or_default();

    let generator: Arc<dyn RemarkGenerator> = match config.provider {
        Provider::Gemini => Arc::new(GeminiGenerator::new(config, api_key)?),
        Provider::OpenAi | Provider::OpenRouter | Provider::Ollama => {
            Arc::new(OpenAiCompatibleGenerator::new(config, api_key)?)
        }
    };
    Ok(generator)
}

/// Normalizes generated text; `None` when nothing usable is left.
pub fn tidy_remark(raw: &str) -> Option<String> {
    let text = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '“' || c == '”')
        .trim();
    if text.is_empty() {
        None
    } else {
        Some(text.split_whitespace().collect::<Vec<_>>().join(" "))
    }
}
