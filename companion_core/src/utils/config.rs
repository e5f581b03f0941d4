use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::*;
use crate::motion::{SpringConfig, TiltRule};
use crate::persona::AnimalKind;
use crate::utils::error::CompanionError;

/// Startup configuration. Runtime selections are never written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Companion shown at startup
    pub persona: AnimalKind,

    /// Whether remarks start enabled
    pub remarks_enabled: bool,

    pub motion: MotionConfig,
    pub remarks: RemarkConfig,
    pub generator: GeneratorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            persona: AnimalKind::default(),
            remarks_enabled: true,
            motion: MotionConfig::default(),
            remarks: RemarkConfig::default(),
            generator: GeneratorConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    pub stiffness: f32,
    pub damping: f32,
    pub mass: f32,
    pub rest_delta: f32,
    pub rest_speed: f32,
    pub tilt_gain: f32,
    pub tilt_limit: f32,
    pub tilt_threshold: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            stiffness: SPRING_STIFFNESS,
            damping: SPRING_DAMPING,
            mass: SPRING_MASS,
            rest_delta: SPRING_REST_DELTA,
            rest_speed: SPRING_REST_SPEED,
            tilt_gain: TILT_GAIN,
            tilt_limit: TILT_LIMIT_DEG,
            tilt_threshold: TILT_THRESHOLD,
        }
    }
}

impl MotionConfig {
    pub fn spring(&self) -> SpringConfig {
        SpringConfig {
            stiffness: self.stiffness,
            damping: self.damping,
            mass: self.mass,
            rest_delta: self.rest_delta,
            rest_speed: self.rest_speed,
        }
    }

    pub fn tilt_rule(&self) -> TiltRule {
        TiltRule {
            gain: self.tilt_gain,
            limit: self.tilt_limit,
            threshold: self.tilt_threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemarkConfig {
    /// Seconds between ambient remark checks
    pub tick_interval_secs: u64,
    /// Probability that an ambient check asks for a remark
    pub tick_chance: f64,
    /// Seconds a remark stays on screen
    pub display_secs: u64,
    /// Drop responses issued under a persona/toggle that is no longer current
    pub discard_stale: bool,
}

impl Default for RemarkConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: REMARK_TICK_INTERVAL_SECS,
            tick_chance: REMARK_TICK_CHANCE,
            display_secs: REMARK_DISPLAY_SECS,
            discard_stale: true,
        }
    }
}

impl RemarkConfig {
    /// Tick period, kept within `1..=REMARK_MAX_INTERVAL_SECS` seconds.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs.clamp(1, REMARK_MAX_INTERVAL_SECS))
    }

    /// Display window, kept within `1..=REMARK_MAX_INTERVAL_SECS` seconds.
    pub fn display_duration(&self) -> Duration {
        Duration::from_secs(self.display_secs.clamp(1, REMARK_MAX_INTERVAL_SECS))
    }
}

/// Remote text-generation backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Gemini,
    OpenAi,
    OpenRouter,
    Ollama,
}

impl Provider {
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::OpenAi => "openai",
            Provider::OpenRouter => "openrouter",
            Provider::Ollama => "ollama",
        }
    }

    /// Environment variables consulted, in order, when no key is configured.
    pub fn api_key_env_vars(&self) -> &'static [&'static str] {
        match self {
            Provider::Gemini => &["GEMINI_API_KEY", "API_KEY"],
            Provider::OpenAi => &["OPENAI_API_KEY"],
            Provider::OpenRouter => &["OPENROUTER_API_KEY"],
            Provider::Ollama => &["OLLAMA_API_KEY"],
        }
    }

    pub fn requires_api_key(&self) -> bool {
        !matches!(self, Provider::Ollama)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Generator settings. Fields left out of the file take the defaults of the
/// chosen provider, not of Gemini.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "GeneratorConfigFile")]
pub struct GeneratorConfig {
    pub provider: Provider,
    pub model: String,
    pub api_url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_key: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout_secs: u64,
}

/// On-disk shape of [`GeneratorConfig`] before provider defaults are applied.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GeneratorConfigFile {
    provider: Provider,
    model: Option<String>,
    api_url: Option<String>,
    api_key: String,
    temperature: Option<f32>,
    max_output_tokens: Option<u32>,
    timeout_secs: Option<u64>,
}

impl From<GeneratorConfigFile> for GeneratorConfig {
    fn from(file: GeneratorConfigFile) -> Self {
        let defaults = GeneratorConfig::get_provider_defaults(file.provider);
        GeneratorConfig {
            provider: file.provider,
            model: file
                .model
                .filter(|model| !model.trim().is_empty())
                .unwrap_or(defaults.model),
            api_url: file
                .api_url
                .filter(|url| !url.trim().is_empty())
                .unwrap_or(defaults.api_url),
            api_key: file.api_key,
            temperature: file.temperature.unwrap_or(defaults.temperature),
            max_output_tokens: file.max_output_tokens.unwrap_or(defaults.max_output_tokens),
            timeout_secs: file.timeout_secs.unwrap_or(defaults.timeout_secs),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::get_provider_defaults(Provider::default())
    }
}

impl GeneratorConfig {
    /// Get the default configuration for a specific provider
    pub fn get_provider_defaults(provider: Provider) -> GeneratorConfig {
        let (model, api_url) = match provider {
            Provider::Gemini => (
                "gemini-2.5-flash",
                "https://generativelanguage.googleapis.com/v1beta",
            ),
            Provider::OpenAi => ("gpt-4o-mini", "https://api.openai.com/v1"),
            Provider::OpenRouter => ("openai/gpt-4o-mini", "https://openrouter.ai/api/v1"),
            Provider::Ollama => ("llama3.2", "http://localhost:11434/v1"),
        };

        GeneratorConfig {
            provider,
            model: model.to_string(),
            api_url: api_url.to_string(),
            api_key: String::new(),
            temperature: GENERATOR_TEMPERATURE,
            max_output_tokens: GENERATOR_MAX_OUTPUT_TOKENS,
            timeout_secs: GENERATOR_TIMEOUT_SECS,
        }
    }

    /// The configured key, or the first non-empty provider env var.
    pub fn resolved_api_key(&self) -> Option<String> {
        if !self.api_key.is_empty() {
            return Some(self.api_key.clone());
        }
        self.provider
            .api_key_env_vars()
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|value| !value.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CompanionError> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CompanionError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Directory holding the config file and logs.
    pub fn get_config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".companion")
    }

    pub fn get_config_path() -> PathBuf {
        Self::get_config_dir().join("config.yaml")
    }

    /// Loads `path`, or the defaults when the file does not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, CompanionError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Rejects values that would break the spring or the scheduler.
    pub fn validate(&self) -> Result<(), CompanionError> {
        let motion = &self.motion;
        for (name, value) in [
            ("motion.stiffness", motion.stiffness),
            ("motion.damping", motion.damping),
            ("motion.mass", motion.mass),
            ("motion.tilt_limit", motion.tilt_limit),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(CompanionError::Config(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        for (name, value) in [
            ("motion.rest_delta", motion.rest_delta),
            ("motion.rest_speed", motion.rest_speed),
            ("motion.tilt_gain", motion.tilt_gain),
            ("motion.tilt_threshold", motion.tilt_threshold),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(CompanionError::Config(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.remarks.tick_chance) {
            return Err(CompanionError::Config(format!(
                "remarks.tick_chance must be within [0, 1], got {}",
                self.remarks.tick_chance
            )));
        }
        for (name, value, max) in [
            (
                "remarks.tick_interval_secs",
                self.remarks.tick_interval_secs,
                REMARK_MAX_INTERVAL_SECS,
            ),
            (
                "remarks.display_secs",
                self.remarks.display_secs,
                REMARK_MAX_INTERVAL_SECS,
            ),
            (
                "generator.timeout_secs",
                self.generator.timeout_secs,
                GENERATOR_MAX_TIMEOUT_SECS,
            ),
        ] {
            if !(1..=max).contains(&value) {
                return Err(CompanionError::Config(format!(
                    "{} must be between 1 and {}, got {}",
                    name, max, value
                )));
            }
        }
        Ok(())
    }
}

/// Masks all but the last four characters of a secret for display.
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let visible: String = secret.chars().skip(count - 4).collect();
    format!("{}{}", "*".repeat(count - 4), visible)
}
