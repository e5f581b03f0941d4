//! Centralized error handling for the companion
//!
//! This module follows the usual split:
//! - `thiserror` for library-style errors with proper error types
//! - `anyhow` for application-level error handling with context
//!
//! Generator failures never reach the user; the scheduler maps every
//! [`GeneratorError`] to a fallback phrase and only logs it.

use thiserror::Error;

/// Core errors that can occur in the companion
#[derive(Error, Debug)]
pub enum CompanionError {
    /// Remark generation errors
    #[error("Remark generation failed: {0}")]
    Generator(#[from] GeneratorError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persona name not in the fixed set
    #[error("Unknown persona: {0}")]
    UnknownPersona(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The scheduler task is gone
    #[error("Channel error: scheduler stopped")]
    SchedulerStopped,
}

/// Everything that can go wrong while asking the remote service for a remark
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// No API key configured for a provider that needs one
    #[error("Missing API key for {provider}")]
    MissingApiKey { provider: String },

    /// Network/HTTP errors
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Request timeout
    #[error("Request timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// Non-success status code
    #[error("Server error ({status_code}): {message}")]
    ServerError { status_code: u16, message: String },

    /// Payload did not have the expected shape
    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    /// The service answered but produced no text
    #[error("Empty response from {provider}")]
    EmptyResponse { provider: String },
}

impl GeneratorError {
    /// Maps a reqwest error, keeping timeouts distinct.
    pub fn from_request(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            GeneratorError::Timeout { timeout_secs }
        } else {
            GeneratorError::Network(err)
        }
    }
}

/// Result type alias for companion operations
pub type CompanionResult<T> = anyhow::Result<T>;

/// Extension trait for adding companion-specific context to errors
pub trait ResultExt<T> {
    /// Add file operation context to an error
    fn with_file_context(self, path: &str) -> CompanionResult<T>;

    /// Add configuration context to an error
    fn with_config_context(self, setting: &str) -> CompanionResult<T>;
}

impl<T, E: std::error::Error + Send + Sync + 'static> ResultExt<T> for Result<T, E> {
    fn with_file_context(self, path: &str) -> CompanionResult<T> {
        use anyhow::Context;
        self.map_err(|e| anyhow::anyhow!(e))
            .with_context(|| format!("File operation failed: {}", path))
    }

    fn with_config_context(self, setting: &str) -> CompanionResult<T> {
        use anyhow::Context;
        self.map_err(|e| anyhow::anyhow!(e))
            .with_context(|| format!("Configuration error for: {}", setting))
    }
}
