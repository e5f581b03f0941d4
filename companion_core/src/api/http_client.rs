//! HTTP client construction for generator backends
//!
//! Every client carries an explicit overall timeout.

use reqwest::Client;
use std::time::Duration;

/// Configuration for a generator HTTP client
pub struct GeneratorClientConfig {
    /// Overall request timeout
    pub timeout: Duration,
    /// Connection timeout (default: 5 seconds)
    pub connect_timeout: Duration,
    /// Pool idle timeout (default: 90 seconds)
    pub pool_idle_timeout: Duration,
    /// Max idle connections per host (default: 2)
    pub pool_max_idle_per_host: usize,
}

impl GeneratorClientConfig {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            connect_timeout: Duration::from_secs(5).min(timeout),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 2,
        }
    }
}

/// Create a generator client with the specified configuration
pub fn create_generator_client(config: GeneratorClientConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .pool_idle_timeout(config.pool_idle_timeout)
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .user_agent(format!("cursor-companion/{}", env!("CARGO_PKG_VERSION")))
        .build()
}

/// First `max_chars` characters of an error body, for log-friendly messages.
pub fn truncate_body(body: &str, max_chars: usize) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() > max_chars {
        let head: String = trimmed.chars().take(max_chars).collect();
        format!("{}...", head)
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_timeout_never_exceeds_total() {
        let config = GeneratorClientConfig::with_timeout(Duration::from_secs(2));
        assert_eq!(config.connect_timeout, Duration::from_secs(2));

        let config = GeneratorClientConfig::with_timeout(Duration::from_secs(15));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_create_generator_client() {
        let config = GeneratorClientConfig::with_timeout(Duration::from_secs(15));
        assert!(create_generator_client(config).is_ok());
    }

    #[test]
    fn test_truncate_body() {
        assert_eq!(truncate_body("  short  ", 10), "short");
        assert_eq!(truncate_body("abcdefghij", 4), "abcd...");
    }
}
