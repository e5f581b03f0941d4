//! Log file setup. The terminal belongs to the TUI, so everything goes to
//! `~/.companion/logs/latest.log`.

use anyhow::{anyhow, Result};
use companion_core::Config;
use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV_VAR: &str = "COMPANION_LOG";

pub fn default_directive(debug: bool) -> &'static str {
    if debug {
        "companion_core=debug,companion_cli=debug,info"
    } else {
        "info"
    }
}

/// Installs the global subscriber and returns the log file path.
pub fn init_global_logger(debug: bool) -> Result<PathBuf> {
    let logs_dir = Config::get_config_dir().join("logs");
    fs::create_dir_all(&logs_dir)?;
    let log_file_path = logs_dir.join("latest.log");
    let file = File::create(&log_file_path)?;

    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("failed to install log subscriber: {}", e))?;

    Ok(log_file_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_parses() {
        for debug in [false, true] {
            assert!(default_directive(debug).parse::<EnvFilter>().is_ok());
        }
        assert!(default_directive(true).contains("companion_core=debug"));
    }
}
