//! Shared utilities: configuration and error types.

pub mod config;
pub mod error;

// Available exports via submodules:
// config::{Config, MotionConfig, RemarkConfig, GeneratorConfig, Provider}
// error::{CompanionError, CompanionResult, GeneratorError, ResultExt}
