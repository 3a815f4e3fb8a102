//! Configuration error types

use thiserror::Error;

use crate::domain::extraction::MarkerConfigError;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("Marker configuration failed: {0}")]
    Markers(#[from] MarkerConfigError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Temperature must be between 0 and 2, got {0}")]
    InvalidTemperature(f32),

    #[error("max_tokens must be greater than zero")]
    InvalidMaxTokens,

    #[error("max_retries must be at most 10, got {0}")]
    TooManyRetries(u32),

    #[error("max_concurrency must be at least 1")]
    InvalidConcurrency,

    #[error("Invalid point scale: {0}")]
    InvalidPointScale(String),
}
