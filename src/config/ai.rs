//! Completion service configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::application::CompletionSettings;

/// OpenAI completion configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// OpenAI API key
    pub openai_api_key: Option<String>,

    /// Sent as `OpenAI-Organization` when set
    pub openai_org_id: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Per-call completion timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries on transient failure
    #[serde(default = "default_retries")]
    pub max_retries: u32,

    /// First retry backoff in milliseconds; doubles on every retry
    #[serde(default = "default_retry_base_delay")]
    pub retry_base_delay_ms: u64,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    /// Check if OpenAI is configured
    pub fn has_openai(&self) -> bool {
        self.openai_api_key
            .as_ref()
            .is_some_and(|k| !k.trim().is_empty())
    }

    pub fn completion_settings(&self) -> CompletionSettings {
        CompletionSettings {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_openai() {
            return Err(ValidationError::MissingRequired("STORY_REVIEW__AI__OPENAI_API_KEY"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ValidationError::InvalidTemperature(self.temperature));
        }
        if self.max_tokens == 0 {
            return Err(ValidationError::InvalidMaxTokens);
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.max_retries > MAX_RETRIES {
            return Err(ValidationError::TooManyRetries(self.max_retries));
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_org_id: None,
            model: default_model(),
            base_url: default_base_url(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            retry_base_delay_ms: default_retry_base_delay(),
        }
    }
}

const MAX_RETRIES: u32 = 10;

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_timeout() -> u64 {
    120
}

fn default_retries() -> u32 {
    3
}

fn default_retry_base_delay() -> u64 {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> AiConfig {
        AiConfig {
            openai_api_key: Some("sk-xxx".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_ai_config_defaults() {
        let config = AiConfig::default();
        assert_eq!(config.model, "gpt-4");
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.max_tokens, 1000);
        assert_eq!(config.timeout_secs, 120);
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_timeout_duration() {
        let config = AiConfig {
            timeout_secs: 60,
            ..Default::default()
        };
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_validation_missing_key() {
        assert_eq!(
            AiConfig::default().validate(),
            Err(ValidationError::MissingRequired("STORY_REVIEW__AI__OPENAI_API_KEY"))
        );
        let blank = AiConfig {
            openai_api_key: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_validation_temperature_range() {
        let config = AiConfig {
            temperature: 2.5,
            ..configured()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidTemperature(2.5)));
    }

    #[test]
    fn test_validation_retry_cap() {
        let config = AiConfig {
            max_retries: 11,
            ..configured()
        };
        assert_eq!(config.validate(), Err(ValidationError::TooManyRetries(11)));
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(configured().validate().is_ok());
    }

    #[test]
    fn test_completion_settings() {
        let settings = AiConfig {
            max_tokens: 400,
            temperature: 0.2,
            ..configured()
        }
        .completion_settings();
        assert_eq!(settings.max_tokens, 400);
        assert_eq!(settings.temperature, 0.2);
    }
}
