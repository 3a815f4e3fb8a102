//! Application configuration module
//!
//! Configuration is loaded from environment variables (and an optional `.env`
//! file) using the `config` and `dotenvy` crates. Variables use the
//! `STORY_REVIEW` prefix and nested values are separated by `__`.
//!
//! # Example
//!
//! ```no_run
//! use story_review::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {:?}", config.server.socket_addr());
//! ```

mod ai;
mod error;
mod server;
mod workflow;

pub use ai::AiConfig;
pub use error::{ConfigError, ValidationError};
pub use server::{Environment, ServerConfig};
pub use workflow::WorkflowConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults; only the OpenAI key must be supplied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Completion service configuration
    #[serde(default)]
    pub ai: AiConfig,

    /// Review workflow tuning
    #[serde(default)]
    pub workflow: WorkflowConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Environment Variable Format
    ///
    /// - `STORY_REVIEW__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `STORY_REVIEW__AI__OPENAI_API_KEY=...` -> `ai.openai_api_key = ...`
    /// - `STORY_REVIEW__WORKFLOW__POINT_SCALE=1,2,3,5` -> `workflow.point_scale`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("STORY_REVIEW")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("workflow.point_scale"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.ai.validate()?;
        self.workflow.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::RejectionPolicy;
    use crate::domain::estimation::EstimationUnit;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "STORY_REVIEW__AI__OPENAI_API_KEY",
        "STORY_REVIEW__SERVER__PORT",
        "STORY_REVIEW__SERVER__ENVIRONMENT",
        "STORY_REVIEW__WORKFLOW__MAX_CONCURRENCY",
        "STORY_REVIEW__WORKFLOW__DEFAULT_UNIT",
        "STORY_REVIEW__WORKFLOW__REJECTION_POLICY",
        "STORY_REVIEW__WORKFLOW__POINT_SCALE",
    ];

    fn set_minimal_env() {
        env::set_var("STORY_REVIEW__AI__OPENAI_API_KEY", "sk-test-xxx");
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.ai.openai_api_key.as_deref(), Some("sk-test-xxx"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_server_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.workflow.max_concurrency, 8);
    }

    #[test]
    fn test_is_production() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("STORY_REVIEW__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        assert!(result.unwrap().is_production());
    }

    #[test]
    fn test_custom_server_port() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("STORY_REVIEW__SERVER__PORT", "3000");
        let result = AppConfig::load();
        clear_env();

        assert_eq!(result.unwrap().server.port, 3000);
    }

    #[test]
    fn test_workflow_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("STORY_REVIEW__WORKFLOW__MAX_CONCURRENCY", "3");
        env::set_var("STORY_REVIEW__WORKFLOW__DEFAULT_UNIT", "story_points");
        env::set_var("STORY_REVIEW__WORKFLOW__REJECTION_POLICY", "return_to_input");
        env::set_var("STORY_REVIEW__WORKFLOW__POINT_SCALE", "1,2,4,8");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.workflow.max_concurrency, 3);
        assert_eq!(config.workflow.default_unit, EstimationUnit::StoryPoints);
        assert_eq!(config.workflow.rejection_policy, RejectionPolicy::ReturnToInput);
        assert_eq!(config.workflow.point_scale, vec![1.0, 2.0, 4.0, 8.0]);
    }

    #[test]
    fn test_missing_key_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();

        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired(_))
        ));
    }
}
