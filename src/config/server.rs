//! HTTP listener settings

use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

use super::error::ValidationError;

/// Longest request a review round may hold the connection open.
const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Where and how the review API listens.
///
/// Every field has a default, so an empty `[server]` table is valid.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Production switches logging to JSON.
    pub environment: Environment,
    /// Filter used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Whole-request budget; covers every persona call of a round.
    pub request_timeout_secs: u64,
    /// Comma-separated browser origins; `None` disables CORS.
    pub cors_origins: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ValidationError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|_| ValidationError::InvalidBindAddress(addr))
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cors_origins_list(&self) -> Vec<String> {
        self.cors_origins
            .iter()
            .flat_map(|origins| origins.split(','))
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        if !(1..=MAX_REQUEST_TIMEOUT_SECS).contains(&self.request_timeout_secs) {
            return Err(ValidationError::InvalidTimeout);
        }
        self.socket_addr().map(|_| ())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            environment: Environment::Development,
            log_level: "info,story_review=debug".to_string(),
            request_timeout_secs: 180,
            cors_origins: Some("http://localhost:5173".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listening_on(host: &str, port: u16) -> ServerConfig {
        ServerConfig {
            host: host.to_string(),
            port,
            ..Default::default()
        }
    }

    #[test]
    fn defaults_leave_room_for_a_full_review_round() {
        let config = ServerConfig::default();
        assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:8080");
        assert_eq!(config.request_timeout(), Duration::from_secs(180));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn host_and_port_form_the_bind_address() {
        let addr = listening_on("127.0.0.1", 3000).socket_addr().unwrap();
        assert_eq!(addr, SocketAddr::from(([127, 0, 0, 1], 3000)));
    }

    #[test]
    fn hostname_is_not_a_bind_address() {
        assert_eq!(
            listening_on("reviews.local", 8080).validate(),
            Err(ValidationError::InvalidBindAddress("reviews.local:8080".to_string()))
        );
    }

    #[test]
    fn zero_port_is_rejected() {
        assert_eq!(listening_on("0.0.0.0", 0).validate(), Err(ValidationError::InvalidPort));
    }

    #[test]
    fn request_timeout_is_bounded() {
        for secs in [0, MAX_REQUEST_TIMEOUT_SECS + 1] {
            let config = ServerConfig {
                request_timeout_secs: secs,
                ..Default::default()
            };
            assert_eq!(config.validate(), Err(ValidationError::InvalidTimeout));
        }
    }

    #[test]
    fn only_production_is_production() {
        let mut config = ServerConfig::default();
        assert!(!config.is_production());
        config.environment = Environment::Production;
        assert!(config.is_production());
    }

    #[test]
    fn blank_origins_are_dropped() {
        let config = ServerConfig {
            cors_origins: Some(" https://a.example ,, https://b.example ".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.cors_origins_list(),
            vec!["https://a.example", "https://b.example"]
        );

        let closed = ServerConfig {
            cors_origins: None,
            ..Default::default()
        };
        assert!(closed.cors_origins_list().is_empty());
    }
}
