use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub const CURRENT_CONFIG_VERSION: &str = "v1";

fn default_config_version() -> String {
    CURRENT_CONFIG_VERSION.to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_token_ttl_hours() -> i64 {
    24 * 7
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(default)]
pub struct Config {
    pub config_version: String,
    /// Signing secret for session tokens. Generated and persisted on first
    /// start when absent.
    pub jwt_secret: Option<String>,
    pub token_ttl_hours: i64,
    pub host: String,
    pub port: Option<u16>,
    /// Marks the session cookie `Secure`; enable behind TLS.
    pub secure_cookies: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            jwt_secret: None,
            token_ttl_hours: default_token_ttl_hours(),
            host: default_host(),
            port: None,
            secure_cookies: false,
        }
    }
}

impl Config {
    /// Parses a raw config file, falling back to defaults when the file is
    /// malformed or from an incompatible version.
    pub fn from_raw(raw: &str) -> Self {
        match serde_json::from_str::<Config>(raw) {
            Ok(config) if config.config_version == CURRENT_CONFIG_VERSION => config,
            Ok(config) => {
                tracing::warn!(
                    version = %config.config_version,
                    "Unknown config version, re-initializing with defaults"
                );
                Self {
                    jwt_secret: config.jwt_secret,
                    ..Self::default()
                }
            }
            Err(err) => {
                tracing::warn!("Failed to parse config file, using defaults: {}", err);
                Self::default()
            }
        }
    }

    pub fn normalized(mut self) -> Self {
        self.config_version = CURRENT_CONFIG_VERSION.to_string();
        if self.token_ttl_hours <= 0 {
            self.token_ttl_hours = default_token_ttl_hours();
        }
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_raw_falls_back_to_defaults() {
        let config = Config::from_raw("{not json");
        assert_eq!(config.config_version, CURRENT_CONFIG_VERSION);
        assert!(config.jwt_secret.is_none());
    }

    #[test]
    fn unknown_version_keeps_secret() {
        let config = Config::from_raw(
            r#"{"config_version":"v0","jwt_secret":"abc","token_ttl_hours":1}"#,
        );
        assert_eq!(config.config_version, CURRENT_CONFIG_VERSION);
        assert_eq!(config.jwt_secret.as_deref(), Some("abc"));
        assert_eq!(config.token_ttl_hours, default_token_ttl_hours());
    }

    #[test]
    fn normalized_repairs_bad_values() {
        let config = Config {
            token_ttl_hours: 0,
            host: "  ".to_string(),
            ..Config::default()
        }
        .normalized();
        assert_eq!(config.token_ttl_hours, default_token_ttl_hours());
        assert_eq!(config.host, "127.0.0.1");
    }
}
