use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: String,
    #[serde(default = "default_token_env")]
    pub token_env: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_state_file")]
    pub state_file: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse YAML in {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },
    #[error("config validation error: {0}")]
    Validation(String),
    #[error("no scheduler token: set '{0}' in the environment or token in config")]
    MissingToken(String),
}

impl Config {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let path_display = path_ref.display().to_string();
        let text = fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
            path: path_display.clone(),
            source,
        })?;

        let cfg: Config = serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path_display,
            source,
        })?;

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.trim().is_empty() {
            return Err(ConfigError::Validation(
                "server field is required".to_string(),
            ));
        }
        if !self.server.starts_with("http://") && !self.server.starts_with("https://") {
            return Err(ConfigError::Validation(
                "server must be an http:// or https:// URL".to_string(),
            ));
        }
        if self.state_file.trim().is_empty() {
            return Err(ConfigError::Validation(
                "state_file must not be empty".to_string(),
            ));
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "request_timeout_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Environment wins over the inline value so tokens can stay out of the
    /// config file on shared report hosts.
    pub fn resolve_token(&self) -> Result<String, ConfigError> {
        if let Ok(v) = std::env::var(&self.token_env) {
            if !v.trim().is_empty() {
                return Ok(v);
            }
        }
        if let Some(v) = self.token.as_ref().map(|v| v.trim()) {
            if !v.is_empty() {
                return Ok(v.to_string());
            }
        }
        Err(ConfigError::MissingToken(self.token_env.clone()))
    }

    pub fn example_yaml() -> &'static str {
        include_str!("../config.yaml.example")
    }
}

fn default_token_env() -> String {
    "LAVA_TOKEN".to_string()
}

fn default_state_file() -> String {
    "./farm-status.json".to_string()
}

const fn default_request_timeout_ms() -> u64 {
    30_000
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            server: "https://lava.example.org".to_string(),
            token_env: "FARM_STATUS_TEST_TOKEN".to_string(),
            token: None,
            state_file: "./farm-status.json".to_string(),
            request_timeout_ms: 30_000,
        }
    }

    #[test]
    fn valid_config_passes_validation() {
        valid_config().validate().expect("config must validate");
    }

    #[test]
    fn empty_server_is_rejected() {
        let mut cfg = valid_config();
        cfg.server = "  ".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn non_http_server_is_rejected() {
        let mut cfg = valid_config();
        cfg.server = "lava.example.org".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut cfg = valid_config();
        cfg.request_timeout_ms = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn defaults_are_applied_when_fields_are_omitted() {
        let cfg: Config =
            serde_yaml::from_str("server: https://lava.example.org\n").expect("parse");
        assert_eq!(cfg.token_env, "LAVA_TOKEN");
        assert_eq!(cfg.state_file, "./farm-status.json");
        assert_eq!(cfg.request_timeout_ms, 30_000);
        assert!(cfg.token.is_none());
    }

    #[test]
    fn token_resolution_prefers_environment() {
        let mut cfg = valid_config();
        cfg.token_env = "FARM_STATUS_TOKEN_PREFERS_ENV".to_string();
        cfg.token = Some("from-config".to_string());
        std::env::set_var("FARM_STATUS_TOKEN_PREFERS_ENV", "from-env");

        assert_eq!(cfg.resolve_token().expect("token"), "from-env");
        std::env::remove_var("FARM_STATUS_TOKEN_PREFERS_ENV");
    }

    #[test]
    fn token_resolution_falls_back_to_config_value() {
        let mut cfg = valid_config();
        cfg.token_env = "FARM_STATUS_TOKEN_UNSET_12345".to_string();
        cfg.token = Some("from-config".to_string());
        std::env::remove_var("FARM_STATUS_TOKEN_UNSET_12345");

        assert_eq!(cfg.resolve_token().expect("token"), "from-config");
    }

    #[test]
    fn missing_token_everywhere_is_an_error() {
        let mut cfg = valid_config();
        cfg.token_env = "FARM_STATUS_TOKEN_UNSET_67890".to_string();
        cfg.token = None;
        std::env::remove_var("FARM_STATUS_TOKEN_UNSET_67890");

        assert!(matches!(
            cfg.resolve_token(),
            Err(ConfigError::MissingToken(_))
        ));
    }
}
