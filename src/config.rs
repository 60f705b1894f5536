//! Configuration types.
//!
//! Everything is read from the environment once at startup. The parsing
//! functions take a lookup closure so tests can feed values without touching
//! the process environment.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Placeholder value shipped in sample `.env` files.
const PLACEHOLDER_KEY: &str = "YOUR_KEY_HERE";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind on 0.0.0.0.
    pub port: u16,
    /// Directory for a daily-rolling log file. Stderr only when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            log_dir: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let port = lookup("PORT")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);
        let log_dir = lookup("REPLYWISE_LOG_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Self { port, log_dir }
    }
}

/// Settings for the generative provider and the JSON adapter around it.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Credential for the Gemini API.
    pub api_key: SecretString,
    /// Model name, e.g. `gemini-2.5-flash`.
    pub model: String,
    /// Base URL of the REST endpoint (no trailing slash).
    pub base_url: String,
    /// Upper bound for each outbound request.
    pub request_timeout: Duration,
    /// Whether a malformed completion gets one repair request.
    pub json_repair: bool,
}

impl GenerationConfig {
    /// Build a config with defaults around an explicit key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            json_repair: true,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = match lookup("GEMINI_API_KEY") {
            None => return Err(ConfigError::MissingEnvVar("GEMINI_API_KEY".to_string())),
            Some(key) if key.trim().is_empty() || key.trim() == PLACEHOLDER_KEY => {
                return Err(ConfigError::MissingRequired {
                    key: "GEMINI_API_KEY".to_string(),
                    hint: "Replace the placeholder with a real Gemini API key.".to_string(),
                });
            }
            Some(key) => key.trim().to_string(),
        };

        let mut config = Self::with_api_key(api_key);

        if let Some(model) = lookup("REPLYWISE_MODEL").filter(|s| !s.trim().is_empty()) {
            config.model = model.trim().to_string();
        }

        if let Some(base_url) = lookup("REPLYWISE_GEMINI_BASE_URL").filter(|s| !s.trim().is_empty())
        {
            config.base_url = base_url.trim().trim_end_matches('/').to_string();
        }

        if let Some(raw) = lookup("REPLYWISE_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "REPLYWISE_REQUEST_TIMEOUT_SECS".to_string(),
                message: format!("expected a whole number of seconds, got '{raw}'"),
            })?;
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    key: "REPLYWISE_REQUEST_TIMEOUT_SECS".to_string(),
                    message: "timeout must be greater than zero".to_string(),
                });
            }
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(raw) = lookup("REPLYWISE_JSON_REPAIR") {
            config.json_repair = !matches!(
                raw.trim().to_ascii_lowercase().as_str(),
                "0" | "false" | "no" | "off"
            );
        }

        Ok(config)
    }
}
