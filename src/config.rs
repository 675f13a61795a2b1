//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and `MINISTRY_*` environment overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::auth::token::{DEFAULT_TTL_DAYS, MAX_TTL_DAYS};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Empty means any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Session and permission settings
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Check the caller's rank on every mutation
    #[serde(default = "default_enforce_roles")]
    pub enforce_roles: bool,

    /// Signs session tokens when set
    #[serde(default)]
    pub token_secret: Option<String>,

    #[serde(default = "default_token_ttl")]
    pub token_ttl_days: i64,

    /// Mark the session cookie `Secure`
    #[serde(default)]
    pub secure_cookies: bool,
}

fn default_enforce_roles() -> bool {
    true
}

fn default_token_ttl() -> i64 {
    DEFAULT_TTL_DAYS
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enforce_roles: default_enforce_roles(),
            token_secret: None,
            token_ttl_days: default_token_ttl(),
            secure_cookies: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        config.validate().map_err(|error| ConfigError::Invalid {
            path: path.to_path_buf(),
            error,
        })?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        if !(1..=MAX_TTL_DAYS).contains(&self.auth.token_ttl_days) {
            return Err(format!(
                "auth.token_ttl_days must be between 1 and {}, got {}",
                MAX_TTL_DAYS, self.auth.token_ttl_days
            ));
        }
        Ok(())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("ministry").join("config.toml")),
            Some(PathBuf::from("/etc/ministry/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply `MINISTRY_*` overrides from any variable source
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // API overrides
        if let Some(host) = var("MINISTRY_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = var("MINISTRY_API_PORT").and_then(|p| p.parse().ok()) {
            self.api.port = port;
        }

        // Auth overrides
        if let Some(secret) = var("MINISTRY_TOKEN_SECRET") {
            self.auth.token_secret = Some(secret).filter(|s| !s.is_empty());
        }
        if let Some(enforce) = var("MINISTRY_ENFORCE_ROLES").and_then(|v| parse_flag(&v)) {
            self.auth.enforce_roles = enforce;
        }
        if let Some(secure) = var("MINISTRY_SECURE_COOKIES").and_then(|v| parse_flag(&v)) {
            self.auth.secure_cookies = secure;
        }

        // Logging overrides
        if let Some(level) = var("MINISTRY_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("MINISTRY_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid config file {path:?}: {error}")]
    Invalid { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Ministry portal configuration
#
# Environment variables override these settings:
# - MINISTRY_API_HOST
# - MINISTRY_API_PORT
# - MINISTRY_TOKEN_SECRET
# - MINISTRY_ENFORCE_ROLES
# - MINISTRY_SECURE_COOKIES
# - MINISTRY_LOG_LEVEL
# - MINISTRY_LOG_FORMAT

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 3000

# Allowed CORS origins (empty allows any origin)
cors_origins = []

# Request timeout in seconds
request_timeout_secs = 30

[auth]
# Reject mutations from callers whose rank does not allow them
enforce_roles = true

# Secret used to sign session tokens (unsigned when unset)
# token_secret = "change-me"

# Session lifetime in days
token_ttl_days = 30

# Send the session cookie only over HTTPS
secure_cookies = false

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
