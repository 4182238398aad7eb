//! Configuration loading and types for Storefront.
//!
//! Configuration is read from a YAML file and deserialized into the
//! [`Config`] struct.  Each subsection governs a different part of the
//! system: networking, authentication, document persistence, media
//! uploads, and the generative-AI integration.  Secrets may be
//! overridden by environment variables after loading.

use serde::Deserialize;
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Authentication / token settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Document store settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// External media host settings.
    #[serde(default)]
    pub media: MediaConfig,

    /// Generative-AI endpoint settings.
    #[serde(default)]
    pub ai: AiConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Observability settings (metrics + health probes).
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind host address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Graceful shutdown timeout in seconds.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout: u64,

    /// Maximum request body size in bytes.  Sized so a multipart payload
    /// carrying 4 images at the 5 MB per-file ceiling fits with headroom.
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_timeout: default_shutdown_timeout(),
            max_body_size: default_max_body_size(),
        }
    }
}

/// Authentication settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for signing bearer tokens.
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    /// Token lifetime in days.
    #[serde(default = "default_token_ttl_days")]
    pub token_ttl_days: i64,

    /// Username of the admin account seeded on startup.
    #[serde(default = "default_admin_username")]
    pub admin_username: String,

    /// Initial password for the seeded admin account.  Ignored when the
    /// account already exists.
    #[serde(default = "default_admin_password")]
    pub admin_password: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_ttl_days: default_token_ttl_days(),
            admin_username: default_admin_username(),
            admin_password: default_admin_password(),
        }
    }
}

/// Document store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Backend type: `sqlite` or `memory`.
    #[serde(default = "default_database_backend")]
    pub backend: String,

    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: default_database_backend(),
            path: default_database_path(),
        }
    }
}

/// External media host configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    /// Backend type: `http` (external host) or `memory` (ephemeral).
    #[serde(default = "default_media_backend")]
    pub backend: String,

    /// Upload endpoint base URL of the media host.
    #[serde(default)]
    pub endpoint: String,

    /// API key sent with every upload.
    #[serde(default)]
    pub api_key: String,

    /// Folder prefix under which product images are stored.
    #[serde(default = "default_media_folder")]
    pub folder: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            backend: default_media_backend(),
            endpoint: String::new(),
            api_key: String::new(),
            folder: default_media_folder(),
        }
    }
}

/// Generative-AI endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Base URL of the generative-language API.
    #[serde(default = "default_ai_endpoint")]
    pub endpoint: String,

    /// API key appended to every request.
    #[serde(default)]
    pub api_key: String,

    /// Model name, e.g. `gemini-1.5-flash`.
    #[serde(default = "default_ai_model")]
    pub model: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_ai_endpoint(),
            api_key: String::new(),
            model: default_ai_model(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: text or json.
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    /// Enable Prometheus metrics collection and the `/metrics` endpoint.
    #[serde(default = "default_true")]
    pub metrics: bool,

    /// Enable the `/health` probe.
    #[serde(default = "default_true")]
    pub health_check: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics: true,
            health_check: true,
        }
    }
}

// -- Defaults ----------------------------------------------------------------

fn default_true() -> bool {
    true
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_max_body_size() -> usize {
    25 * 1024 * 1024
}

fn default_jwt_secret() -> String {
    "change-me".to_string()
}

fn default_token_ttl_days() -> i64 {
    7
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_password() -> String {
    "admin123".to_string()
}

fn default_database_backend() -> String {
    "sqlite".to_string()
}

fn default_database_path() -> String {
    "./data/storefront.db".to_string()
}

fn default_media_backend() -> String {
    "http".to_string()
}

fn default_media_folder() -> String {
    "products".to_string()
}

fn default_ai_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_ai_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

// -- Loader ------------------------------------------------------------------

/// Load and parse configuration from a YAML file at `path`, then apply
/// environment-variable overrides for secrets.
pub fn load_config<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    let mut config: Config = serde_yaml::from_str(&contents)?;
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Override secret-bearing fields from environment variables when set.
pub fn apply_env_overrides(config: &mut Config) {
    if let Ok(secret) = std::env::var("STOREFRONT_JWT_SECRET") {
        config.auth.jwt_secret = secret;
    }
    if let Ok(key) = std::env::var("STOREFRONT_AI_API_KEY") {
        config.ai.api_key = key;
    }
    if let Ok(key) = std::env::var("STOREFRONT_MEDIA_API_KEY") {
        config.media.api_key = key;
    }
}
