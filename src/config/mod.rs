//! Configuration management
//!
//! This module handles loading and parsing configuration for the ActuNews backend.
//! Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Outbound mail configuration
    #[serde(default)]
    pub mail: MailConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database path or URL
    #[serde(default = "default_database_url")]
    pub url: String,
    /// Maximum pooled connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

fn default_database_url() -> String {
    "data/actunews.db".to_string()
}

fn default_max_connections() -> u32 {
    20
}

/// Outbound mail configuration.
///
/// When `smtp_host` is unset the welcome mail is still queued, but delivery
/// fails with a "not configured" error that the mail worker logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default)]
    pub smtp_host: Option<String>,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub smtp_username: Option<String>,
    #[serde(default)]
    pub smtp_password: Option<String>,
    /// Sender address for outbound mail
    #[serde(default = "default_mail_from")]
    pub from: String,
    #[serde(default = "default_welcome_subject")]
    pub welcome_subject: String,
    #[serde(default = "default_welcome_body_html")]
    pub welcome_body_html: String,
    /// Capacity of the outbound mail queue
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: None,
            smtp_port: default_smtp_port(),
            smtp_username: None,
            smtp_password: None,
            from: default_mail_from(),
            welcome_subject: default_welcome_subject(),
            welcome_body_html: default_welcome_body_html(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl MailConfig {
    /// Whether an SMTP relay has been configured
    pub fn is_smtp_configured(&self) -> bool {
        self.smtp_host.as_deref().is_some_and(|h| !h.trim().is_empty())
    }
}

fn default_smtp_port() -> u16 {
    587
}

fn default_mail_from() -> String {
    "noreply@actu.news".to_string()
}

fn default_welcome_subject() -> String {
    "Bienvenue sur notre site Actunews !".to_string()
}

fn default_welcome_body_html() -> String {
    "<p>Bonjour, Bienvenue chez ActuNews !</p>".to_string()
}

fn default_queue_capacity() -> usize {
    100
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

impl Config {
    /// Load configuration from file
    ///
    /// If the file doesn't exist, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with details.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: format_yaml_error(&e),
            })?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Environment variables follow the pattern:
    /// - ACTUNEWS_SERVER_HOST
    /// - ACTUNEWS_SERVER_PORT
    /// - ACTUNEWS_SERVER_CORS_ORIGIN
    /// - ACTUNEWS_DATABASE_URL
    /// - ACTUNEWS_MAIL_SMTP_HOST
    /// - ACTUNEWS_MAIL_SMTP_PORT
    /// - ACTUNEWS_MAIL_SMTP_USERNAME
    /// - ACTUNEWS_MAIL_SMTP_PASSWORD
    /// - ACTUNEWS_MAIL_FROM
    /// - ACTUNEWS_MAIL_QUEUE_CAPACITY
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.mail.queue_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "mail.queue_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("ACTUNEWS_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("ACTUNEWS_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(cors_origin) = std::env::var("ACTUNEWS_SERVER_CORS_ORIGIN") {
            self.server.cors_origin = cors_origin;
        }

        if let Ok(url) = std::env::var("ACTUNEWS_DATABASE_URL") {
            self.database.url = url;
        }

        if let Ok(host) = std::env::var("ACTUNEWS_MAIL_SMTP_HOST") {
            self.mail.smtp_host = Some(host);
        }
        if let Ok(port) = std::env::var("ACTUNEWS_MAIL_SMTP_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.mail.smtp_port = port;
            }
        }
        if let Ok(username) = std::env::var("ACTUNEWS_MAIL_SMTP_USERNAME") {
            self.mail.smtp_username = Some(username);
        }
        if let Ok(password) = std::env::var("ACTUNEWS_MAIL_SMTP_PASSWORD") {
            self.mail.smtp_password = Some(password);
        }
        if let Ok(from) = std::env::var("ACTUNEWS_MAIL_FROM") {
            self.mail.from = from;
        }
        if let Ok(capacity) = std::env::var("ACTUNEWS_MAIL_QUEUE_CAPACITY") {
            if let Ok(capacity) = capacity.parse::<usize>() {
                self.mail.queue_capacity = capacity;
            }
        }
    }
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Env-mutating tests share this lock.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
