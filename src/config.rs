//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration files (config/default.toml, config/local.toml)
//! 3. Environment variables (override)

use serde::Deserialize;
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    pub graph: GraphConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 5001)
    pub port: u16,
    /// Origins allowed by CORS; empty allows none
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Database configuration (SQLite only)
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to SQLite database file
    pub path: PathBuf,
}

/// Session configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Session secret key (32+ bytes)
    pub session_secret: String,
    /// Session max age in seconds (default: 604800 = 7 days)
    pub session_max_age: i64,
    /// Mark the session cookie `Secure`
    #[serde(default)]
    pub secure_cookies: bool,
}

/// Bootstrap admin account
///
/// When both `email` and `password` are set, an admin account with that
/// email is created on startup, or an existing account is promoted.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    pub email: Option<String>,
    pub password: Option<String>,
    /// Full name for a newly created admin (default: "Admin")
    #[serde(default = "default_admin_full_name")]
    pub full_name: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            email: None,
            password: None,
            full_name: default_admin_full_name(),
        }
    }
}

fn default_admin_full_name() -> String {
    "Admin".to_string()
}

/// Follow graph behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    /// Serve profile stats from the edge table instead of stored counters
    pub exact_counts: bool,
    /// Recompute every account's projections at startup
    pub reconcile_on_startup: bool,
}

/// Logging configuration
///
/// `RUST_LOG`, when set, replaces the filter built from `level`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl LoggingConfig {
    /// `EnvFilter` directive: the crate at `level`, request traces at debug
    pub fn filter_directive(&self) -> String {
        format!("growathlete={},tower_http=debug", self.level.to_ascii_lowercase())
    }

    pub fn is_json(&self) -> bool {
        self.format == "json"
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (GROWATHLETE__*)
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5001)?
            .set_default("database.path", "data/growathlete.db")?
            .set_default("auth.session_max_age", 604800)?
            .set_default("auth.secure_cookies", false)?
            .set_default("graph.exact_counts", false)?
            .set_default("graph.reconcile_on_startup", false)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            // Load from config/default.toml if it exists
            .add_source(File::with_name("config/default").required(false))
            // Load from config/local.toml if it exists (overrides default)
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables (GROWATHLETE__*)
            .add_source(
                Environment::with_prefix("GROWATHLETE")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.allowed_origins")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    fn validate(&self) -> Result<(), crate::error::AppError> {
        const MIN_SESSION_SECRET_BYTES: usize = 32;

        if self.auth.session_secret.len() < MIN_SESSION_SECRET_BYTES {
            return Err(crate::error::AppError::Config(format!(
                "auth.session_secret must be at least {} bytes",
                MIN_SESSION_SECRET_BYTES
            )));
        }

        if self.auth.session_max_age <= 0 {
            return Err(crate::error::AppError::Config(
                "auth.session_max_age must be greater than 0".to_string(),
            ));
        }

        match (&self.admin.email, &self.admin.password) {
            (Some(_), None) | (None, Some(_)) => {
                return Err(crate::error::AppError::Config(
                    "admin.email and admin.password must be set together".to_string(),
                ));
            }
            _ => {}
        }

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(crate::error::AppError::Config(format!(
                "logging.format must be \"pretty\" or \"json\", got \"{}\"",
                self.logging.format
            )));
        }

        if self.logging.level.parse::<tracing::Level>().is_err() {
            return Err(crate::error::AppError::Config(format!(
                "logging.level must be one of trace, debug, info, warn, error; got \"{}\"",
                self.logging.level
            )));
        }

        Ok(())
    }
}
