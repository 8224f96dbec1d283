//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local development.

use std::env;
use std::path::PathBuf;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// SQLite connection URL
    pub database_url: String,
    /// Upper bound on pooled database connections
    pub database_max_connections: u32,
    /// Directory holding the static frontend
    pub static_dir: PathBuf,
    /// Append-only action log file (None disables it)
    pub action_log_path: Option<PathBuf>,
    /// Frontend origin allowed by CORS
    pub frontend_url: String,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            port: 8196,
            database_url: "sqlite::memory:".to_string(),
            database_max_connections: 1,
            static_dir: PathBuf::from("static"),
            action_log_path: None,
            frontend_url: "http://localhost:8196".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let action_log_path = match env::var("ACTION_LOG_PATH") {
            Ok(path) if path.trim().is_empty() => None,
            Ok(path) => Some(PathBuf::from(path.trim())),
            Err(_) => Some(PathBuf::from("hiketracker.log")),
        };

        Ok(Self {
            port: parse_var("PORT", 8196)?,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://hiketracker.db".to_string()),
            database_max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 8)?,
            static_dir: env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("static")),
            action_log_path,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:8196".to_string()),
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1:?}")]
    Invalid(&'static str, String),
}
