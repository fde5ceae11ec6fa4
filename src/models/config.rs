//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Environment variable overriding `database.path`.
pub const DB_PATH_ENV: &str = "DB_PATH";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Registrar endpoint and HTTP behavior
    #[serde(default)]
    pub registrar: RegistrarConfig,

    /// Store connection settings
    #[serde(default)]
    pub database: DatabaseConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        if let Ok(path) = std::env::var(DB_PATH_ENV) {
            if !path.trim().is_empty() {
                self.database.path = PathBuf::from(path);
            }
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.registrar.endpoint)?;
        if self.registrar.user_agent.trim().is_empty() {
            return Err(AppError::config("registrar.user_agent is empty"));
        }
        if self.registrar.timeout_secs == 0 {
            return Err(AppError::config("registrar.timeout_secs must be > 0"));
        }
        if self.database.path.as_os_str().is_empty() {
            return Err(AppError::config("database.path is empty"));
        }
        Ok(())
    }
}

/// Registrar schedule endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrarConfig {
    /// Course schedule search endpoint (POST)
    #[serde(default = "defaults::endpoint")]
    pub endpoint: String,

    /// Request body template with `{year}` and `{term}` placeholders
    #[serde(default = "defaults::template_path")]
    pub template_path: PathBuf,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for RegistrarConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::endpoint(),
            template_path: defaults::template_path(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// SQLite store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database file path
    #[serde(default = "defaults::db_path")]
    pub path: PathBuf,

    /// How long a write waits on a locked database
    #[serde(default = "defaults::busy_timeout")]
    pub busy_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: defaults::db_path(),
            busy_timeout_secs: defaults::busy_timeout(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    pub fn endpoint() -> String {
        "https://sis-ssb-prod.uga.edu/PROD/bwckschd.p_get_crse_unsec".into()
    }
    pub fn template_path() -> PathBuf {
        PathBuf::from("data/schedule_request.txt")
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; course-review/0.1)".into()
    }
    pub fn timeout() -> u64 {
        60
    }
    pub fn db_path() -> PathBuf {
        PathBuf::from("course_review.db")
    }
    pub fn busy_timeout() -> u64 {
        5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_endpoint() {
        let mut config = Config::default();
        config.registrar.endpoint = "not a url".to_string();
        assert!(matches!(config.validate(), Err(AppError::Url(_))));
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.registrar.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.registrar.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_db_path() {
        let mut config = Config::default();
        config.database.path = PathBuf::new();
        assert!(matches!(
            config.validate(),
            Err(AppError::Config(msg)) if msg.contains("database.path")
        ));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [database]
            path = "/tmp/reviews.db"
            "#,
        )
        .unwrap();
        assert_eq!(config.database.path, PathBuf::from("/tmp/reviews.db"));
        assert_eq!(config.database.busy_timeout_secs, 5);
        assert_eq!(config.registrar.timeout_secs, 60);
    }

    #[test]
    fn load_or_default_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("missing.toml"));
        assert_eq!(config.registrar.endpoint, defaults::endpoint());
    }
}
