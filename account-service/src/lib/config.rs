use std::env;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use config::Map;
use serde::Deserialize;

use crate::domain::errors::DomainError;

const MEMORY_STORE_SCHEME: &str = "memory://";
const MIN_SECRET_BYTES: usize = 32;
/// Ten years; refresh tokens live seven times this.
const MAX_EXPIRATION_HOURS: i64 = 24 * 365 * 10;
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub auto_migrate: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: i64,
}

/// Argon2id cost parameters.
#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Directory for per-account log files; empty disables them
    pub account_log_dir: String,
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    /// 4. Built-in defaults for everything except the database url and jwt secret
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        // Variables without the separator never map onto a section
        let overrides = env::vars()
            .filter(|(key, _)| key.contains(ENV_SEPARATOR))
            .collect::<Map<String, String>>();

        Self::load_from(Path::new("config"), &run_mode, overrides)
    }

    /// Same as [`Config::load`] with explicit file directory, run mode and
    /// environment overrides.
    pub fn load_from(
        directory: &Path,
        run_mode: &str,
        overrides: Map<String, String>,
    ) -> Result<Self, ConfigError> {
        let configuration = ConfigBuilder::builder()
            .set_default("database.max_connections", 5_i64)?
            .set_default("database.auto_migrate", false)?
            .set_default("server.http_port", 8080_i64)?
            .set_default("server.request_timeout_secs", 30_i64)?
            .set_default("jwt.expiration_hours", 24_i64)?
            .set_default("password.memory_kib", 19456_i64)?
            .set_default("password.iterations", 2_i64)?
            .set_default("password.parallelism", 1_i64)?
            .set_default("logging.account_log_dir", "logs")?
            // Start with default configuration
            .add_source(File::from(directory.join("default")).required(false))
            // Layer on environment-specific configuration
            .add_source(File::from(directory.join(run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: DATABASE__URL=postgres://... overrides database.url
            .add_source(
                Environment::default()
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true)
                    .source(Some(overrides)),
            )
            .build()?;

        configuration.try_deserialize()
    }

    /// Reject values the service cannot start with.
    ///
    /// # Errors
    /// * `Configuration` - Names the offending key and what it should be
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.database.url.trim().is_empty() {
            return Err(DomainError::configuration(
                "database.url",
                "a non-empty connection url",
            ));
        }
        if self.database.max_connections == 0 {
            return Err(DomainError::configuration(
                "database.max_connections",
                "a positive integer",
            ));
        }
        if self.jwt.secret.len() < MIN_SECRET_BYTES {
            return Err(DomainError::configuration(
                "jwt.secret",
                "a string of at least 32 bytes",
            ));
        }
        if !(1..=MAX_EXPIRATION_HOURS).contains(&self.jwt.expiration_hours) {
            return Err(DomainError::configuration(
                "jwt.expiration_hours",
                format!("an integer between 1 and {}", MAX_EXPIRATION_HOURS),
            ));
        }
        if self.server.request_timeout_secs == 0 {
            return Err(DomainError::configuration(
                "server.request_timeout_secs",
                "a positive integer",
            ));
        }
        Ok(())
    }

    /// Access token lifetime. Refresh tokens live seven times longer.
    pub fn access_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.jwt.expiration_hours)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database.url.starts_with(MEMORY_STORE_SCHEME)
    }

    pub fn account_log_dir(&self) -> Option<PathBuf> {
        let dir = self.logging.account_log_dir.trim();
        (!dir.is_empty()).then(|| PathBuf::from(dir))
    }
}
