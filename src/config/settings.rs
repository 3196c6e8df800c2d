//! Application settings and configuration structures.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Server configuration (host, port)
    pub server: ServerSettings,

    /// Database configuration (PostgreSQL)
    pub database: DatabaseSettings,

    /// Repository backend selection
    pub storage: StorageSettings,

    /// CORS configuration
    pub cors: CorsSettings,

    /// Log output configuration
    pub log: LogSettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Server binding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to (e.g., "0.0.0.0")
    pub host: String,

    /// Port number to listen on
    pub port: u16,
}

/// PostgreSQL database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Database connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections to maintain
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    pub acquire_timeout: u64,

    /// Apply pending migrations on startup
    pub run_migrations: bool,
}

/// Where repositories keep their data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub backend: StorageBackend,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    /// Allowed origins (comma-separated in env)
    pub allowed_origins: Vec<String>,
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Logging configuration. `RUST_LOG` still wins over `filter`.
#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    pub format: LogFormat,

    /// Default `EnvFilter` directives
    pub filter: String,
}

/// Filter used when neither `RUST_LOG` nor `log.filter` is set.
pub const DEFAULT_LOG_FILTER: &str = "info,game_store=debug,sqlx=warn,tower_http=debug";

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. Built-in defaults
    /// 2. config/default.toml (base configuration)
    /// 3. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 4. `APP__*` environment variables
    /// 5. `SERVER_HOST`, `SERVER_PORT` and `DATABASE_URL` (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed,
    /// or if the postgres backend is selected without a database URL.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        // Determine the running environment
        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        let settings: Self = Self::defaults(&environment)?
            // Load from config files
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // APP__SERVER__PORT=3000 -> server.port = 3000
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            // Map simple environment variables
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .build()?
            .try_deserialize()?;

        settings.validate()
    }

    fn defaults(
        environment: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("environment", environment)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.url", "")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout", 30)?
            .set_default("database.run_migrations", true)?
            .set_default("storage.backend", "postgres")?
            .set_default("cors.allowed_origins", vec!["http://localhost:3000"])?
            .set_default("log.format", "pretty")?
            .set_default("log.filter", DEFAULT_LOG_FILTER)
    }

    /// Reject combinations the application cannot start with.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.storage.backend == StorageBackend::Postgres && self.database.url.trim().is_empty() {
            return Err(ConfigError::Message(
                "database.url (or DATABASE_URL) is required for the postgres storage backend"
                    .into(),
            ));
        }
        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Message(format!(
                "database.min_connections ({}) exceeds database.max_connections ({})",
                self.database.min_connections, self.database.max_connections
            )));
        }
        Ok(self)
    }

    /// Get the full server address as a string.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl ServerSettings {
    /// Get the socket address for binding.
    pub fn socket_addr(&self) -> Result<std::net::SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(backend: StorageBackend, url: &str) -> Settings {
        let mut settings: Settings = Settings::defaults("test")
            .and_then(|b| b.build())
            .and_then(|c| c.try_deserialize())
            .unwrap();
        settings.storage.backend = backend;
        settings.database.url = url.into();
        settings
    }

    #[test]
    fn test_defaults_deserialize() {
        let settings = settings(StorageBackend::Memory, "");
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.log.format, LogFormat::Pretty);
        assert_eq!(settings.log.filter, DEFAULT_LOG_FILTER);
        assert_eq!(settings.environment, "test");
    }

    #[test]
    fn test_postgres_requires_url() {
        assert!(settings(StorageBackend::Postgres, " ").validate().is_err());
        assert!(settings(StorageBackend::Postgres, "postgres://localhost/store")
            .validate()
            .is_ok());
        assert!(settings(StorageBackend::Memory, "").validate().is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let mut settings = settings(StorageBackend::Memory, "");
        settings.server.host = "127.0.0.1".into();
        settings.server.port = 8080;
        assert_eq!(settings.server.socket_addr().unwrap().port(), 8080);

        settings.server.host = "not a host".into();
        assert!(settings.server.socket_addr().is_err());
    }
}
