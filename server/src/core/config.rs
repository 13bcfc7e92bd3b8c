use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::utils::file::{overlay_config_path, profile_config_path};

use super::cli::CliConfig;
use super::constants::{
    DEFAULT_HOST, DEFAULT_PORT, POSTGRES_DEFAULT_ACQUIRE_TIMEOUT_SECS,
    POSTGRES_DEFAULT_IDLE_TIMEOUT_SECS, POSTGRES_DEFAULT_MAX_CONNECTIONS,
    POSTGRES_DEFAULT_MAX_LIFETIME_SECS, POSTGRES_DEFAULT_MIN_CONNECTIONS, POSTGRES_DEFAULT_PORT,
    POSTGRES_DEFAULT_STATEMENT_TIMEOUT_SECS,
};

// =============================================================================
// SSL Mode Enum
// =============================================================================

/// TLS policy for the PostgreSQL connection
///
/// `prefer` matches managed databases (e.g. RDS) that offer TLS with
/// certificates the client does not verify.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SslMode {
    Disable,
    #[default]
    Prefer,
    Require,
}

impl fmt::Display for SslMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SslMode::Disable => write!(f, "disable"),
            SslMode::Prefer => write!(f, "prefer"),
            SslMode::Require => write!(f, "require"),
        }
    }
}

// =============================================================================
// File Config Structs (JSON deserialization)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// PostgreSQL configuration section (from JSON config file)
///
/// Either `url` or the discrete connection fields may be given; `url` wins
/// when both are present.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PostgresFileConfig {
    /// PostgreSQL connection URL (or use TIDEWATCH_POSTGRES_URL env var)
    pub url: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    pub ssl_mode: Option<SslMode>,
    /// Maximum number of connections in the pool (default: 10)
    pub max_connections: Option<u32>,
    /// Minimum number of connections to keep warm (default: 1)
    pub min_connections: Option<u32>,
    /// Connection acquire timeout in seconds (default: 30)
    pub acquire_timeout_secs: Option<u64>,
    /// Idle connection timeout in seconds (default: 600)
    pub idle_timeout_secs: Option<u64>,
    /// Max connection lifetime in seconds (default: 1800)
    pub max_lifetime_secs: Option<u64>,
    /// Statement timeout in seconds, 0 to disable (default: 120)
    pub statement_timeout_secs: Option<u64>,
}

/// Database configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct DatabaseFileConfig {
    pub postgres: Option<PostgresFileConfig>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub database: Option<DatabaseFileConfig>,
    pub debug: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

/// Take `other` when it is set, keep `current` otherwise
fn overlay<T>(current: &mut Option<T>, other: Option<T>, field: &str) {
    if other.is_some() {
        tracing::trace!(field, "Merging config field");
        *current = other;
    }
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            overlay(&mut current.host, server.host, "server.host");
            overlay(&mut current.port, server.port, "server.port");
        }

        if let Some(postgres) = other.database.and_then(|d| d.postgres) {
            let current = self
                .database
                .get_or_insert_with(DatabaseFileConfig::default)
                .postgres
                .get_or_insert_with(PostgresFileConfig::default);
            overlay(&mut current.url, postgres.url, "database.postgres.url");
            overlay(&mut current.host, postgres.host, "database.postgres.host");
            overlay(&mut current.port, postgres.port, "database.postgres.port");
            overlay(&mut current.user, postgres.user, "database.postgres.user");
            overlay(
                &mut current.password,
                postgres.password,
                "database.postgres.password",
            );
            overlay(
                &mut current.database,
                postgres.database,
                "database.postgres.database",
            );
            overlay(
                &mut current.ssl_mode,
                postgres.ssl_mode,
                "database.postgres.ssl_mode",
            );
            overlay(
                &mut current.max_connections,
                postgres.max_connections,
                "database.postgres.max_connections",
            );
            overlay(
                &mut current.min_connections,
                postgres.min_connections,
                "database.postgres.min_connections",
            );
            overlay(
                &mut current.acquire_timeout_secs,
                postgres.acquire_timeout_secs,
                "database.postgres.acquire_timeout_secs",
            );
            overlay(
                &mut current.idle_timeout_secs,
                postgres.idle_timeout_secs,
                "database.postgres.idle_timeout_secs",
            );
            overlay(
                &mut current.max_lifetime_secs,
                postgres.max_lifetime_secs,
                "database.postgres.max_lifetime_secs",
            );
            overlay(
                &mut current.statement_timeout_secs,
                postgres.statement_timeout_secs,
                "database.postgres.statement_timeout_secs",
            );
        }

        overlay(&mut self.debug, other.debug, "debug");
    }
}

// =============================================================================
// Runtime Config Structs (final merged configuration)
// =============================================================================

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// PostgreSQL configuration (final/runtime)
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Connection URL; takes precedence over the discrete fields
    pub url: Option<String>,
    pub host: Option<String>,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    pub ssl_mode: SslMode,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to keep warm
    pub min_connections: u32,
    /// Connection acquire timeout in seconds
    pub acquire_timeout_secs: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_secs: u64,
    /// Max connection lifetime in seconds
    pub max_lifetime_secs: u64,
    /// Statement timeout in seconds (0 = disabled)
    pub statement_timeout_secs: u64,
}

impl PostgresConfig {
    /// Whether a connection target (URL or host) has been configured
    pub fn has_target(&self) -> bool {
        self.url.as_deref().is_some_and(|u| !u.is_empty())
            || self.host.as_deref().is_some_and(|h| !h.is_empty())
    }
}

/// Database configuration (final/runtime)
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub postgres: PostgresConfig,
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub debug: bool,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.tidewatch/tidewatch.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        if let Some(profile_path) = profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        let overlay_path = overlay_config_path(cli.config.as_deref())?;

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        let config = Self::from_layers(cli, file_config);
        config.validate()?;
        Ok(config)
    }

    /// Layer configs: defaults -> file config -> CLI/env overrides
    fn from_layers(cli: &CliConfig, file_config: FileConfig) -> Self {
        let file_server = file_config.server.unwrap_or_default();
        let file_postgres = file_config
            .database
            .and_then(|d| d.postgres)
            .unwrap_or_default();

        let host = cli
            .host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT);

        let postgres = PostgresConfig {
            url: cli.postgres_url.clone().or(file_postgres.url),
            host: file_postgres.host,
            port: file_postgres.port.unwrap_or(POSTGRES_DEFAULT_PORT),
            user: file_postgres.user,
            password: file_postgres.password,
            database: file_postgres.database,
            ssl_mode: file_postgres.ssl_mode.unwrap_or_default(),
            max_connections: file_postgres
                .max_connections
                .unwrap_or(POSTGRES_DEFAULT_MAX_CONNECTIONS),
            min_connections: file_postgres
                .min_connections
                .unwrap_or(POSTGRES_DEFAULT_MIN_CONNECTIONS),
            acquire_timeout_secs: file_postgres
                .acquire_timeout_secs
                .unwrap_or(POSTGRES_DEFAULT_ACQUIRE_TIMEOUT_SECS),
            idle_timeout_secs: file_postgres
                .idle_timeout_secs
                .unwrap_or(POSTGRES_DEFAULT_IDLE_TIMEOUT_SECS),
            max_lifetime_secs: file_postgres
                .max_lifetime_secs
                .unwrap_or(POSTGRES_DEFAULT_MAX_LIFETIME_SECS),
            statement_timeout_secs: file_postgres
                .statement_timeout_secs
                .unwrap_or(POSTGRES_DEFAULT_STATEMENT_TIMEOUT_SECS),
        };

        // debug: CLI/env flag takes precedence, then file config, default false
        let debug = cli.debug || file_config.debug.unwrap_or(false);

        Self {
            server: ServerConfig { host, port },
            database: DatabaseConfig { postgres },
            debug,
        }
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            anyhow::bail!("Configuration error: server.host must not be empty");
        }

        if self.server.port == 0 {
            anyhow::bail!("Configuration error: server.port must be greater than 0");
        }

        let postgres = &self.database.postgres;
        if !postgres.has_target() {
            anyhow::bail!(
                "Configuration error: database.postgres.url or database.postgres.host is required \
                 (or set TIDEWATCH_POSTGRES_URL)"
            );
        }

        if postgres.max_connections == 0 {
            anyhow::bail!(
                "Configuration error: database.postgres.max_connections must be greater than 0"
            );
        }

        if postgres.min_connections > postgres.max_connections {
            anyhow::bail!(
                "Configuration error: database.postgres.min_connections ({}) exceeds max_connections ({})",
                postgres.min_connections,
                postgres.max_connections
            );
        }

        if postgres.statement_timeout_secs == 0 {
            tracing::warn!(
                "database.postgres.statement_timeout_secs is 0, long-running aggregations will not be cancelled"
            );
        }

        if is_all_interfaces(&self.server.host) {
            tracing::debug!(host = %self.server.host, "Binding to all network interfaces");
        }

        Ok(())
    }
}

/// Check if host binds to all network interfaces
pub(crate) fn is_all_interfaces(host: &str) -> bool {
    matches!(host, "0.0.0.0" | "::" | "[::]")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_with_url() -> CliConfig {
        CliConfig {
            postgres_url: Some("postgres://obis@localhost/obis".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_ssl_mode_serde() {
        let mode: SslMode = serde_json::from_str(r#""require""#).unwrap();
        assert_eq!(mode, SslMode::Require);
        assert_eq!(SslMode::default(), SslMode::Prefer);
        assert_eq!(SslMode::Disable.to_string(), "disable");
    }

    #[test]
    fn test_file_config_parse_full() {
        let json = r#"{
            "server": { "host": "0.0.0.0", "port": 8081 },
            "database": {
                "postgres": {
                    "host": "db.example.com",
                    "port": 5433,
                    "user": "obis",
                    "password": "secret",
                    "database": "marine",
                    "ssl_mode": "prefer",
                    "max_connections": 4
                }
            },
            "debug": true
        }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();

        let server = config.server.as_ref().unwrap();
        assert_eq!(server.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(server.port, Some(8081));

        let postgres = config.database.as_ref().unwrap().postgres.as_ref().unwrap();
        assert_eq!(postgres.host.as_deref(), Some("db.example.com"));
        assert_eq!(postgres.port, Some(5433));
        assert_eq!(postgres.ssl_mode, Some(SslMode::Prefer));
        assert_eq!(postgres.max_connections, Some(4));
        assert_eq!(config.debug, Some(true));
    }

    #[test]
    fn test_file_config_parse_empty() {
        let config: FileConfig = serde_json::from_str("{}").unwrap();
        assert!(config.server.is_none());
        assert!(config.database.is_none());
    }

    #[test]
    fn test_file_config_parse_extra_fields() {
        let json = r#"{ "server": { "host": "localhost" }, "unknown_field": 123 }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.extra.get("unknown_field").unwrap(), 123);
    }

    #[test]
    fn test_file_config_merge() {
        let mut base: FileConfig = serde_json::from_str(
            r#"{
                "server": { "host": "127.0.0.1", "port": 8080 },
                "database": { "postgres": { "host": "base-host", "user": "base" } }
            }"#,
        )
        .unwrap();
        let other: FileConfig = serde_json::from_str(
            r#"{
                "server": { "port": 9090 },
                "database": { "postgres": { "host": "other-host" } },
                "debug": true
            }"#,
        )
        .unwrap();

        base.merge(other);

        let server = base.server.as_ref().unwrap();
        assert_eq!(server.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(server.port, Some(9090));
        let postgres = base.database.as_ref().unwrap().postgres.as_ref().unwrap();
        assert_eq!(postgres.host.as_deref(), Some("other-host"));
        assert_eq!(postgres.user.as_deref(), Some("base"));
        assert_eq!(base.debug, Some(true));
    }

    #[test]
    fn test_app_config_defaults() {
        let config = AppConfig::from_layers(&cli_with_url(), FileConfig::default());

        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert!(!config.debug);
        let postgres = &config.database.postgres;
        assert_eq!(postgres.port, POSTGRES_DEFAULT_PORT);
        assert_eq!(postgres.max_connections, POSTGRES_DEFAULT_MAX_CONNECTIONS);
        assert_eq!(postgres.ssl_mode, SslMode::Prefer);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_app_config_cli_overrides_file() {
        let file: FileConfig = serde_json::from_str(
            r#"{
                "server": { "host": "10.0.0.1", "port": 7000 },
                "database": { "postgres": { "url": "postgres://file/obis" } }
            }"#,
        )
        .unwrap();
        let cli = CliConfig {
            host: Some("cli.host".to_string()),
            port: Some(3000),
            debug: true,
            config: None,
            postgres_url: Some("postgres://cli/obis".to_string()),
        };

        let config = AppConfig::from_layers(&cli, file);

        assert_eq!(config.server.host, "cli.host");
        assert_eq!(config.server.port, 3000);
        assert!(config.debug);
        assert_eq!(
            config.database.postgres.url.as_deref(),
            Some("postgres://cli/obis")
        );
    }

    #[test]
    fn test_app_config_validation_requires_database_target() {
        let config = AppConfig::from_layers(&CliConfig::default(), FileConfig::default());
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("database.postgres.url"));
    }

    #[test]
    fn test_app_config_validation_discrete_host_is_enough() {
        let file: FileConfig =
            serde_json::from_str(r#"{ "database": { "postgres": { "host": "rds.local" } } }"#)
                .unwrap();
        let config = AppConfig::from_layers(&CliConfig::default(), file);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_app_config_validation_server_port_zero() {
        let cli = CliConfig {
            port: Some(0),
            ..cli_with_url()
        };
        let config = AppConfig::from_layers(&cli, FileConfig::default());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_app_config_validation_empty_host() {
        let cli = CliConfig {
            host: Some(String::new()),
            ..cli_with_url()
        };
        let config = AppConfig::from_layers(&cli, FileConfig::default());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_app_config_validation_pool_bounds() {
        let file: FileConfig = serde_json::from_str(
            r#"{ "database": { "postgres": { "min_connections": 8, "max_connections": 2 } } }"#,
        )
        .unwrap();
        let config = AppConfig::from_layers(&cli_with_url(), file);
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("min_connections"));
    }

    #[test]
    fn test_is_all_interfaces() {
        assert!(is_all_interfaces("0.0.0.0"));
        assert!(is_all_interfaces("::"));
        assert!(is_all_interfaces("[::]"));
        assert!(!is_all_interfaces("127.0.0.1"));
        assert!(!is_all_interfaces("localhost"));
    }
}
