//! PostgreSQL database service
//!
//! Owns the connection pool and executes compiled statements. Rows come back
//! as JSON objects by wrapping each statement in `row_to_json`, so callers
//! decode them into their own DTOs with serde.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::ConnectOptions;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::types::Json;
use tracing::log::LevelFilter;

pub use sqlx::PgPool;

use crate::core::config::{PostgresConfig, SslMode};
use crate::data::error::DataError;
use crate::data::executor::{QueryExecutor, Row};
use crate::data::sql::{SqlValue, Statement};

/// Tables the API reads from
pub const REQUIRED_TABLES: &[&str] = &[
    "obis",
    "scientific_names",
    "families",
    "wod_2015",
    "wod",
    "date_lookup",
];

/// PostgreSQL database service
///
/// Should be created once at server startup and shared across handlers as
/// an `Arc<dyn QueryExecutor>`.
pub struct PostgresService {
    pool: PgPool,
    debug: bool,
}

impl PostgresService {
    /// Initialize the connection pool from configuration
    ///
    /// The pool connects eagerly so a wrong target fails at startup rather
    /// than on the first request.
    pub async fn init(config: &PostgresConfig, debug: bool) -> Result<Self, DataError> {
        let mut options = connect_options(config)?;
        options = options.log_statements(LevelFilter::Trace);

        if config.statement_timeout_secs > 0 {
            options = options.options([(
                "statement_timeout",
                format!("{}s", config.statement_timeout_secs),
            )]);
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .connect_with(options)
            .await?;

        tracing::debug!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            acquire_timeout_secs = config.acquire_timeout_secs,
            idle_timeout_secs = config.idle_timeout_secs,
            max_lifetime_secs = config.max_lifetime_secs,
            statement_timeout_secs = config.statement_timeout_secs,
            "PostgresService initialized"
        );
        Ok(Self { pool, debug })
    }

    /// Report which of the required tables exist
    pub async fn check_tables(&self) -> Result<Vec<(&'static str, bool)>, DataError> {
        let mut report = Vec::with_capacity(REQUIRED_TABLES.len());
        for table in REQUIRED_TABLES {
            let exists: bool = sqlx::query_scalar("SELECT to_regclass($1) IS NOT NULL")
                .bind(*table)
                .fetch_one(&self.pool)
                .await?;
            report.push((*table, exists));
        }
        Ok(report)
    }
}

#[async_trait]
impl QueryExecutor for PostgresService {
    async fn fetch_rows(&self, statement: &Statement) -> Result<Vec<Row>, DataError> {
        if self.debug {
            tracing::info!(sql = %statement.sql, params = ?statement.params, "Executing statement");
        } else {
            tracing::trace!(
                sql = %statement.sql,
                params = ?statement.params,
                "Executing statement"
            );
        }

        let sql = wrap_row_to_json(&statement.sql);
        let mut query = sqlx::query_scalar::<_, Json<serde_json::Value>>(&sql);
        for value in &statement.params {
            query = match value {
                SqlValue::Text(v) => query.bind(v.as_str()),
                SqlValue::Int(v) => query.bind(*v),
                SqlValue::Float(v) => query.bind(*v),
                SqlValue::Bool(v) => query.bind(*v),
            };
        }

        query
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|Json(value)| match value {
                serde_json::Value::Object(row) => Ok(row),
                other => Err(DataError::Decode(serde::de::Error::custom(format!(
                    "expected a JSON object row, got {}",
                    other
                )))),
            })
            .collect()
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("PostgreSQL pool closed");
    }
}

/// Wrap a statement so each row is returned as a single JSON object
fn wrap_row_to_json(sql: &str) -> String {
    format!("SELECT row_to_json(q) FROM (\n{}\n) AS q", sql)
}

/// Build connect options from a URL or the discrete connection fields
fn connect_options(config: &PostgresConfig) -> Result<PgConnectOptions, DataError> {
    if let Some(url) = config.url.as_deref().filter(|u| !u.is_empty()) {
        return url
            .parse()
            .map_err(|e| DataError::Config(format!("Invalid PostgreSQL URL: {}", e)));
    }

    let host = config
        .host
        .as_deref()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| DataError::Config("PostgreSQL URL or host is required".into()))?;

    let mut options = PgConnectOptions::new()
        .host(host)
        .port(config.port)
        .ssl_mode(pg_ssl_mode(config.ssl_mode));
    if let Some(user) = config.user.as_deref() {
        options = options.username(user);
    }
    if let Some(password) = config.password.as_deref() {
        options = options.password(password);
    }
    if let Some(database) = config.database.as_deref() {
        options = options.database(database);
    }
    Ok(options)
}

fn pg_ssl_mode(mode: SslMode) -> PgSslMode {
    match mode {
        SslMode::Disable => PgSslMode::Disable,
        SslMode::Prefer => PgSslMode::Prefer,
        SslMode::Require => PgSslMode::Require,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: Option<&str>, host: Option<&str>) -> PostgresConfig {
        PostgresConfig {
            url: url.map(str::to_string),
            host: host.map(str::to_string),
            port: 5433,
            user: Some("obis".to_string()),
            password: Some("secret".to_string()),
            database: Some("marine".to_string()),
            ssl_mode: SslMode::Require,
            max_connections: 10,
            min_connections: 1,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
            statement_timeout_secs: 120,
        }
    }

    #[test]
    fn test_wrap_row_to_json() {
        assert_eq!(
            wrap_row_to_json("SELECT 1 AS a"),
            "SELECT row_to_json(q) FROM (\nSELECT 1 AS a\n) AS q"
        );
    }

    #[test]
    fn test_connect_options_from_discrete_fields() {
        let options = connect_options(&config(None, Some("db.internal"))).unwrap();
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 5433);
        assert_eq!(options.get_username(), "obis");
        assert_eq!(options.get_database(), Some("marine"));
    }

    #[test]
    fn test_connect_options_url_wins() {
        let options = connect_options(&config(
            Some("postgres://reader@url-host:6000/obis"),
            Some("ignored"),
        ))
        .unwrap();
        assert_eq!(options.get_host(), "url-host");
        assert_eq!(options.get_port(), 6000);
        assert_eq!(options.get_database(), Some("obis"));
    }

    #[test]
    fn test_connect_options_requires_target() {
        let err = connect_options(&config(None, None)).unwrap_err();
        assert!(matches!(err, DataError::Config(_)));
    }

    #[test]
    fn test_connect_options_rejects_bad_url() {
        let err = connect_options(&config(Some("not a url"), None)).unwrap_err();
        assert!(err.to_string().contains("Invalid PostgreSQL URL"));
    }

    #[test]
    fn test_ssl_mode_mapping() {
        assert!(matches!(pg_ssl_mode(SslMode::Disable), PgSslMode::Disable));
        assert!(matches!(pg_ssl_mode(SslMode::Prefer), PgSslMode::Prefer));
        assert!(matches!(pg_ssl_mode(SslMode::Require), PgSslMode::Require));
    }
}
