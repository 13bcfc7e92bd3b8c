//! Error type for the data layer

use thiserror::Error;

/// Errors raised while compiling, executing or decoding a statement
#[derive(Error, Debug)]
pub enum DataError {
    /// PostgreSQL driver or pool error
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A result row did not match the expected shape
    #[error("Row decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DataError {
    /// Check if this is a connection-related error that might be transient
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Postgres(e) => matches!(
                e,
                sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
            ),
            Self::Decode(_) | Self::Config(_) => false,
        }
    }
}
