//! Data access layer
//!
//! - `sql` - parameterized statement building
//! - `queries` - one statement builder per endpoint query
//! - `executor` - the `QueryExecutor` seam handlers depend on
//! - `postgres` - pooled PostgreSQL implementation of the executor
//! - `error` - data layer error type

pub mod error;
pub mod executor;
pub mod postgres;
pub mod queries;
pub mod sql;

pub use error::DataError;
pub use executor::{QueryExecutor, Row};
pub use postgres::PostgresService;
pub use sql::{SqlParams, SqlValue, Statement};
