//! Query executor abstraction
//!
//! Handlers receive an `Arc<dyn QueryExecutor>` through router state. The
//! PostgreSQL implementation lives in `data::postgres`; tests use the
//! in-memory `RecordingExecutor`.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::error::DataError;
use super::sql::Statement;

/// One result row as a JSON object, columns in select order
pub type Row = serde_json::Map<String, serde_json::Value>;

#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Execute a statement and return its rows in order
    async fn fetch_rows(&self, statement: &Statement) -> Result<Vec<Row>, DataError>;

    /// Release underlying connections
    async fn close(&self) {}
}

impl dyn QueryExecutor {
    /// Execute a statement and decode each row into `T`
    pub async fn fetch_as<T: DeserializeOwned>(
        &self,
        statement: &Statement,
    ) -> Result<Vec<T>, DataError> {
        self.fetch_rows(statement)
            .await?
            .into_iter()
            .map(|row| {
                serde_json::from_value(serde_json::Value::Object(row)).map_err(DataError::from)
            })
            .collect()
    }
}

#[cfg(test)]
pub(crate) use recording::RecordingExecutor;

#[cfg(test)]
mod recording {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use serde_json::Value;

    use super::{QueryExecutor, Row};
    use crate::data::error::DataError;
    use crate::data::sql::Statement;

    /// In-memory executor returning canned rows and recording every statement
    ///
    /// Responses are matched by a substring of the SQL text; the first match
    /// wins and unmatched statements return no rows.
    #[derive(Default)]
    pub(crate) struct RecordingExecutor {
        responses: Mutex<Vec<(String, Vec<Row>)>>,
        statements: Mutex<Vec<Statement>>,
        fail: AtomicBool,
        closed: AtomicBool,
    }

    impl RecordingExecutor {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        /// Return `rows` for statements whose SQL contains `sql_fragment`
        pub(crate) fn respond(self, sql_fragment: &str, rows: Vec<Value>) -> Self {
            let rows = rows
                .into_iter()
                .filter_map(|v| match v {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .collect();
            self.responses
                .lock()
                .unwrap()
                .push((sql_fragment.to_string(), rows));
            self
        }

        /// Fail every statement with a pool error
        pub(crate) fn failing() -> Self {
            let executor = Self::default();
            executor.fail.store(true, Ordering::SeqCst);
            executor
        }

        pub(crate) fn statements(&self) -> Vec<Statement> {
            self.statements.lock().unwrap().clone()
        }

        pub(crate) fn is_closed(&self) -> bool {
            self.closed.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl QueryExecutor for RecordingExecutor {
        async fn fetch_rows(&self, statement: &Statement) -> Result<Vec<Row>, DataError> {
            self.statements.lock().unwrap().push(statement.clone());
            if self.fail.load(Ordering::SeqCst) {
                return Err(DataError::Postgres(sqlx::Error::PoolTimedOut));
            }
            let responses = self.responses.lock().unwrap();
            Ok(responses
                .iter()
                .find(|(fragment, _)| statement.sql.contains(fragment.as_str()))
                .map(|(_, rows)| rows.clone())
                .unwrap_or_default())
        }

        async fn close(&self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }
}
