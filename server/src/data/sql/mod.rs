//! Statement building for the PostgreSQL backend
//!
//! Every request value reaches the database through a positional `$n`
//! parameter. SQL text is assembled only from fixed fragments and
//! placeholders returned by [`SqlParams::push`].

mod builder;

pub use builder::SelectBuilder;

use serde::Serialize;

/// A bound parameter value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

/// Collects SQL parameters during query building (maintains insertion order)
#[derive(Debug, Default, Clone)]
pub struct SqlParams {
    values: Vec<SqlValue>,
}

impl SqlParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value and return its placeholder (`$1`, `$2`, ...)
    pub fn push(&mut self, value: impl Into<SqlValue>) -> String {
        self.values.push(value.into());
        format!("${}", self.values.len())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<SqlValue> {
        self.values
    }
}

/// Compiled statement: SQL text plus its positional parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl Statement {
    /// A statement without parameters
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn with_params(sql: impl Into<String>, params: SqlParams) -> Self {
        Self {
            sql: sql.into(),
            params: params.into_values(),
        }
    }
}
