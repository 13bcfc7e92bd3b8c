//! Shared API types
//!
//! Error responses, pagination validators and query-string helpers used by
//! every route module.

use std::fmt::Display;
use std::str::FromStr;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Deserializer};
use validator::ValidationError;

use crate::data::DataError;
use crate::domain::DomainError;

/// Default page number
pub const DEFAULT_PAGE: u32 = 1;
/// Default rows per page
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Validator function for page parameter
pub fn validate_page(page: u32) -> Result<(), ValidationError> {
    if page < 1 {
        return Err(ValidationError::new("page_min").with_message("Page must be >= 1".into()));
    }
    Ok(())
}

/// Validator function for page_size parameter
pub fn validate_page_size(page_size: u32) -> Result<(), ValidationError> {
    if page_size < 1 {
        return Err(
            ValidationError::new("page_size_min").with_message("page_size must be >= 1".into()),
        );
    }
    Ok(())
}

pub fn default_page() -> u32 {
    DEFAULT_PAGE
}

pub fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// Checkbox-style flag: only the literal `true` sets it
pub fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref() == Some("true"))
}

/// Optional numeric parameter where an empty value means "not supplied"
pub fn deserialize_optional<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid value {:?}: {}", raw, e))),
    }
}

/// Standard API error response
#[derive(Debug)]
pub enum ApiError {
    BadRequest { code: String, message: String },
    NotFound { code: String, message: String },
    Internal { message: String },
}

impl ApiError {
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn from_data(e: DataError) -> Self {
        tracing::error!(error = %e, transient = e.is_transient(), "Data error");
        Self::internal("Database operation failed")
    }
}

impl From<DataError> for ApiError {
    fn from(e: DataError) -> Self {
        Self::from_data(e)
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation { code, message } => Self::bad_request(code, message),
            DomainError::NotFound { code, message } => Self::not_found(code, message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, code, message) = match self {
            Self::BadRequest { code, message } => {
                (StatusCode::BAD_REQUEST, "bad_request", code, message)
            }
            Self::NotFound { code, message } => (StatusCode::NOT_FOUND, "not_found", code, message),
            Self::Internal { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "INTERNAL".to_string(),
                message,
            ),
        };
        (
            status,
            Json(serde_json::json!({
                "error": error_type,
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}
