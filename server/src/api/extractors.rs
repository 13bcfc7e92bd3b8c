//! Path and validation extractors for API routes
//!
//! Every rejection renders the same `{error, code, message}` body as
//! [`ApiError`](super::types::ApiError).

use std::ops::Deref;

use axum::Json;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{FromRequestParts, Path, Query};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use validator::Validate;

/// Maximum length of a scientific name path segment
pub const MAX_NAME_LENGTH: usize = 256;

/// Validate a scientific name path segment: 1-256 chars, not blank
pub fn is_valid_name(name: &str) -> bool {
    !name.trim().is_empty() && name.len() <= MAX_NAME_LENGTH
}

#[derive(Debug, Deserialize)]
struct NamePathRaw {
    #[serde(rename = "scientificName")]
    scientific_name: String,
}

/// Validated `{scientificName}` path extractor
#[derive(Debug)]
pub struct NamePath {
    pub scientific_name: String,
}

impl<S> FromRequestParts<S> for NamePath
where
    S: Send + Sync,
{
    type Rejection = ValidationRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<NamePathRaw>::from_request_parts(parts, state)
            .await
            .map_err(ValidationRejection::Path)?;

        if !is_valid_name(&raw.scientific_name) {
            return Err(ValidationRejection::InvalidScientificName);
        }

        Ok(Self {
            scientific_name: raw.scientific_name,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RegionPathRaw {
    region: String,
}

/// `{region}` path extractor; `all` selects every region
#[derive(Debug)]
pub struct RegionPath {
    pub region: String,
}

impl<S> FromRequestParts<S> for RegionPath
where
    S: Send + Sync,
{
    type Rejection = ValidationRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<RegionPathRaw>::from_request_parts(parts, state)
            .await
            .map_err(ValidationRejection::Path)?;
        Ok(Self { region: raw.region })
    }
}

#[derive(Debug, Deserialize)]
struct CoordinatesPathRaw {
    lat: String,
    lng: String,
}

/// Validated `{lat}/{lng}` path extractor
///
/// Both segments must parse as finite decimal degrees. Longitude is left
/// as given; callers normalize it.
#[derive(Debug)]
pub struct CoordinatesPath {
    pub lat: f64,
    pub lng: f64,
}

fn parse_degrees(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

impl<S> FromRequestParts<S> for CoordinatesPath
where
    S: Send + Sync,
{
    type Rejection = ValidationRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<CoordinatesPathRaw>::from_request_parts(parts, state)
            .await
            .map_err(ValidationRejection::Path)?;

        match (parse_degrees(&raw.lat), parse_degrees(&raw.lng)) {
            (Some(lat), Some(lng)) => Ok(Self { lat, lng }),
            _ => Err(ValidationRejection::InvalidCoordinates),
        }
    }
}

/// Validation rejection with structured error response
#[derive(Debug)]
pub enum ValidationRejection {
    /// Failed to parse path parameters
    Path(PathRejection),
    /// Blank or oversized scientific name
    InvalidScientificName,
    /// Latitude or longitude is not a finite number
    InvalidCoordinates,
    /// Failed to parse query string
    Query(QueryRejection),
    /// Validation constraints not satisfied
    Validation(validator::ValidationErrors),
}

impl IntoResponse for ValidationRejection {
    fn into_response(self) -> Response {
        let (code, message) = match self {
            Self::Path(rejection) => ("PATH_PARSE_ERROR", rejection.body_text()),
            Self::InvalidScientificName => (
                "INVALID_SCIENTIFIC_NAME",
                format!(
                    "Invalid scientificName: must be 1-{} characters",
                    MAX_NAME_LENGTH
                ),
            ),
            Self::InvalidCoordinates => (
                "INVALID_COORDINATES",
                "Invalid coordinates: lat and lng must be decimal degrees".to_string(),
            ),
            Self::Query(rejection) => ("QUERY_PARSE_ERROR", rejection.body_text()),
            Self::Validation(errors) => ("VALIDATION_ERROR", format_validation_errors(&errors)),
        };
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "bad_request",
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}

fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{}: validation failed", field))
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Query extractor with automatic validation.
///
/// Deserializes query parameters and validates them using the `validator` crate.
/// Returns a `ValidationRejection` on parse or validation failure.
#[derive(Debug)]
pub struct ValidatedQuery<T>(pub T);

impl<T> Deref for ValidatedQuery<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ValidationRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(ValidationRejection::Query)?;
        value.validate().map_err(ValidationRejection::Validation)?;
        Ok(Self(value))
    }
}
