//! Greeting and connectivity check

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::types::ApiError;
use crate::data::QueryExecutor;
use crate::data::queries::occurrences;

#[derive(Clone)]
pub struct RootApiState {
    pub executor: Arc<dyn QueryExecutor>,
}

pub fn routes(executor: Arc<dyn QueryExecutor>) -> Router<()> {
    let state = RootApiState { executor };

    Router::new()
        .route("/", get(hello))
        .route("/test", get(sample_occurrences))
        .with_state(state)
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SampleOccurrenceDto {
    pub occurrenceid: serde_json::Value,
    pub eventdate: Option<String>,
}

/// Plain-text greeting
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses(
        (status = 200, description = "Greeting", body = String, content_type = "text/plain")
    )
)]
pub async fn hello() -> &'static str {
    "Hello from the API!"
}

/// A few raw occurrences, confirming the database answers
#[utoipa::path(
    get,
    path = "/test",
    tag = "health",
    responses(
        (status = 200, description = "Up to 10 occurrences", body = Vec<SampleOccurrenceDto>)
    )
)]
pub async fn sample_occurrences(
    State(state): State<RootApiState>,
) -> Result<Json<Vec<SampleOccurrenceDto>>, ApiError> {
    let rows = state
        .executor
        .fetch_as::<SampleOccurrenceDto>(&occurrences::sample())
        .await?;
    Ok(Json(rows))
}
