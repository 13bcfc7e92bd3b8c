//! HTTP middleware (CORS, request tracing, 404 handler)

use axum::extract::Request;
use axum::http::{Method, header};
use axum::response::{IntoResponse, Response};
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use super::types::ApiError;

/// CORS for a public read-only API: any origin, GET only
pub fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::ORIGIN,
            header::CACHE_CONTROL,
        ])
}

/// Per-request span and response logging at debug level
pub fn trace() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::DEBUG))
}

/// Handle 404 Not Found with logging
pub async fn handle_404(req: Request) -> Response {
    if tracing::enabled!(Level::DEBUG) {
        let mut headers_map = serde_json::Map::new();
        for (name, value) in req.headers().iter() {
            if let Ok(value_str) = value.to_str() {
                headers_map.insert(
                    name.to_string(),
                    serde_json::Value::String(value_str.to_string()),
                );
            }
        }

        let log_entry = serde_json::json!({
            "status": 404,
            "method": req.method().to_string(),
            "url": req.uri().to_string(),
            "headers": headers_map,
        });

        if let Ok(pretty) = serde_json::to_string_pretty(&log_entry) {
            tracing::debug!("[404]\n{}", pretty);
        }
    }

    ApiError::not_found(
        "ROUTE_NOT_FOUND",
        format!("No route for {} {}", req.method(), req.uri().path()),
    )
    .into_response()
}
