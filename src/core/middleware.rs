use crate::core::app::RequestLimits;
use crate::core::error::AppError;
use crate::core::metrics::Metrics;
use axum::{
    body::{self, Body},
    extract::{MatchedPath, Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::Span;
use uuid::Uuid;

/// Request ID generator using UUID v7 (time-ordered)
#[derive(Clone, Copy)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Custom MakeSpan that includes request_id in the tracing span
#[derive(Clone, Debug)]
pub struct MakeSpanWithRequestId;

impl<B> tower_http::trace::MakeSpan<B> for MakeSpanWithRequestId {
    fn make_span(&mut self, request: &axum::http::Request<B>) -> Span {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    }
}

fn is_json(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_whitespace)
}

fn get_with_body() -> AppError {
    AppError::BadRequest("GET requests should not have a body.".to_string())
}

/// Reject GET requests carrying a query string or body, and JSON bodies that do not parse
///
/// Only GET and JSON bodies are buffered (up to `max_request_body_size`); multipart
/// uploads stream through untouched.
pub async fn validate_request(
    State(limits): State<RequestLimits>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let is_get = req.method() == Method::GET;

    if is_get && req.uri().query().is_some_and(|q| !q.is_empty()) {
        return Err(AppError::BadRequest(
            "GET requests should not have query parameters.".to_string(),
        ));
    }

    let json = is_json(&req);
    if !is_get && !json {
        return Ok(next.run(req).await);
    }

    let (parts, body) = req.into_parts();
    let bytes = body::to_bytes(body, limits.max_request_body_size)
        .await
        .map_err(|e| {
            tracing::debug!("Failed to buffer request body: {}", e);
            if is_get {
                get_with_body()
            } else {
                AppError::PayloadTooLarge("Request body too large".to_string())
            }
        })?;

    if is_get && !is_blank(&bytes) {
        return Err(get_with_body());
    }

    if json
        && !is_blank(&bytes)
        && serde_json::from_slice::<serde::de::IgnoredAny>(&bytes).is_err()
    {
        return Err(AppError::BadRequest("Malformed JSON body".to_string()));
    }

    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}

/// Emit call count and latency per method and route
pub async fn track_api_metrics(
    State(metrics): State<Arc<Metrics>>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let start = Instant::now();
    let response = next.run(req).await;
    metrics.record_api_call(&method, &route, start.elapsed());

    response
}
