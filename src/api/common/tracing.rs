//! Callbacks plugged into `tower_http::trace::TraceLayer`.

use axum::body::Body;
use axum::http::{Request, Response};
use std::time::Duration;
use tower_http::classify::ServerErrorsFailureClass;
use tracing::{info_span, Span};

pub fn make_request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri().path(),
        query = ?request.uri().query(),
        request_id = request_id,
    )
}

pub fn on_request(request: &Request<Body>, _span: &Span) {
    tracing::info!(
        method = %request.method(),
        uri = %request.uri(),
        content_length = ?request.headers().get("content-length"),
        "Incoming HTTP request"
    );
}

/// Logs the outcome at a level chosen by status class.
pub fn on_response(response: &Response<Body>, latency: Duration, _span: &Span) {
    let status = response.status();
    let latency_ms = latency.as_millis();

    if status.is_server_error() {
        tracing::error!(status = %status, latency_ms, "HTTP request completed with server error");
    } else if status.is_client_error() {
        tracing::warn!(status = %status, latency_ms, "HTTP request completed with client error");
    } else {
        tracing::info!(status = %status, latency_ms, "HTTP request completed");
    }
}

pub fn on_failure(error: ServerErrorsFailureClass, latency: Duration, _span: &Span) {
    let error_type = match &error {
        ServerErrorsFailureClass::StatusCode(code) => format!("HTTP {}", code.as_u16()),
        ServerErrorsFailureClass::Error(_) => "Internal Error".to_string(),
    };

    tracing::error!(
        error = %error,
        latency_ms = latency.as_millis(),
        error_type = error_type,
        "HTTP request failed"
    );
}
