//! API module containing all versioned API endpoints

pub mod common;
pub mod v1;

use std::any::Any;

use axum::extract::DefaultBodyLimit;
use axum::response::{IntoResponse, Response};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::errors::AppError;
use crate::system;
use crate::InnerState;

const MAX_BODY_BYTES: usize = 1_048_576;

/// Creates the application router with every version and the shared middleware.
#[tracing::instrument(name = "create_api_router", skip(state))]
pub fn create_api_router(state: InnerState) -> Router {
    tracing::info!("Creating API router with versioned endpoints");

    Router::new()
        .merge(system::create_system_router())
        .nest("/v1", v1::create_v1_router())
        .fallback(system::route_not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(common::tracing::make_request_span)
                .on_request(common::tracing::on_request)
                .on_response(common::tracing::on_response)
                .on_failure(common::tracing::on_failure),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    AppError::Unexpected(anyhow::anyhow!("handler panicked: {}", detail)).into_response()
}
