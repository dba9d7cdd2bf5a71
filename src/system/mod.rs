//! System-level routes

pub mod health_check;

use axum::{routing::get, Router};

use crate::errors::AppError;
use crate::InnerState;

/// Creates system routes
#[tracing::instrument(name = "create_system_router")]
pub fn create_system_router() -> Router<InnerState> {
    tracing::info!("Creating system router");

    Router::new().route("/v1/healthcheck", get(health_check::health_check))
}

pub async fn route_not_found() -> AppError {
    AppError::record_not_found()
}
