use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::InnerState;

pub async fn health_check(State(inner): State<InnerState>) -> impl IntoResponse {
    Json(json!({
        "status": "available",
        "system_info": {
            "environment": inner.environment,
            "version": env!("CARGO_PKG_VERSION"),
        }
    }))
}
