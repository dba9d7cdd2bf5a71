//! Version 1 endpoints: customers and reservations.

pub mod customers;
pub mod reservations;

use axum::routing::{get, post};
use axum::Router;

use crate::InnerState;

/// Creates the V1 API router
#[tracing::instrument(name = "create_v1_router")]
pub fn create_v1_router() -> Router<InnerState> {
    tracing::info!("Creating V1 API router");

    Router::new()
        .route(
            "/customers",
            get(customers::list_customers).post(customers::create_customer),
        )
        .route(
            "/customers/{id}",
            get(customers::get_customer)
                .patch(customers::update_customer)
                .delete(customers::delete_customer),
        )
        .route("/reservations", post(reservations::create_reservation))
}
