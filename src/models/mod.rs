//! Domain records and the storage models that persist them.

pub mod customers;
pub mod filters;
pub mod reservations;

use std::time::Duration;

use sqlx::PgPool;

use crate::models::customers::CustomerModel;
use crate::models::reservations::ReservationSequence;

/// Deadline applied to every individual database operation.
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Clone)]
pub struct Models {
    pub customers: CustomerModel,
    pub reservations: ReservationSequence,
}

impl Models {
    pub fn new(db: PgPool) -> Self {
        Self {
            customers: CustomerModel::new(db),
            reservations: ReservationSequence::default(),
        }
    }
}
