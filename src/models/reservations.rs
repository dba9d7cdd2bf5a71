use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::errors::AppError;
use crate::validator::Validator;

pub const DEFAULT_STATUS: &str = "confirmed";

/// Unix timestamp of `0001-01-01T00:00:00Z`, the instant treated as "no time".
const ZERO_TIME_UNIX: i64 = -62_135_596_800;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reservation {
    pub id: i64,
    pub customer: String,
    pub table_id: i64,
    pub time_slot: DateTime<Utc>,
    pub party_size: i64,
    pub status: String,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
}

/// Hands out reservation ids. Shared by every request handler.
#[derive(Debug, Clone)]
pub struct ReservationSequence {
    next: Arc<AtomicI64>,
}

impl Default for ReservationSequence {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl ReservationSequence {
    pub fn starting_at(first: i64) -> Self {
        Self {
            next: Arc::new(AtomicI64::new(first)),
        }
    }

    pub fn next_id(&self) -> i64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

/// Parses a strict RFC 3339 timestamp such as `2025-03-14T19:30:00Z`.
pub fn parse_time_slot(raw: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            AppError::MalformedInput(format!(
                "time_slot must be an RFC 3339 timestamp: {}",
                e
            ))
        })
}

impl Reservation {
    pub fn new(
        sequence: &ReservationSequence,
        customer: String,
        table_id: i64,
        time_slot: DateTime<Utc>,
        party_size: i64,
    ) -> Self {
        Self {
            id: sequence.next_id(),
            customer,
            table_id,
            time_slot,
            party_size,
            status: DEFAULT_STATUS.to_string(),
            created_at: Utc::now(),
        }
    }
}

pub fn validate_reservation(v: &mut Validator, r: &Reservation) {
    v.check(!r.customer.is_empty(), "customer", "must be provided");
    v.check(
        r.customer.chars().count() <= 100,
        "customer",
        "must not be more than 100 characters long",
    );

    v.check(r.table_id > 0, "table_id", "must be a positive integer");
    v.check(r.party_size > 0, "party_size", "must be greater than 0");
    v.check(
        r.time_slot.timestamp() != ZERO_TIME_UNIX,
        "time_slot",
        "must be provided",
    );
    v.check(!r.status.is_empty(), "status", "must be provided");
}
