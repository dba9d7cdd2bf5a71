use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::db::timeout_query;
use crate::errors::AppError;
use crate::models::filters::{calculate_metadata, Filters, Metadata};
use crate::models::QUERY_TIMEOUT;
use crate::validator::Validator;

pub const DEFAULT_SORT: &str = "customer_id";

pub const SORT_SAFELIST: &[&str] = &[
    "customer_id",
    "first_name",
    "last_name",
    "email",
    "created_at",
    "no_show_count",
    "-customer_id",
    "-first_name",
    "-last_name",
    "-email",
    "-created_at",
    "-no_show_count",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Customer {
    #[serde(rename = "customer_id")]
    #[sqlx(rename = "customer_id")]
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub no_show_count: i32,
    pub penalty_flag: bool,
}

#[derive(Debug, FromRow)]
struct CustomerWithTotal {
    total_records: i64,
    #[sqlx(flatten)]
    customer: Customer,
}

pub fn validate_customer(v: &mut Validator, c: &Customer) {
    v.check(!c.first_name.is_empty(), "first_name", "must be provided");
    v.check(
        c.first_name.chars().count() <= 100,
        "first_name",
        "must not exceed 100 characters",
    );

    v.check(!c.last_name.is_empty(), "last_name", "must be provided");
    v.check(
        c.last_name.chars().count() <= 100,
        "last_name",
        "must not exceed 100 characters",
    );

    if !c.email.is_empty() {
        v.check(
            c.email.chars().count() <= 255,
            "email",
            "must not exceed 255 characters",
        );
    }

    v.check(c.no_show_count >= 0, "no_show_count", "must not be negative");
}

#[derive(Clone)]
pub struct CustomerModel {
    pub db: PgPool,
}

impl CustomerModel {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Stores a new customer and fills in the storage-assigned fields.
    #[tracing::instrument(name = "Insert customer", skip(self, customer))]
    pub async fn insert(&self, customer: &mut Customer) -> Result<(), AppError> {
        let query = r#"
            INSERT INTO customers (first_name, last_name, email, phone)
            VALUES ($1, $2, $3, $4)
            RETURNING customer_id, created_at, no_show_count, penalty_flag
        "#;

        let (id, created_at, no_show_count, penalty_flag) = timeout_query(
            QUERY_TIMEOUT,
            sqlx::query_as::<_, (i64, DateTime<Utc>, i32, bool)>(query)
                .bind(&customer.first_name)
                .bind(&customer.last_name)
                .bind(&customer.email)
                .bind(&customer.phone)
                .fetch_one(&self.db),
        )
        .await
        .map_err(storage_error)?;

        customer.id = id;
        customer.created_at = created_at;
        customer.no_show_count = no_show_count;
        customer.penalty_flag = penalty_flag;

        tracing::info!(customer_id = id, "Customer inserted");
        Ok(())
    }

    #[tracing::instrument(name = "Get customer", skip(self))]
    pub async fn get(&self, id: i64) -> Result<Customer, AppError> {
        if id < 1 {
            return Err(AppError::record_not_found());
        }

        let query = r#"
            SELECT customer_id, first_name, last_name, email, phone,
                   created_at, no_show_count, penalty_flag
            FROM customers
            WHERE customer_id = $1
        "#;

        timeout_query(
            QUERY_TIMEOUT,
            sqlx::query_as::<_, Customer>(query)
                .bind(id)
                .fetch_optional(&self.db),
        )
        .await?
        .ok_or_else(AppError::record_not_found)
    }

    #[tracing::instrument(name = "Update customer", skip(self, customer), fields(customer_id = customer.id))]
    pub async fn update(&self, customer: &Customer) -> Result<(), AppError> {
        if customer.id < 1 {
            return Err(AppError::record_not_found());
        }

        let query = r#"
            UPDATE customers
            SET first_name = $1,
                last_name = $2,
                email = $3,
                phone = $4,
                no_show_count = $5,
                penalty_flag = $6
            WHERE customer_id = $7
            RETURNING customer_id
        "#;

        timeout_query(
            QUERY_TIMEOUT,
            sqlx::query_scalar::<_, i64>(query)
                .bind(&customer.first_name)
                .bind(&customer.last_name)
                .bind(&customer.email)
                .bind(&customer.phone)
                .bind(customer.no_show_count)
                .bind(customer.penalty_flag)
                .bind(customer.id)
                .fetch_optional(&self.db),
        )
        .await?
        .map(|_| ())
        .ok_or_else(AppError::record_not_found)
    }

    #[tracing::instrument(name = "Delete customer", skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if id < 1 {
            return Err(AppError::record_not_found());
        }

        let query = r#"
            DELETE FROM customers
            WHERE customer_id = $1
        "#;

        let result = timeout_query(
            QUERY_TIMEOUT,
            sqlx::query(query).bind(id).execute(&self.db),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::record_not_found());
        }

        Ok(())
    }

    /// Lists customers whose names contain the given fragments, one page at a
    /// time. The total is counted with a window function in the same query.
    #[tracing::instrument(
        name = "List customers",
        skip(self, first_name, last_name, filters),
        fields(
            first_name_filter = !first_name.is_empty(),
            last_name_filter = !last_name.is_empty(),
            page = filters.page,
            page_size = filters.page_size,
        )
    )]
    pub async fn get_all(
        &self,
        first_name: &str,
        last_name: &str,
        filters: &Filters,
    ) -> Result<(Vec<Customer>, Metadata), AppError> {
        let query = format!(
            r#"
            SELECT COUNT(*) OVER() AS total_records, customer_id, first_name, last_name,
                   email, phone, created_at, no_show_count, penalty_flag
            FROM customers
            WHERE ($1 = '' OR first_name ILIKE '%' || $1 || '%')
              AND ($2 = '' OR last_name ILIKE '%' || $2 || '%')
            ORDER BY {} {}, customer_id ASC
            LIMIT $3 OFFSET $4
            "#,
            filters.sort_column()?,
            filters.sort_direction()
        );

        let rows = timeout_query(
            QUERY_TIMEOUT,
            sqlx::query_as::<_, CustomerWithTotal>(&query)
                .bind(first_name)
                .bind(last_name)
                .bind(filters.limit())
                .bind(filters.offset())
                .fetch_all(&self.db),
        )
        .await?;

        let total_records = rows.first().map(|row| row.total_records).unwrap_or(0);
        let customers: Vec<Customer> = rows.into_iter().map(|row| row.customer).collect();
        let metadata = calculate_metadata(total_records, filters.page, filters.page_size);

        tracing::debug!(
            returned = customers.len(),
            total_records,
            "Customers listed"
        );
        Ok((customers, metadata))
    }
}

// An INSERT ... RETURNING that yields no row is a storage failure, not a 404.
fn storage_error(err: AppError) -> AppError {
    match err {
        AppError::NotFound(msg) => AppError::Database(anyhow::anyhow!(msg)),
        other => other,
    }
}
