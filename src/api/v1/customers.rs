use std::collections::HashMap;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::api::common::read_id_param;
use crate::errors::AppError;
use crate::models::customers::{validate_customer, Customer, DEFAULT_SORT, SORT_SAFELIST};
use crate::models::filters::Filters;
use crate::validator::Validator;
use crate::InnerState;

/// A missing key and an explicit `null` both decode to `None`, which becomes
/// an empty string on the new record.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCustomerRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Fields a client may change. `None` means the key was absent (or null) and
/// the stored value is kept; `Some("")` clears the field.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateCustomerRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub no_show_count: Option<i32>,
    #[serde(default)]
    pub penalty_flag: Option<bool>,
}

impl UpdateCustomerRequest {
    pub fn apply_to(self, customer: &mut Customer) {
        if let Some(first_name) = self.first_name {
            customer.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            customer.last_name = last_name;
        }
        if let Some(email) = self.email {
            customer.email = email;
        }
        if let Some(phone) = self.phone {
            customer.phone = phone;
        }
        if let Some(no_show_count) = self.no_show_count {
            customer.no_show_count = no_show_count;
        }
        if let Some(penalty_flag) = self.penalty_flag {
            customer.penalty_flag = penalty_flag;
        }
    }
}

#[tracing::instrument(name = "Create customer", skip(inner, payload))]
pub async fn create_customer(
    State(inner): State<InnerState>,
    payload: Result<Json<CreateCustomerRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = payload?;

    let mut customer = Customer {
        first_name: input.first_name.unwrap_or_default(),
        last_name: input.last_name.unwrap_or_default(),
        email: input.email.unwrap_or_default(),
        phone: input.phone.unwrap_or_default(),
        ..Customer::default()
    };

    let mut v = Validator::new();
    validate_customer(&mut v, &customer);
    v.into_result()?;

    inner.models.customers.insert(&mut customer).await?;

    let location = format!("/v1/customers/{}", customer.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(json!({ "customer": customer })),
    ))
}

#[tracing::instrument(name = "Get customer by id", skip(inner))]
pub async fn get_customer(
    State(inner): State<InnerState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = read_id_param(&id)?;
    let customer = inner.models.customers.get(id).await?;

    Ok(Json(json!({ "customer": customer })))
}

#[tracing::instrument(name = "Update customer", skip(inner, payload))]
pub async fn update_customer(
    State(inner): State<InnerState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateCustomerRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = read_id_param(&id)?;
    let mut customer = inner.models.customers.get(id).await?;

    let Json(input) = payload?;
    input.apply_to(&mut customer);

    let mut v = Validator::new();
    validate_customer(&mut v, &customer);
    v.into_result()?;

    inner.models.customers.update(&customer).await?;
    tracing::info!(customer_id = customer.id, "Customer updated");

    Ok(Json(json!({ "customer": customer })))
}

#[tracing::instrument(name = "Delete customer", skip(inner))]
pub async fn delete_customer(
    State(inner): State<InnerState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = read_id_param(&id)?;
    inner.models.customers.delete(id).await?;
    tracing::info!(customer_id = id, "Customer deleted");

    Ok(Json(json!({ "message": "customer successfully deleted" })))
}

#[tracing::instrument(name = "List customers", skip(inner, params))]
pub async fn list_customers(
    State(inner): State<InnerState>,
    params: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(params) = params?;

    let first_name = params.get("first_name").map(String::as_str).unwrap_or("");
    let last_name = params.get("last_name").map(String::as_str).unwrap_or("");

    let mut v = Validator::new();
    let filters = Filters::from_query(&params, DEFAULT_SORT, SORT_SAFELIST, &mut v);
    v.into_result()?;

    let (customers, metadata) = inner
        .models
        .customers
        .get_all(first_name, last_name, &filters)
        .await?;

    Ok(Json(json!({
        "customers": customers,
        "@metadata": metadata,
    })))
}
