use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::collections::HashMap;
use std::error::Error as StdError;

const SERVER_ERROR_MESSAGE: &str =
    "the server encountered a problem and could not process your request";

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Validation errors")]
    Validation(HashMap<String, String>),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Database error: {0}")]
    Database(#[source] anyhow::Error),

    #[error("An unexpected error occurred: {0}")]
    Unexpected(#[from] anyhow::Error),
}

impl AppError {
    pub fn record_not_found() -> Self {
        AppError::NotFound("the requested resource could not be found".to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::MalformedInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Storage and unexpected failures never leak their cause to the client.
        let (error_message, errors) = match &self {
            AppError::Validation(validation_errors) => {
                ("Validation failed".to_string(), Some(validation_errors.clone()))
            }
            AppError::NotFound(msg) | AppError::MalformedInput(msg) => (msg.clone(), None),
            AppError::Database(_) | AppError::Unexpected(_) => {
                (SERVER_ERROR_MESSAGE.to_string(), None)
            }
        };

        if status.is_server_error() {
            tracing::error!(
                error_type = %self,
                status_code = %status,
                "Request error"
            );

            let source: Option<&(dyn StdError + 'static)> = match &self {
                AppError::Database(e) | AppError::Unexpected(e) => Some(e.as_ref()),
                _ => None,
            };
            let mut source_chain = String::new();
            let mut current_err = source.and_then(|e| e.source());
            while let Some(err) = current_err {
                source_chain.push_str(&format!("\n  Caused by: {}", err));
                current_err = err.source();
            }
            if !source_chain.is_empty() {
                tracing::error!("Error source chain:{}", source_chain);
            }
        } else {
            tracing::warn!(
                error_type = %self,
                error_message = %error_message,
                status_code = %status,
                "Request rejected"
            );
        }

        let body = match errors {
            Some(validation_errors) => Json(json!({
                "message": error_message,
                "status": status.as_u16(),
                "errors": validation_errors
            })),
            None => Json(json!({
                "message": error_message,
                "status": status.as_u16()
            })),
        };
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::record_not_found(),
            _ => AppError::Database(anyhow::Error::new(err).context("SQLx operation failed")),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let message = match &rejection {
            JsonRejection::JsonSyntaxError(_) => "body contains badly-formed JSON".to_string(),
            JsonRejection::MissingJsonContentType(_) => {
                "body must be sent with Content-Type: application/json".to_string()
            }
            _ => rejection.body_text(),
        };
        AppError::MalformedInput(message)
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::MalformedInput(rejection.body_text())
    }
}
