//! Typed errors and HTTP mapping.

use crate::model::ValidationError;
use crate::response::{ApiResponse, BusinessError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
    #[error("unknown store kind: '{0}' (expected postgres or memory)")]
    UnknownStore(String),
    #[error("invalid DATABASE_URL: {0}")]
    DatabaseUrl(String),
}

/// Connectivity, constraint, or row-decode failures from the store.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("row {id} holds an invalid value: {source}")]
    CorruptRow {
        id: i32,
        #[source]
        source: ValidationError,
    },
    #[error("aggregate over {column} holds an invalid value: {source}")]
    CorruptAggregate {
        column: &'static str,
        #[source]
        source: ValidationError,
    },
    #[error("constraint violated: {0}")]
    Constraint(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Business(#[from] BusinessError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AppError {
    pub fn user_not_found() -> Self {
        AppError::NotFound("User not found".into())
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Storage(StorageError::Db(e))
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            // Normally recovered by `handle_or_raise`; render the same envelope if one escapes.
            AppError::Business(b) => return ApiResponse::<()>::failure(b.clone()).into_response(),
            AppError::Storage(e) => {
                tracing::error!(error = %e, "storage failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
