//! Standard response envelope and business-error translation.

use crate::error::AppError;
use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;

/// Business error codes carried in `error_code`. Zero is reserved for success.
pub mod codes {
    pub const OK: i32 = 0;
    pub const NAME_TOO_LONG: i32 = 1001;
}

/// `{error_code, error_message, data}`. `data` is `null` whenever `error_code` is nonzero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub error_code: i32,
    pub error_message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        wrap(data, codes::OK, "")
    }

    pub fn failure(err: BusinessError) -> Self {
        ApiResponse {
            error_code: err.code,
            error_message: err.message,
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error_code == codes::OK
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Direct envelope construction.
pub fn wrap<T>(data: T, error_code: i32, error_message: impl Into<String>) -> ApiResponse<T> {
    ApiResponse {
        error_code,
        error_message: error_message.into(),
        data: Some(data),
    }
}

/// A domain failure the caller receives as an envelope, not as an HTTP error status.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("business error {code}: {message}")]
pub struct BusinessError {
    pub code: i32,
    pub message: String,
}

impl BusinessError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        BusinessError {
            code,
            message: message.into(),
        }
    }
}

/// Run `operation`; wrap its value with code 0, turn a `BusinessError` into a failure
/// envelope, and hand every other error back to the caller.
pub async fn handle_or_raise<T, F, Fut>(operation: F) -> Result<ApiResponse<T>, AppError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    match operation().await {
        Ok(data) => Ok(ApiResponse::ok(data)),
        Err(AppError::Business(err)) => {
            tracing::info!(code = err.code, message = %err.message, "business error");
            Ok(ApiResponse::failure(err))
        }
        Err(e) => Err(e),
    }
}
