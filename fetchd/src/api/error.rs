//! API error handling: every failure is rendered as `{"error": message}`.

use super::payload::PayloadError;
use crate::adding::AddingError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Payload(PayloadError),
    Rejected(AddingError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Payload(err) => (err.status(), err.to_string()),
            ApiError::Rejected(err) => (StatusCode::BAD_REQUEST, err.to_string()),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<PayloadError> for ApiError {
    fn from(err: PayloadError) -> Self {
        ApiError::Payload(err)
    }
}

impl From<AddingError> for ApiError {
    fn from(err: AddingError) -> Self {
        ApiError::Rejected(err)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
