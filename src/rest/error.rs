//! REST API Error Types
//!
//! Maps domain errors to HTTP statuses. Every error body is
//! `{ success: false, code, message }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::dispatch::DispatchError;
use crate::store::StoreError;

/// REST API error that can be returned from handlers
#[derive(Debug)]
pub struct RestError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl RestError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        RestError {
            status: StatusCode::BAD_REQUEST,
            code: "BAD_REQUEST",
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        RestError {
            status: StatusCode::UNAUTHORIZED,
            code: "UNAUTHORIZED",
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        RestError {
            status: StatusCode::CONFLICT,
            code: "CONFLICT",
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        RestError {
            status: StatusCode::SERVICE_UNAVAILABLE,
            code: "STORAGE_UNAVAILABLE",
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        RestError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_ERROR",
            message: message.into(),
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "code": self.code,
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}

// Conversions from domain errors

impl From<DispatchError> for RestError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::EmptyText => RestError::bad_request(err.to_string()),
        }
    }
}

impl From<StoreError> for RestError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EmptyText => RestError::bad_request(err.to_string()),
            StoreError::Io(_) | StoreError::Json(_) | StoreError::Corrupt { .. } => {
                RestError::unavailable(err.to_string())
            }
        }
    }
}
