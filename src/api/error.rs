//! HTTP mapping for domain errors.
//!
//! Every failure leaves the service as a JSON body `{"detail", "code"}`.
//! Internal failures are logged under a fresh `error_id` and reported to the
//! caller with a generic message plus that id.

use crate::error::AppError;
use axum::extract::rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection};
use axum::http::header::WWW_AUTHENTICATE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::any::Any;
use tracing::error;
use uuid::Uuid;

pub const INTERNAL_ERROR_DETAIL: &str = "Internal server error";

fn status_for(error: &AppError) -> StatusCode {
    match error {
        AppError::Validation(_) | AppError::DuplicateUsername | AppError::DuplicateEmail => {
            StatusCode::BAD_REQUEST
        }
        AppError::InvalidCredentials | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
        AppError::NotFound => StatusCode::NOT_FOUND,
        AppError::MalformedRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn internal_error_response(error_id: Uuid) -> Response {
    let body = json!({
        "detail": INTERNAL_ERROR_DETAIL,
        "code": "internal_error",
        "error_id": error_id,
    });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = status_for(&self);

        let mut response = match &self {
            AppError::Internal(err) => {
                let error_id = Uuid::new_v4();
                error!(%error_id, error = ?err, "request failed with internal error");
                return internal_error_response(error_id);
            }
            other => {
                let body = json!({ "detail": other.to_string(), "code": other.code() });
                (status, Json(body)).into_response()
            }
        };

        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}

/// Response for a handler that panicked
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };

    let error_id = Uuid::new_v4();
    error!(%error_id, panic = message, "request handler panicked");
    internal_error_response(error_id)
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::MalformedRequest(rejection.body_text())
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        AppError::MalformedRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::MalformedRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::MalformedRequest(rejection.body_text())
    }
}
