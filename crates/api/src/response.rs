//! The response envelope shared by every endpoint.
//!
//! Successful responses carry `{success, message, data}`; failures carry
//! `{success, message, code}`. Storage-level failures are reported with a
//! generic message so driver error text never reaches clients.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

use kasira_shared::AppError;

/// A `200 OK` envelope with a data payload.
pub fn ok<T: Serialize>(message: &str, data: T) -> Response {
    envelope(StatusCode::OK, message, Some(data))
}

/// A `201 Created` envelope with a data payload.
pub fn created<T: Serialize>(message: &str, data: T) -> Response {
    envelope(StatusCode::CREATED, message, Some(data))
}

/// A `200 OK` envelope without a data payload.
pub fn ok_message(message: &str) -> Response {
    envelope::<()>(StatusCode::OK, message, None)
}

/// A failure envelope with a stable error code.
pub fn failure(status: u16, code: &str, message: &str) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({
            "success": false,
            "message": message,
            "code": code,
        })),
    )
        .into_response()
}

/// Maps a repository error to a failure envelope.
///
/// `detail` is only echoed for client errors; server errors get a
/// generic message.
pub fn repo_failure(status: u16, code: &str, detail: &str) -> Response {
    let message = if status >= 500 {
        "An internal error occurred"
    } else {
        detail
    };
    failure(status, code, message)
}

/// Maps a shared [`AppError`] (auth and scoping failures) to a failure
/// envelope.
pub fn app_failure(error: &AppError) -> Response {
    repo_failure(error.status_code(), error.error_code(), &error.to_string())
}

fn envelope<T: Serialize>(status: StatusCode, message: &str, data: Option<T>) -> Response {
    let body = match data {
        Some(data) => json!({
            "success": true,
            "message": message,
            "data": data,
        }),
        None => json!({
            "success": true,
            "message": message,
        }),
    };
    (status, Json(body)).into_response()
}
