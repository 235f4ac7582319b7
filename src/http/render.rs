//! JSON response helpers.
//!
//! Success payloads are wrapped as `{"data": ..., "status": ...}`, error
//! payloads as `{"errors": ..., "status": ...}`.

use axum::http::{header, HeaderValue, StatusCode};
use serde::Serialize;

use crate::http::response::ResponseWriter;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

#[derive(Serialize)]
struct DataEnvelope<'a, T: ?Sized> {
    data: &'a T,
    status: u16,
}

#[derive(Serialize)]
struct ErrorEnvelope<'a, T: ?Sized> {
    errors: &'a T,
    status: u16,
}

/// Write a raw body with the given content type and status.
pub fn send(
    w: &ResponseWriter,
    content_type: &'static str,
    body: impl AsRef<[u8]>,
    status: StatusCode,
) {
    w.set_header(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    w.write_status(status);
    w.write_body(body);
}

/// Serialize `value` as-is (no envelope).
///
/// Falls back to a 500 error envelope if serialization fails.
pub fn render_json<T: Serialize + ?Sized>(w: &ResponseWriter, value: &T, status: StatusCode) {
    match serde_json::to_vec(value) {
        Ok(body) => send(w, JSON_CONTENT_TYPE, body, status),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize response");
            serialization_failure(w);
        }
    }
}

/// Wrap `data` in the success envelope.
pub fn send_json<T: Serialize + ?Sized>(w: &ResponseWriter, data: &T, status: StatusCode) {
    render_json(
        w,
        &DataEnvelope {
            data,
            status: status.as_u16(),
        },
        status,
    );
}

/// Wrap `errors` in the error envelope.
pub fn send_error<T: Serialize + ?Sized>(w: &ResponseWriter, errors: &T, status: StatusCode) {
    render_json(
        w,
        &ErrorEnvelope {
            errors,
            status: status.as_u16(),
        },
        status,
    );
}

fn serialization_failure(w: &ResponseWriter) {
    let status = StatusCode::INTERNAL_SERVER_ERROR;
    let body = serde_json::json!({
        "errors": "Internal server error",
        "status": status.as_u16(),
    });
    send(w, JSON_CONTENT_TYPE, body.to_string(), status);
}

pub fn ok<T: Serialize + ?Sized>(w: &ResponseWriter, data: &T) {
    send_json(w, data, StatusCode::OK);
}

pub fn created<T: Serialize + ?Sized>(w: &ResponseWriter, data: &T) {
    send_json(w, data, StatusCode::CREATED);
}

pub fn accepted<T: Serialize + ?Sized>(w: &ResponseWriter, data: &T) {
    send_json(w, data, StatusCode::ACCEPTED);
}

/// 204 carries no body.
pub fn no_content(w: &ResponseWriter) {
    w.write_status(StatusCode::NO_CONTENT);
}

pub fn redirect(w: &ResponseWriter, location: &str) {
    match HeaderValue::from_str(location) {
        Ok(value) => {
            w.set_header(header::LOCATION, value);
            w.write_status(StatusCode::FOUND);
        }
        Err(e) => {
            tracing::error!(error = %e, location, "Invalid redirect location");
            internal_error(w, &"Invalid redirect location");
        }
    }
}

pub fn bad_request<T: Serialize + ?Sized>(w: &ResponseWriter, errors: &T) {
    send_error(w, errors, StatusCode::BAD_REQUEST);
}

pub fn unauthorized<T: Serialize + ?Sized>(w: &ResponseWriter, errors: &T) {
    send_error(w, errors, StatusCode::UNAUTHORIZED);
}

pub fn forbidden<T: Serialize + ?Sized>(w: &ResponseWriter, errors: &T) {
    send_error(w, errors, StatusCode::FORBIDDEN);
}

pub fn not_found<T: Serialize + ?Sized>(w: &ResponseWriter, errors: &T) {
    send_error(w, errors, StatusCode::NOT_FOUND);
}

pub fn internal_error<T: Serialize + ?Sized>(w: &ResponseWriter, errors: &T) {
    send_error(w, errors, StatusCode::INTERNAL_SERVER_ERROR);
}
