// HTTP response utilities for JSON and CSV payloads
use axum::{
    body::Body,
    http::{HeaderValue, Response, StatusCode, header},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct FailureBody {
    pub success: bool,
    pub error: String,
}

/// Serialize `data` to a JSON response with an explicit content length
pub fn json_response<T: Serialize>(
    status: StatusCode,
    data: &T,
) -> Result<Response<Body>, StatusCode> {
    let bytes = serde_json::to_vec(data).map_err(|e| {
        tracing::error!("JSON serialization error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, HeaderValue::from(bytes.len()))
        .body(Body::from(bytes))
        .map_err(|e| {
            tracing::error!("Response build error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

/// `{"success":false,"error":...}` at the given status
pub fn failure_response(status: StatusCode, error: impl Into<String>) -> Response<Body> {
    let body = FailureBody {
        success: false,
        error: error.into(),
    };
    match json_response(status, &body) {
        Ok(response) => response,
        Err(status) => bare_status(status),
    }
}

/// CSV attachment named after the export time
pub fn csv_response(csv: String, exported_at_ms: i64) -> Result<Response<Body>, StatusCode> {
    let disposition = format!(
        "attachment; filename=\"performance-dashboard-{}.csv\"",
        exported_at_ms
    );

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(header::CONTENT_DISPOSITION, disposition)
        .header(header::CONTENT_LENGTH, HeaderValue::from(csv.len()))
        .body(Body::from(csv))
        .map_err(|e| {
            tracing::error!("Response build error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

pub fn bare_status(status: StatusCode) -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    response
}
