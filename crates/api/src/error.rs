//! API error types with HTTP response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use services::{ErrorKind, ServiceError};

/// API-level error type that maps to HTTP responses.
///
/// Every error renders as `{"error": <message>, "kind": <kind>}`.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed request: bad JSON, path, query string or actor headers.
    BadRequest(String),
    /// Well-formed JSON whose values could not be accepted.
    Unprocessable(String),
    /// Failure reported by a service.
    Service(ServiceError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": msg, "kind": "BAD_REQUEST" }),
            ),
            ApiError::Unprocessable(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": msg, "kind": ErrorKind::Validation }),
            ),
            ApiError::Service(err) => service_error_to_response(err),
        };

        (status, Json(body)).into_response()
    }
}

fn service_error_to_response(err: ServiceError) -> (StatusCode, serde_json::Value) {
    let kind = err.kind();
    let status = status_for(kind);
    if kind == ErrorKind::Persistence {
        tracing::error!(error = %err, "request failed in storage");
    }

    let mut body = json!({ "error": err.to_string(), "kind": kind });
    if let ServiceError::InsufficientStock {
        product_id,
        requested,
        available,
    } = err
    {
        body["product_id"] = json!(product_id);
        body["requested"] = json!(requested);
        body["available"] = json!(available);
    }

    (status, body)
}

/// HTTP status for each failure class.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::InsufficientStock
        | ErrorKind::InvalidTransition
        | ErrorKind::ConcurrentModification
        | ErrorKind::Inactive
        | ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::Persistence => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::ProductId;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_insufficient_stock_carries_shortfall() {
        let (status, body) = render(ApiError::Service(ServiceError::InsufficientStock {
            product_id: ProductId::new(3),
            requested: 4,
            available: 1,
        }))
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["kind"], "INSUFFICIENT_STOCK");
        assert_eq!(body["product_id"], 3);
        assert_eq!(body["requested"], 4);
        assert_eq!(body["available"], 1);
    }

    #[tokio::test]
    async fn test_bad_request_body() {
        let (status, body) = render(ApiError::BadRequest("missing X-User-Id".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "missing X-User-Id");
        assert_eq!(body["kind"], "BAD_REQUEST");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::Validation), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::Inactive), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorKind::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(
            status_for(ErrorKind::Persistence),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
