//! Liveness probe.

use axum::http::StatusCode;

/// GET /healthz - returns 200 once the server is accepting connections.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}
