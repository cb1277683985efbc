use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Handler error type that wraps `anyhow::Error`.
///
/// Lets handlers use `?` on anything convertible into `anyhow::Error`;
/// store and queue faults surface as a plain 500. The read API has no
/// other failure modes worth distinguishing - authorization is checked
/// before any fallible work happens.
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "Request failed");

        (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
