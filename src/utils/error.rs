use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

/// Client-facing error envelope.
///
/// Every failure the gateway surfaces, whether raised locally by a precondition
/// or derived from an upstream payload, ends up in this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub status_code: u16,
    pub message: String,
}

/// The envelope produced by the error normalizer.
pub type NormalizedError = ApiError;

/// Coarse classification of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthorized,
    BadRequest,
    UpstreamClientError,
    UpstreamServerError,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status_code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(self)).into_response()
    }
}

impl ApiError {
    pub fn from_status(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::from_status(401, "Unauthorized")
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::from_status(400, message)
    }

    pub fn id_required() -> Self {
        Self::bad_request("Id is required")
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::from_status(500, message)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status_code == 401
    }

    pub fn kind(&self) -> ErrorKind {
        match self.status_code {
            401 => ErrorKind::Unauthorized,
            400 => ErrorKind::BadRequest,
            402..=499 => ErrorKind::UpstreamClientError,
            // 5xx, plus anything outside the error range an upstream should never send
            _ => ErrorKind::UpstreamServerError,
        }
    }
}
