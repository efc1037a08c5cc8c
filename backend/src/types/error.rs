//! Universal error handling for the API

use aide::OperationOutput;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use resource_storage::resource::ResourceStorageError;
use schemars::JsonSchema;
use serde::Serialize;

use crate::image_storage::ImageStorageError;

/// Error message when the storage credential chain yields nothing
pub const STORAGE_NOT_CONFIGURED: &str = "Storage credentials are not configured";

/// Error envelope shared by every JSON endpoint
#[derive(Debug, Serialize, JsonSchema)]
pub struct ApiErrorResponse {
    /// Always `false`
    ok: bool,
    /// Human-readable error message
    error: String,
}

/// Application error type that wraps the API error response
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    inner: ApiErrorResponse,
}

impl AppError {
    /// Create a new application error
    #[must_use]
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            inner: ApiErrorResponse {
                ok: false,
                error: msg.into(),
            },
        }
    }

    /// 400 with `msg`
    #[must_use]
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    /// 413 for an upload above `max_bytes`
    #[must_use]
    pub fn file_too_large(max_bytes: usize) -> Self {
        Self::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            format!("File too large (max {max_bytes} bytes)"),
        )
    }

    /// 500 with `msg`
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// 500 for a request that needs storage while none is configured
    #[must_use]
    pub fn storage_not_configured() -> Self {
        Self::internal(STORAGE_NOT_CONFIGURED)
    }

    /// HTTP status of this error
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Message returned to the client
    #[must_use]
    pub fn message(&self) -> &str {
        &self.inner.error
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error based on status code
        match self.status.as_u16() {
            400..=499 => tracing::warn!("Client error: {} - {}", self.status, self.inner.error),
            500..=599 => tracing::error!("Server error: {} - {}", self.status, self.inner.error),
            _ => {}
        }

        (self.status, Json(self.inner)).into_response()
    }
}

/// Convert image storage errors to application errors
impl From<ImageStorageError> for AppError {
    fn from(err: ImageStorageError) -> Self {
        tracing::error!("Image storage error: {err:?}");
        Self::internal(err.to_string())
    }
}

/// Convert resource table errors to application errors
impl From<ResourceStorageError> for AppError {
    fn from(err: ResourceStorageError) -> Self {
        tracing::error!("Resource storage error: {err:?}");
        Self::internal(err.to_string())
    }
}

impl OperationOutput for AppError {
    type Inner = ApiErrorResponse;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        Json::<ApiErrorResponse>::operation_response(ctx, operation)
    }
}
