//! Custom extractors for request validation

use aide::operation::OperationInput;
use aide::OperationOutput;
use axum::{
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_LENGTH,
    Json,
};
use schemars::JsonSchema;
use validator::Validate;

use crate::types::error::AppError;

/// Message for any body that is not the expected JSON object
pub const INVALID_JSON: &str = "Invalid JSON";
/// Message for a resource without a name or url
pub const NAME_AND_URL_REQUIRED: &str = "'name' and 'url' required";
/// Message for an upload request without a file part
pub const NO_FILE_UPLOADED: &str = "No file uploaded";

/// Custom JSON extractor that validates the payload
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: serde::de::DeserializeOwned + Validate + JsonSchema,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        // Wrong content type, malformed JSON and wrong field types all land here
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(|err| {
                tracing::debug!("Rejected JSON body: {err}");
                AppError::bad_request(INVALID_JSON)
            })?;

        payload
            .validate()
            .map_err(|_| AppError::bad_request(NAME_AND_URL_REQUIRED))?;

        Ok(Self(payload))
    }
}

impl<T> OperationInput for ValidatedJson<T>
where
    T: JsonSchema,
{
    fn operation_input(ctx: &mut aide::generate::GenContext, operation: &mut aide::openapi::Operation) {
        // Delegate to Json<T>'s implementation since ValidatedJson has the same structure
        Json::<T>::operation_input(ctx, operation);
    }

    fn inferred_early_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        // Document validation error responses
        AppError::inferred_responses(ctx, operation)
    }
}

/// Multipart upload together with the declared request length
///
/// A request that is not `multipart/form-data` is treated as carrying no file.
pub struct UploadForm {
    /// `Content-Length` header, when present and numeric
    pub declared_length: Option<u64>,
    /// The multipart stream
    pub multipart: Multipart,
}

impl<S> FromRequest<S> for UploadForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let declared_length = req
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok());

        let multipart = Multipart::from_request(req, state).await.map_err(|err| {
            tracing::debug!("Rejected multipart body: {err}");
            AppError::bad_request(NO_FILE_UPLOADED)
        })?;

        Ok(Self {
            declared_length,
            multipart,
        })
    }
}

impl OperationInput for UploadForm {
    fn inferred_early_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        AppError::inferred_responses(ctx, operation)
    }
}
