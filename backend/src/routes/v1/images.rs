use axum::{extract::multipart::MultipartError, http::StatusCode, Extension, Json};
use chrono::Utc;
use mime::Mime;
use schemars::JsonSchema;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::{
    image_storage::blob_name,
    state::AppState,
    types::{AppError, UploadForm, NO_FILE_UPLOADED},
};

/// Multipart part that carries the image
pub const FILE_FIELD: &str = "file";

/// Message for a file part whose filename is empty
pub const EMPTY_FILENAME: &str = "Empty filename";

/// Response for a stored upload
#[derive(Debug, Serialize, JsonSchema)]
pub struct UploadResponse {
    ok: bool,
    /// Public URL of the stored image
    pub url: String,
}

/// Response listing the gallery
#[derive(Debug, Serialize, JsonSchema)]
pub struct GalleryResponse {
    ok: bool,
    /// Public image URLs, newest first
    pub gallery: Vec<String>,
}

/// Upload an image
///
/// Reads the `file` part of a `multipart/form-data` body and stores it under a
/// timestamped, sanitized name in the public images bucket.
///
/// # Errors
///
/// - 400 when there is no `file` part or its filename is empty
/// - 413 when the request or the file exceeds the configured maximum
/// - 500 when storage is not configured or the bucket operation fails
#[instrument(skip_all)]
pub async fn upload_image(
    Extension(state): Extension<AppState>,
    form: UploadForm,
) -> Result<Json<UploadResponse>, AppError> {
    let max_bytes = state.config.max_file_size_bytes;
    let UploadForm {
        declared_length,
        mut multipart,
    } = form;

    let field = loop {
        match multipart.next_field().await {
            Ok(Some(field))
                if field.name() == Some(FILE_FIELD) && field.file_name().is_some() =>
            {
                break field;
            }
            Ok(Some(_)) => {}
            Ok(None) => return Err(AppError::bad_request(NO_FILE_UPLOADED)),
            Err(err) => return Err(multipart_error(&err, max_bytes)),
        }
    };

    let filename = field.file_name().unwrap_or_default().to_string();
    if filename.is_empty() {
        return Err(AppError::bad_request(EMPTY_FILENAME));
    }

    let max_declared = u64::try_from(max_bytes).unwrap_or(u64::MAX);
    if declared_length.is_some_and(|length| length > max_declared) {
        return Err(AppError::file_too_large(max_bytes));
    }

    let content_type = upload_content_type(field.content_type());
    let data = field
        .bytes()
        .await
        .map_err(|err| multipart_error(&err, max_bytes))?;

    if data.len() > max_bytes {
        return Err(AppError::file_too_large(max_bytes));
    }

    let images = state.images()?;
    let name = blob_name(Utc::now(), &filename);

    images.ensure_container().await?;
    let url = images.put_image(&name, data, &content_type).await?;

    Ok(Json(UploadResponse { ok: true, url }))
}

/// List uploaded images
///
/// Returns the public URL of every object in the images bucket, newest first.
/// The bucket is not created by this call.
///
/// # Errors
///
/// 500 when storage is not configured or the listing fails.
#[instrument(skip_all)]
pub async fn list_gallery(
    Extension(state): Extension<AppState>,
) -> Result<Json<GalleryResponse>, AppError> {
    let mut gallery = state.images()?.list_image_urls().await?;

    // Keys start with a fixed-width timestamp
    gallery.sort_unstable_by(|a, b| b.cmp(a));

    Ok(Json(GalleryResponse { ok: true, gallery }))
}

/// Content type recorded for an upload, `application/octet-stream` when the
/// part declares none or an unparseable one
fn upload_content_type(declared: Option<&str>) -> String {
    declared
        .and_then(|value| value.parse::<Mime>().ok())
        .map_or_else(
            || mime::APPLICATION_OCTET_STREAM.to_string(),
            |parsed| parsed.essence_str().to_string(),
        )
}

fn multipart_error(err: &MultipartError, max_bytes: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::file_too_large(max_bytes);
    }

    debug!("Unreadable multipart body: {err}");
    AppError::bad_request(NO_FILE_UPLOADED)
}
