//! Error types for image bucket operations

use aws_sdk_s3::{
    error::{DisplayErrorContext, SdkError},
    operation::{
        create_bucket::CreateBucketError, delete_public_access_block::DeletePublicAccessBlockError,
        list_objects_v2::ListObjectsV2Error, put_bucket_policy::PutBucketPolicyError,
        put_object::PutObjectError,
    },
};
use thiserror::Error;

/// Result type for image bucket operations
pub type ImageStorageResult<T> = Result<T, ImageStorageError>;

/// Errors that can occur during image bucket operations
#[derive(Error, Debug)]
pub enum ImageStorageError {
    /// Bucket could not be created
    #[error("Failed to create bucket: {0}")]
    CreateBucketError(String),

    /// Bucket could not be opened for anonymous reads
    #[error("Failed to set public access policy: {0}")]
    PublicAccessError(String),

    /// Object upload failed
    #[error("Failed to upload image: {0}")]
    UploadError(String),

    /// Bucket listing failed
    #[error("Failed to list images: {0}")]
    ListError(String),

    /// The bucket could not be reached
    #[error("Bucket unavailable: {0}")]
    Unavailable(String),
}

fn describe<E>(error: &E) -> String
where
    E: std::error::Error,
{
    DisplayErrorContext(error).to_string()
}

impl From<SdkError<CreateBucketError>> for ImageStorageError {
    fn from(error: SdkError<CreateBucketError>) -> Self {
        Self::CreateBucketError(describe(&error))
    }
}

impl From<SdkError<DeletePublicAccessBlockError>> for ImageStorageError {
    fn from(error: SdkError<DeletePublicAccessBlockError>) -> Self {
        Self::PublicAccessError(describe(&error))
    }
}

impl From<SdkError<PutBucketPolicyError>> for ImageStorageError {
    fn from(error: SdkError<PutBucketPolicyError>) -> Self {
        Self::PublicAccessError(describe(&error))
    }
}

impl From<SdkError<PutObjectError>> for ImageStorageError {
    fn from(error: SdkError<PutObjectError>) -> Self {
        Self::UploadError(describe(&error))
    }
}

impl From<SdkError<ListObjectsV2Error>> for ImageStorageError {
    fn from(error: SdkError<ListObjectsV2Error>) -> Self {
        Self::ListError(describe(&error))
    }
}
