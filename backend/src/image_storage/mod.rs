//! S3-based image storage operations

mod error;
#[cfg(any(test, feature = "test-utils"))]
mod memory;

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use aws_sdk_s3::{
    error::SdkError,
    primitives::ByteStream,
    types::{BucketLocationConstraint, CreateBucketConfiguration},
    Client as S3Client,
};
use axum::body::Bytes;
use chrono::{DateTime, Utc};
use regex::Regex;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};
use unicode_normalization::UnicodeNormalization;

pub use error::{ImageStorageError, ImageStorageResult};
#[cfg(any(test, feature = "test-utils"))]
pub use memory::{InMemoryImageStore, StoredImage};

/// Timestamp prefix of every object key, 15 characters
const BLOB_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Region that rejects an explicit location constraint
const US_EAST_1: &str = "us-east-1";

static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("Invalid regex"));

/// Reduces a client-supplied filename to `[A-Za-z0-9_.-]`
///
/// Accented letters are decomposed to their base letter (NFKD) before the
/// remaining non-ASCII characters are dropped. Path separators and whitespace
/// runs become `_`, and leading or trailing dots and underscores are stripped,
/// so `../../etc/passwd` becomes `etc_passwd`.
#[must_use]
pub fn sanitize_filename(filename: &str) -> String {
    let ascii: String = filename
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");

    UNSAFE_FILENAME_CHARS
        .replace_all(&joined, "")
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

/// Object key for an upload of `filename` received at `now`
#[must_use]
pub fn blob_name(now: DateTime<Utc>, filename: &str) -> String {
    format!(
        "{}-{}",
        now.format(BLOB_TIMESTAMP_FORMAT),
        sanitize_filename(filename)
    )
}

/// Blob container operations the HTTP layer depends on
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Creates the container if needed and opens it for anonymous reads
    ///
    /// Failing to open the container is logged and otherwise ignored.
    async fn ensure_container(&self) -> ImageStorageResult<()>;

    /// Stores `data` under `name`, replacing any object with the same name,
    /// and returns its public URL
    async fn put_image(
        &self,
        name: &str,
        data: Bytes,
        content_type: &str,
    ) -> ImageStorageResult<String>;

    /// Public URLs of every object in the container, in storage order
    async fn list_image_urls(&self) -> ImageStorageResult<Vec<String>>;
}

/// Image storage client for S3 operations
pub struct ImageStorage {
    s3_client: Arc<S3Client>,
    bucket_name: String,
    region: Option<String>,
    public_base_url: String,
    provisioned: OnceCell<()>,
}

impl ImageStorage {
    /// Creates a new image storage client
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    /// * `bucket_name` - S3 bucket name for image storage
    /// * `region` - Region the bucket is created in, `None` for the S3 default
    /// * `public_base_url` - URL prefix under which objects are publicly readable
    #[must_use]
    pub fn new(
        s3_client: Arc<S3Client>,
        bucket_name: String,
        region: Option<String>,
        public_base_url: String,
    ) -> Self {
        Self {
            s3_client,
            bucket_name,
            region,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            provisioned: OnceCell::new(),
        }
    }

    /// Public URL of the object `name`
    #[must_use]
    pub fn object_url(&self, name: &str) -> String {
        format!("{}/{name}", self.public_base_url)
    }

    async fn provision(&self) -> ImageStorageResult<()> {
        self.create_bucket_if_absent().await?;

        if let Err(err) = self.allow_public_read().await {
            warn!(bucket = %self.bucket_name, "Could not set public access policy: {err}");
        }

        Ok(())
    }

    /// Creates the bucket, treating "already exists" as success
    async fn create_bucket_if_absent(&self) -> ImageStorageResult<()> {
        let mut request = self.s3_client.create_bucket().bucket(&self.bucket_name);

        if let Some(region) = self.region.as_deref().filter(|r| *r != US_EAST_1) {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(region))
                    .build(),
            );
        }

        match request.send().await {
            Ok(_) => {
                info!(bucket = %self.bucket_name, "Created bucket");
                Ok(())
            }
            Err(SdkError::ServiceError(ref svc))
                if svc.err().is_bucket_already_owned_by_you()
                    || svc.err().is_bucket_already_exists() =>
            {
                debug!(bucket = %self.bucket_name, "Bucket already exists");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Lifts the public access block and grants anonymous read and list
    async fn allow_public_read(&self) -> ImageStorageResult<()> {
        self.s3_client
            .delete_public_access_block()
            .bucket(&self.bucket_name)
            .send()
            .await?;

        let policy = serde_json::json!({
            "Version": "2012-10-17",
            "Statement": [
                {
                    "Sid": "PublicReadObjects",
                    "Effect": "Allow",
                    "Principal": "*",
                    "Action": "s3:GetObject",
                    "Resource": format!("arn:aws:s3:::{}/*", self.bucket_name),
                },
                {
                    "Sid": "PublicListBucket",
                    "Effect": "Allow",
                    "Principal": "*",
                    "Action": "s3:ListBucket",
                    "Resource": format!("arn:aws:s3:::{}", self.bucket_name),
                },
            ],
        });

        self.s3_client
            .put_bucket_policy()
            .bucket(&self.bucket_name)
            .policy(policy.to_string())
            .send()
            .await?;

        info!(bucket = %self.bucket_name, "Set public access for bucket");
        Ok(())
    }
}

#[async_trait]
impl ImageStore for ImageStorage {
    async fn ensure_container(&self) -> ImageStorageResult<()> {
        self.provisioned.get_or_try_init(|| self.provision()).await?;
        Ok(())
    }

    async fn put_image(
        &self,
        name: &str,
        data: Bytes,
        content_type: &str,
    ) -> ImageStorageResult<String> {
        let size = data.len();

        self.s3_client
            .put_object()
            .bucket(&self.bucket_name)
            .key(name)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await?;

        let url = self.object_url(name);
        info!(key = %name, size, "Uploaded image {name} -> {url}");

        Ok(url)
    }

    async fn list_image_urls(&self) -> ImageStorageResult<Vec<String>> {
        let mut pages = self
            .s3_client
            .list_objects_v2()
            .bucket(&self.bucket_name)
            .into_paginator()
            .send();

        let mut urls = Vec::new();
        while let Some(page) = pages.next().await {
            urls.extend(
                page?
                    .contents()
                    .iter()
                    .filter_map(|object| object.key())
                    .map(|key| self.object_url(key)),
            );
        }

        debug!(bucket = %self.bucket_name, count = urls.len(), "Listed images");

        Ok(urls)
    }
}
